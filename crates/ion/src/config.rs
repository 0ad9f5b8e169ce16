// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec limits.
//!
//! Loaded from TOML:
//!
//! ```toml
//! max_depth = 64
//! max_length = 1048576
//! buffer_size = 16384
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IonError, Result};

/// Limits applied by [`IonInput`](crate::IonInput) and buffer sizing of the
/// file helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IonConfig {
    /// Maximum nesting of containers and objects while decoding.
    ///
    /// Decoding recurses once per level. The default stays within a 2 MiB
    /// thread stack in unoptimised builds; raise it only for readers running
    /// on larger stacks.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum element count accepted from a length prefix or an entry
    /// stream.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Buffer capacity of file readers and writers (bytes).
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_max_depth() -> usize {
    128
}

fn default_max_length() -> usize {
    64 * 1024 * 1024
}

fn default_buffer_size() -> usize {
    8 * 1024
}

impl Default for IonConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_length: default_max_length(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl IonConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| IonError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(IonError::Config("max_depth must be at least 1".into()));
        }
        if self.max_length == 0 {
            return Err(IonError::Config("max_length must be at least 1".into()));
        }
        if self.buffer_size == 0 {
            return Err(IonError::Config("buffer_size must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = IonConfig::default();
        assert_eq!(config.max_depth, 128);
        assert_eq!(config.max_length, 64 * 1024 * 1024);
        assert_eq!(config.buffer_size, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = IonConfig::from_toml_str("max_depth = 16").unwrap();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.buffer_size, 8192);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = IonConfig::from_toml_str("max_length = 0").unwrap_err();
        assert!(matches!(err, IonError::Config(_)));

        let err = IonConfig::from_toml_str("max_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, IonError::Config(_)));

        let err = IonConfig::from_toml_str("compression = true").unwrap_err();
        assert!(matches!(err, IonError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 8\nbuffer_size = 1024").unwrap();

        let config = IonConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.buffer_size, 1024);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = IonConfig::from_file("/nonexistent/ion.toml").unwrap_err();
        assert!(matches!(err, IonError::Io(_)));
    }
}
