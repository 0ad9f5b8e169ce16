// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the registry, the codec and the bundle.

use std::io;
use thiserror::Error;

/// Errors produced by ion.
///
/// Registration faults (`MarkOutOfRange`, `ReservedMark`, `MarkInUse`,
/// `TypeAlreadyRegistered`) are raised while populating the registry.
/// `Unsupported` and `NotRegistered` are raised while encoding, the
/// corrupt-data family while decoding.
#[derive(Debug, Error)]
pub enum IonError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("mark {0} is out of range 0..=255")]
    MarkOutOfRange(u32),

    #[error("mark {0} is reserved (marks 0..=49 are built-in)")]
    ReservedMark(u32),

    #[error("mark {mark} is already in use by {registered}")]
    MarkInUse {
        mark: u8,
        registered: &'static str,
    },

    #[error("{type_name} is already registered under mark {mark}")]
    TypeAlreadyRegistered { type_name: &'static str, mark: u8 },

    #[error("type not registered: {0}")]
    NotRegistered(&'static str),

    #[error("value cannot be written: {0}")]
    Unsupported(String),

    #[error("invalid mark: {0}")]
    UnknownMark(u8),

    #[error("unexpected mark in sequence: {0}")]
    UnexpectedEntryMark(u8),

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("no such key: {0}")]
    MissingKey(String),

    #[error("value under key '{key}' is not {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl IonError {
    /// True for every error that means "the bytes being decoded are wrong".
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            Self::UnknownMark(_) | Self::UnexpectedEntryMark(_) | Self::CorruptData(_)
        )
    }

    /// True for faults raised while populating the registry.
    pub fn is_registration_fault(&self) -> bool {
        matches!(
            self,
            Self::MarkOutOfRange(_)
                | Self::ReservedMark(_)
                | Self::MarkInUse { .. }
                | Self::TypeAlreadyRegistered { .. }
        )
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptData(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(IonError::UnknownMark(250).to_string(), "invalid mark: 250");
        assert_eq!(
            IonError::MarkInUse {
                mark: 60,
                registered: "demo::Point"
            }
            .to_string(),
            "mark 60 is already in use by demo::Point"
        );
        assert_eq!(
            IonError::MissingKey("points".into()).to_string(),
            "no such key: points"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(IonError::UnknownMark(99).is_corrupt_data());
        assert!(IonError::UnexpectedEntryMark(5).is_corrupt_data());
        assert!(IonError::corrupt("negative length").is_corrupt_data());
        assert!(!IonError::NotRegistered("x").is_corrupt_data());

        assert!(IonError::ReservedMark(10).is_registration_fault());
        assert!(IonError::MarkOutOfRange(300).is_registration_fault());
        assert!(!IonError::MissingKey("k".into()).is_registration_fault());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: IonError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, IonError::Io(_)));
        assert!(!err.is_corrupt_data());
    }
}
