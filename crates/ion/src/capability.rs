// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Capabilities a registered type can provide.

use crate::bundle::IonBundle;
use crate::codec::{IonInput, IonOutput};
use crate::error::Result;

/// Type that writes and reads its own payload on the stream.
///
/// The codec writes the mark; `save` writes everything after it and `load`
/// must consume exactly what `save` produced. `load` runs on a
/// `Default::default()` instance.
pub trait IonBinary {
    fn save(&self, out: &mut IonOutput<'_>) -> Result<()>;
    fn load(&mut self, input: &mut IonInput<'_>) -> Result<()>;
}

/// Type that stores its state as named entries of an [`IonBundle`].
pub trait IonBundled {
    fn save(&self, bundle: &mut IonBundle) -> Result<()>;
    fn load(&mut self, bundle: &IonBundle) -> Result<()>;
}

/// Type that declares its own mark.
///
/// Used with [`Registry::register_marked`](crate::Registry::register_marked).
pub trait IonMarked {
    const ION_MARK: u32;
}
