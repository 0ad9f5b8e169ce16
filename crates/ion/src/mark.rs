// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type marks.
//!
//! Every value on the wire is preceded by a single unsigned byte, the mark.
//!
//! ```text
//!   0 ..= 49   reserved for built-in encodings
//!  50 ..= 255  available for registered types
//! ```

/// A mark as it appears on the wire.
pub type Mark = u8;

pub const NULL: Mark = 0;
pub const BOOLEAN: Mark = 1;
pub const BYTE: Mark = 2;
pub const CHAR: Mark = 3;
pub const SHORT: Mark = 4;
pub const INT: Mark = 5;
pub const LONG: Mark = 6;
pub const FLOAT: Mark = 7;
pub const DOUBLE: Mark = 8;
pub const STRING: Mark = 9;
pub const BOOLEAN_ARRAY: Mark = 10;
pub const BYTE_ARRAY: Mark = 11;
pub const CHAR_ARRAY: Mark = 12;
pub const SHORT_ARRAY: Mark = 13;
pub const INT_ARRAY: Mark = 14;
pub const LONG_ARRAY: Mark = 15;
pub const FLOAT_ARRAY: Mark = 16;
pub const DOUBLE_ARRAY: Mark = 17;
pub const STRING_ARRAY: Mark = 18;
/// Precedes each sequence element or map key/value pair.
pub const ENTRY: Mark = 19;
/// Terminates a sequence or map.
pub const END: Mark = 20;
/// [`IonBundle`](crate::IonBundle) written as a registered object.
pub const BUNDLE: Mark = 21;
/// Sequence stored inside a bundle.
pub const SEQUENCE_WRAPPER: Mark = 22;
/// Map stored inside a bundle.
pub const MAP_WRAPPER: Mark = 23;
/// Generic sequence written without a registered type.
pub const SEQUENCE: Mark = 24;
/// Generic map written without a registered type.
pub const MAP: Mark = 25;
/// Length-prefixed array of arbitrary values.
pub const OBJECT_ARRAY: Mark = 26;

pub const RESERVED_HIGH: u32 = 49;
pub const RANGE_HIGH: u32 = 255;

/// True if the mark belongs to the built-in range.
#[inline]
pub const fn is_reserved(mark: u32) -> bool {
    mark <= RESERVED_HIGH
}

/// How the codec handles a registered mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// Type implements [`IonBinary`](crate::IonBinary).
    Binary,
    /// Type implements [`IonBundled`](crate::IonBundled).
    Bundled,
    /// Type is handled by a [`BinaryAdapter`](crate::BinaryAdapter).
    AdapterBinary,
    /// Type is handled by a [`BundledAdapter`](crate::BundledAdapter).
    AdapterBundled,
}

impl MarkKind {
    /// True if an external adapter does the work.
    pub const fn is_adapter(self) -> bool {
        matches!(self, Self::AdapterBinary | Self::AdapterBundled)
    }
}
