// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged binary object-graph serialization.
//!
//! Every value on the wire is preceded by a one-byte mark. Marks `0..=49`
//! are built-in encodings (primitives, arrays, strings, sequences, maps);
//! marks `50..=255` are bound to user types through a process-wide registry.
//!
//! # Features
//!
//! - **Binary capability**: a type writes its own fields in a fixed order
//!   ([`IonBinary`])
//! - **Bundled capability**: a type saves its fields by name into an
//!   [`IonBundle`] ([`IonBundled`])
//! - **Adapters**: serialize types you do not own ([`BinaryAdapter`],
//!   [`BundledAdapter`])
//! - **Generic collections**: sequences and maps of [`IonValue`]s
//!
//! # Architecture
//!
//! ```text
//! to_stream / from_stream / to_file / from_file
//!        |
//!        v
//!   IonOutput / IonInput  --(snapshot)-->  Registry (global)
//!        |                                   +-- built-ins 21..=23
//!        v                                   +-- user marks 50..=255
//!   IonBundle, SequenceWrapper, MapWrapper
//! ```
//!
//! # Example
//!
//! ```
//! use ion::{IonBinary, IonInput, IonOutput, IonValue, Result};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl IonBinary for Point {
//!     fn save(&self, out: &mut IonOutput<'_>) -> Result<()> {
//!         out.write_int(self.x)?;
//!         out.write_int(self.y)
//!     }
//!
//!     fn load(&mut self, input: &mut IonInput<'_>) -> Result<()> {
//!         self.x = input.read_int()?;
//!         self.y = input.read_int()?;
//!         Ok(())
//!     }
//! }
//!
//! ion::register_binary::<Point>(60)?;
//!
//! let mut bytes = Vec::new();
//! ion::to_stream(&mut bytes, &IonValue::object(Point { x: 1, y: 2 }))?;
//!
//! let point: Point = ion::from_stream_object(&bytes[..])?;
//! assert_eq!(point, Point { x: 1, y: 2 });
//! # Ok::<(), ion::IonError>(())
//! ```

pub mod adapter;
pub mod bundle;
pub mod capability;
pub mod codec;
pub mod config;
pub mod error;
pub mod mark;
pub mod registry;
pub mod stream;
pub mod value;
pub mod wrapper;

pub use adapter::{BinaryAdapter, BundledAdapter};
pub use bundle::IonBundle;
pub use capability::{IonBinary, IonBundled, IonMarked};
pub use codec::{IonInput, IonOutput};
pub use config::IonConfig;
pub use error::{IonError, Result};
pub use mark::{Mark, MarkKind};
pub use registry::{Registration, Registry, TypeTable};
pub use stream::{
    create_output, from_file, from_file_as, from_file_with, from_stream, from_stream_as,
    from_stream_object, open_input, to_file, to_file_with, to_stream,
};
pub use value::{FromIonValue, IonMap, IonObject, IonValue, ObjectValue};
pub use wrapper::{MapWrapper, SequenceWrapper};

use std::any::Any;

// ---------------------------------------------------------------------------
// Global registry shortcuts
// ---------------------------------------------------------------------------

/// Register on the global registry. See [`Registry::register`].
pub fn register(mark: u32, registration: Registration) -> Result<()> {
    Registry::global().register(mark, registration)
}

pub fn register_binary<T: IonBinary + ObjectValue + Default>(mark: u32) -> Result<()> {
    Registry::global().register_binary::<T>(mark)
}

pub fn register_bundled<T: IonBundled + ObjectValue + Default>(mark: u32) -> Result<()> {
    Registry::global().register_bundled::<T>(mark)
}

pub fn register_marked<T: IonMarked + Any>(registration: Registration) -> Result<()> {
    Registry::global().register_marked::<T>(registration)
}

pub fn register_binary_adapter<T, A>(mark: u32, adapter: A) -> Result<()>
where
    T: ObjectValue,
    A: BinaryAdapter<T>,
{
    Registry::global().register_binary_adapter::<T, A>(mark, adapter)
}

pub fn register_bundled_adapter<T, A>(mark: u32, adapter: A) -> Result<()>
where
    T: ObjectValue,
    A: BundledAdapter<T>,
{
    Registry::global().register_bundled_adapter::<T, A>(mark, adapter)
}

/// Mark of a registered object value.
pub fn mark_for(value: &IonValue) -> Result<Mark> {
    Registry::global().mark_for(value)
}

pub fn is_registered<T: Any>() -> bool {
    Registry::global().is_registered::<T>()
}

/// Drop every user registration from the global registry.
///
/// Meant for test isolation. Streams opened before the reset keep their
/// snapshot.
pub fn reset() {
    Registry::global().reset();
}
