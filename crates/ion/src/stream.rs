// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One-shot helpers around [`IonOutput`] and [`IonInput`].
//!
//! Each helper writes or reads exactly one marked value. Streams and files are
//! released on every exit path, errors included.

use std::any::Any;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::codec::{IonInput, IonOutput};
use crate::config::IonConfig;
use crate::error::Result;
use crate::value::{FromIonValue, IonValue};

/// Write one value to `stream`.
pub fn to_stream<W: Write>(stream: W, value: &IonValue) -> Result<()> {
    let mut out = IonOutput::new(stream);
    out.write_object(value)?;
    out.close()
}

/// Read one value from `stream`.
pub fn from_stream<R: Read>(stream: R) -> Result<IonValue> {
    let mut input = IonInput::new(stream);
    let value = input.read_object()?;
    input.close()?;
    Ok(value)
}

/// Read one value of a built-in kind (`i32`, `String`, `IonMap`, ...).
pub fn from_stream_as<T: FromIonValue, R: Read>(stream: R) -> Result<T> {
    let mut input = IonInput::new(stream);
    let value = input.read_typed()?;
    input.close()?;
    Ok(value)
}

/// Read one instance of the registered type `T`.
pub fn from_stream_object<T: Any, R: Read>(stream: R) -> Result<T> {
    let mut input = IonInput::new(stream);
    let value = input.read_registered_as()?;
    input.close()?;
    Ok(value)
}

/// Open a buffered reader on `path`.
pub fn open_input<P: AsRef<Path>>(path: P, config: IonConfig) -> Result<IonInput<'static>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    log::debug!("[ion::stream] opened {}", path.display());
    let reader = BufReader::with_capacity(config.buffer_size, file);
    Ok(IonInput::with_config(reader, config))
}

/// Create (or truncate) `path` and open a buffered writer on it.
pub fn create_output<P: AsRef<Path>>(path: P, config: IonConfig) -> Result<IonOutput<'static>> {
    let path = path.as_ref();
    let file = File::create(path)?;
    log::debug!("[ion::stream] created {}", path.display());
    let writer = BufWriter::with_capacity(config.buffer_size, file);
    Ok(IonOutput::with_config(writer, config))
}

/// Write one value to a file.
pub fn to_file<P: AsRef<Path>>(path: P, value: &IonValue) -> Result<()> {
    to_file_with(path, value, IonConfig::default())
}

pub fn to_file_with<P: AsRef<Path>>(path: P, value: &IonValue, config: IonConfig) -> Result<()> {
    let mut out = create_output(path, config)?;
    out.write_object(value)?;
    out.close()
}

/// Read one value from a file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<IonValue> {
    from_file_with(path, IonConfig::default())
}

pub fn from_file_with<P: AsRef<Path>>(path: P, config: IonConfig) -> Result<IonValue> {
    let mut input = open_input(path, config)?;
    let value = input.read_object()?;
    input.close()?;
    Ok(value)
}

pub fn from_file_as<T: FromIonValue, P: AsRef<Path>>(path: P) -> Result<T> {
    let mut input = open_input(path, IonConfig::default())?;
    let value = input.read_typed()?;
    input.close()?;
    Ok(value)
}
