// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream reader.

use std::any::Any;
use std::io::Read;
use std::sync::Arc;

use byteorder::{BigEndian, ReadBytesExt};

use super::mutf8;
use crate::bundle::IonBundle;
use crate::config::IonConfig;
use crate::error::{IonError, Result};
use crate::mark::{self, Mark};
use crate::registry::{Entry, Registry, TypeTable};
use crate::value::{FromIonValue, IonMap, IonObject, IonValue};

/// Reads marks and payloads from a byte source.
///
/// Mirrors [`IonOutput`](super::IonOutput): every `read_*` consumes exactly
/// what the matching `write_*` produced.
pub struct IonInput<'a> {
    stream: Box<dyn Read + 'a>,
    registry: Arc<TypeTable>,
    config: IonConfig,
    depth: usize,
}

impl<'a> IonInput<'a> {
    /// Reader bound to the global registry.
    pub fn new(stream: impl Read + 'a) -> Self {
        Self::with_config(stream, IonConfig::default())
    }

    pub fn with_config(stream: impl Read + 'a, config: IonConfig) -> Self {
        Self::with_registry(stream, Registry::global(), config)
    }

    /// Reader bound to a specific registry.
    pub fn with_registry(stream: impl Read + 'a, registry: &Registry, config: IonConfig) -> Self {
        Self {
            stream: Box::new(stream),
            registry: registry.snapshot(),
            config,
            depth: 0,
        }
    }

    pub fn config(&self) -> &IonConfig {
        &self.config
    }

    /// Empty bundle that checks objects against this codec's registry.
    pub(crate) fn new_bundle(&self) -> IonBundle {
        IonBundle::bound_to(Arc::clone(&self.registry))
    }

    // -----------------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------------

    /// Any non-zero byte reads as `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.stream.read_u8()? != 0)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.stream.read_u8()?)
    }

    pub fn read_char(&mut self) -> Result<char> {
        let unit = self.stream.read_u16::<BigEndian>()?;
        char::from_u32(u32::from(unit))
            .ok_or_else(|| IonError::corrupt(format!("surrogate code unit {:#06x} as char", unit)))
    }

    pub fn read_short(&mut self) -> Result<i16> {
        Ok(self.stream.read_i16::<BigEndian>()?)
    }

    pub fn read_int(&mut self) -> Result<i32> {
        Ok(self.stream.read_i32::<BigEndian>()?)
    }

    pub fn read_long(&mut self) -> Result<i64> {
        Ok(self.stream.read_i64::<BigEndian>()?)
    }

    pub fn read_float(&mut self) -> Result<f32> {
        Ok(self.stream.read_f32::<BigEndian>()?)
    }

    pub fn read_double(&mut self) -> Result<f64> {
        Ok(self.stream.read_f64::<BigEndian>()?)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = usize::from(self.stream.read_u16::<BigEndian>()?);
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf)?;
        mutf8::decode(&buf)
    }

    /// Read an integer written with `write_int_byte`.
    pub fn read_int_byte(&mut self) -> Result<u32> {
        Ok(u32::from(self.stream.read_u8()?))
    }

    /// Read an integer written with `write_int_short`.
    pub fn read_int_short(&mut self) -> Result<u32> {
        Ok(u32::from(self.stream.read_u16::<BigEndian>()?))
    }

    // -----------------------------------------------------------------------
    // Arrays
    // -----------------------------------------------------------------------

    pub fn read_bools(&mut self) -> Result<Vec<bool>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_bool()).collect()
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_length()?;
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_chars(&mut self) -> Result<Vec<char>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_char()).collect()
    }

    pub fn read_shorts(&mut self) -> Result<Vec<i16>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_short()).collect()
    }

    pub fn read_ints(&mut self) -> Result<Vec<i32>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_int()).collect()
    }

    pub fn read_longs(&mut self) -> Result<Vec<i64>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_long()).collect()
    }

    pub fn read_floats(&mut self) -> Result<Vec<f32>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_float()).collect()
    }

    pub fn read_doubles(&mut self) -> Result<Vec<f64>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_double()).collect()
    }

    pub fn read_strings(&mut self) -> Result<Vec<String>> {
        let len = self.read_length()?;
        (0..len).map(|_| self.read_string()).collect()
    }

    /// Length-prefixed array of marked values.
    pub fn read_objects(&mut self) -> Result<Vec<IonValue>> {
        let len = self.read_length()?;
        self.nested(|input| (0..len).map(|_| input.read_object()).collect())
    }

    fn read_length(&mut self) -> Result<usize> {
        let len = self.read_int()?;
        let len = usize::try_from(len)
            .map_err(|_| IonError::corrupt(format!("negative length {}", len)))?;
        if len > self.config.max_length {
            log::warn!(
                "[ion::codec] length {} exceeds limit {}",
                len,
                self.config.max_length
            );
            return Err(IonError::corrupt(format!(
                "length {} exceeds limit {}",
                len, self.config.max_length
            )));
        }
        Ok(len)
    }

    // -----------------------------------------------------------------------
    // Entry streams
    // -----------------------------------------------------------------------

    /// Entry streams carry no length prefix; `max_length` caps them instead.
    fn check_entries(&self, read: usize) -> Result<()> {
        if read >= self.config.max_length {
            log::warn!(
                "[ion::codec] entry stream exceeds limit {}",
                self.config.max_length
            );
            return Err(IonError::corrupt(format!(
                "more than {} entries",
                self.config.max_length
            )));
        }
        Ok(())
    }

    /// True on ENTRY, false on END, corrupt data on anything else.
    pub fn has_next_entry(&mut self) -> Result<bool> {
        match self.read_mark()? {
            mark::ENTRY => Ok(true),
            mark::END => Ok(false),
            other => {
                log::warn!("[ion::codec] unexpected mark {} in entry stream", other);
                Err(IonError::UnexpectedEntryMark(other))
            }
        }
    }

    /// Read `(ENTRY, element)*` up to END.
    pub fn read_sequence(&mut self) -> Result<Vec<IonValue>> {
        self.nested(|input| {
            let mut items = Vec::new();
            while input.has_next_entry()? {
                input.check_entries(items.len())?;
                items.push(input.read_object()?);
            }
            Ok(items)
        })
    }

    /// Read `(ENTRY, key, value)*` up to END.
    pub fn read_map(&mut self) -> Result<IonMap> {
        self.nested(|input| {
            let mut map = IonMap::new();
            while input.has_next_entry()? {
                input.check_entries(map.len())?;
                let key = input.read_object()?;
                let value = input.read_object()?;
                map.insert(key, value);
            }
            Ok(map)
        })
    }

    /// Read a bundle's entry stream into a fresh bundle.
    pub fn read_bundle(&mut self) -> Result<IonBundle> {
        let mut bundle = self.new_bundle();
        self.read_bundle_into(&mut bundle)?;
        Ok(bundle)
    }

    /// Clear `bundle` and fill it from the entry stream.
    pub fn read_bundle_into(&mut self, bundle: &mut IonBundle) -> Result<()> {
        bundle.clear();
        self.nested(|input| {
            let mut count = 0;
            while input.has_next_entry()? {
                input.check_entries(count)?;
                count += 1;
                let key = match input.read_object()? {
                    IonValue::String(key) => key,
                    other => {
                        return Err(IonError::corrupt(format!(
                            "bundle key is {}, not a string",
                            other.kind_name()
                        )))
                    }
                };
                let value = input.read_object()?;
                bundle.insert_loaded(key, value);
            }
            Ok(())
        })
    }

    // -----------------------------------------------------------------------
    // Marked values
    // -----------------------------------------------------------------------

    pub fn read_mark(&mut self) -> Result<Mark> {
        self.read_byte()
    }

    /// Read one marked value.
    pub fn read_object(&mut self) -> Result<IonValue> {
        let mark = self.read_mark()?;

        if let Some(entry) = self.registry.entry(mark).cloned() {
            return self
                .nested(|input| input.read_registered(&entry))
                .map(IonValue::Object);
        }

        let value = match mark {
            mark::NULL => IonValue::Null,
            mark::BOOLEAN => IonValue::Bool(self.read_bool()?),
            mark::BYTE => IonValue::Byte(self.read_byte()?),
            mark::CHAR => IonValue::Char(self.read_char()?),
            mark::SHORT => IonValue::Short(self.read_short()?),
            mark::INT => IonValue::Int(self.read_int()?),
            mark::LONG => IonValue::Long(self.read_long()?),
            mark::FLOAT => IonValue::Float(self.read_float()?),
            mark::DOUBLE => IonValue::Double(self.read_double()?),
            mark::STRING => IonValue::String(self.read_string()?),
            mark::BOOLEAN_ARRAY => IonValue::BoolArray(self.read_bools()?),
            mark::BYTE_ARRAY => IonValue::ByteArray(self.read_bytes()?),
            mark::CHAR_ARRAY => IonValue::CharArray(self.read_chars()?),
            mark::SHORT_ARRAY => IonValue::ShortArray(self.read_shorts()?),
            mark::INT_ARRAY => IonValue::IntArray(self.read_ints()?),
            mark::LONG_ARRAY => IonValue::LongArray(self.read_longs()?),
            mark::FLOAT_ARRAY => IonValue::FloatArray(self.read_floats()?),
            mark::DOUBLE_ARRAY => IonValue::DoubleArray(self.read_doubles()?),
            mark::STRING_ARRAY => IonValue::StringArray(self.read_strings()?),
            mark::SEQUENCE => IonValue::Sequence(self.read_sequence()?),
            mark::MAP => IonValue::Map(self.read_map()?),
            mark::OBJECT_ARRAY => IonValue::ObjectArray(self.read_objects()?),
            other => {
                log::warn!("[ion::codec] invalid mark {}", other);
                return Err(IonError::UnknownMark(other));
            }
        };
        Ok(value)
    }

    /// Read a value of type `T`; NULL yields `default`.
    ///
    /// A value of any other kind is corrupt data.
    pub fn read_object_or<T: FromIonValue>(&mut self, default: T) -> Result<T> {
        match self.read_object()? {
            IonValue::Null => Ok(default),
            value => T::from_ion(&value).ok_or_else(|| mismatch::<T>(&value)),
        }
    }

    /// Read a value of type `T`.
    pub fn read_typed<T: FromIonValue>(&mut self) -> Result<T> {
        let value = self.read_object()?;
        T::from_ion(&value).ok_or_else(|| mismatch::<T>(&value))
    }

    /// Read an instance of the registered type `T`.
    pub fn read_registered_as<T: Any>(&mut self) -> Result<T> {
        match self.read_object()? {
            IonValue::Object(obj) if obj.is::<T>() => obj
                .into_inner::<T>()
                .ok_or_else(|| IonError::corrupt("object changed type while reading")),
            other => Err(mismatch::<T>(&other)),
        }
    }

    /// Adapter first, then the type's own capability.
    fn read_registered(&mut self, entry: &Entry) -> Result<IonObject> {
        if let Some(adapter) = self.registry.adapter(entry.type_id).cloned() {
            return adapter.load(self);
        }
        match entry.direct {
            Some(codec) => (codec.load)(self),
            None => Err(IonError::NotRegistered(entry.type_name)),
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.config.max_depth {
            log::warn!(
                "[ion::codec] nesting exceeds limit {}",
                self.config.max_depth
            );
            return Err(IonError::corrupt(format!(
                "nesting deeper than {}",
                self.config.max_depth
            )));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Release the source.
    pub fn close(self) -> Result<()> {
        Ok(())
    }
}

fn mismatch<T>(value: &IonValue) -> IonError {
    IonError::corrupt(format!(
        "expected {}, found {}",
        std::any::type_name::<T>(),
        value.kind_name()
    ))
}
