// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream writer.

use std::io::Write;
use std::sync::Arc;

use byteorder::{BigEndian, WriteBytesExt};

use super::mutf8;
use crate::bundle::IonBundle;
use crate::config::IonConfig;
use crate::error::{IonError, Result};
use crate::mark::{self, Mark};
use crate::registry::{Registry, TypeTable};
use crate::value::{IonMap, IonObject, IonValue};

/// Writes marks and payloads to a byte sink.
///
/// The writer owns the sink. [`close`](Self::close) flushes and releases it;
/// dropping the writer on an error path releases it as well.
pub struct IonOutput<'a> {
    stream: Box<dyn Write + 'a>,
    registry: Arc<TypeTable>,
    config: IonConfig,
}

impl<'a> IonOutput<'a> {
    /// Writer bound to the global registry.
    pub fn new(stream: impl Write + 'a) -> Self {
        Self::with_config(stream, IonConfig::default())
    }

    pub fn with_config(stream: impl Write + 'a, config: IonConfig) -> Self {
        Self::with_registry(stream, Registry::global(), config)
    }

    /// Writer bound to a specific registry.
    pub fn with_registry(stream: impl Write + 'a, registry: &Registry, config: IonConfig) -> Self {
        Self {
            stream: Box::new(stream),
            registry: registry.snapshot(),
            config,
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

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.stream.write_u8(u8::from(v))?;
        Ok(())
    }

    pub fn write_byte(&mut self, v: u8) -> Result<()> {
        self.stream.write_u8(v)?;
        Ok(())
    }

    /// Write a char as one UTF-16 code unit.
    pub fn write_char(&mut self, v: char) -> Result<()> {
        let unit = u16::try_from(u32::from(v)).map_err(|_| {
            IonError::Unsupported(format!("char U+{:04X} outside the BMP", u32::from(v)))
        })?;
        self.stream.write_u16::<BigEndian>(unit)?;
        Ok(())
    }

    pub fn write_short(&mut self, v: i16) -> Result<()> {
        self.stream.write_i16::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_int(&mut self, v: i32) -> Result<()> {
        self.stream.write_i32::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_long(&mut self, v: i64) -> Result<()> {
        self.stream.write_i64::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_float(&mut self, v: f32) -> Result<()> {
        self.stream.write_f32::<BigEndian>(v)?;
        Ok(())
    }

    pub fn write_double(&mut self, v: f64) -> Result<()> {
        self.stream.write_f64::<BigEndian>(v)?;
        Ok(())
    }

    /// Write a string as modified UTF-8 with a 2-byte length.
    pub fn write_string(&mut self, v: &str) -> Result<()> {
        let encoded = mutf8::encode(v)?;
        self.stream.write_u16::<BigEndian>(encoded.len() as u16)?;
        self.stream.write_all(&encoded)?;
        Ok(())
    }

    /// Write an integer in `0..=255` as one byte.
    pub fn write_int_byte(&mut self, v: u32) -> Result<()> {
        let b = u8::try_from(v)
            .map_err(|_| IonError::Unsupported(format!("{} does not fit in a byte", v)))?;
        self.write_byte(b)
    }

    /// Write an integer in `0..=65535` as two bytes.
    pub fn write_int_short(&mut self, v: u32) -> Result<()> {
        let s = u16::try_from(v)
            .map_err(|_| IonError::Unsupported(format!("{} does not fit in a short", v)))?;
        self.stream.write_u16::<BigEndian>(s)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Arrays (4-byte length, then elements)
    // -----------------------------------------------------------------------

    pub fn write_bools(&mut self, arr: &[bool]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_bool(*v))
    }

    pub fn write_bytes(&mut self, arr: &[u8]) -> Result<()> {
        self.write_length(arr.len())?;
        self.stream.write_all(arr)?;
        Ok(())
    }

    pub fn write_chars(&mut self, arr: &[char]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_char(*v))
    }

    pub fn write_shorts(&mut self, arr: &[i16]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_short(*v))
    }

    pub fn write_ints(&mut self, arr: &[i32]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_int(*v))
    }

    pub fn write_longs(&mut self, arr: &[i64]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_long(*v))
    }

    pub fn write_floats(&mut self, arr: &[f32]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_float(*v))
    }

    pub fn write_doubles(&mut self, arr: &[f64]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_double(*v))
    }

    pub fn write_strings<S: AsRef<str>>(&mut self, arr: &[S]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_string(v.as_ref()))
    }

    /// Length-prefixed array of marked values.
    pub fn write_objects(&mut self, arr: &[IonValue]) -> Result<()> {
        self.write_length(arr.len())?;
        arr.iter().try_for_each(|v| self.write_object(v))
    }

    fn write_length(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len)
            .map_err(|_| IonError::Unsupported(format!("array of {} elements", len)))?;
        self.write_int(len)
    }

    // -----------------------------------------------------------------------
    // Entry streams
    // -----------------------------------------------------------------------

    pub fn start_entry(&mut self) -> Result<()> {
        self.write_mark(mark::ENTRY)
    }

    pub fn end_sequence(&mut self) -> Result<()> {
        self.write_mark(mark::END)
    }

    /// Write `(ENTRY, element)*` then END, without a leading mark.
    pub fn write_sequence(&mut self, items: &[IonValue]) -> Result<()> {
        for item in items {
            self.start_entry()?;
            self.write_object(item)?;
        }
        self.end_sequence()
    }

    /// Write `(ENTRY, key, value)*` then END, without a leading mark.
    ///
    /// Pairs whose value is null are not written.
    pub fn write_map(&mut self, map: &IonMap) -> Result<()> {
        for (key, value) in map.iter() {
            if value.is_null() {
                continue;
            }
            self.start_entry()?;
            self.write_object(key)?;
            self.write_object(value)?;
        }
        self.end_sequence()
    }

    /// Write a bundle's entry stream, without a leading mark.
    pub fn write_bundle(&mut self, bundle: &IonBundle) -> Result<()> {
        for (key, value) in bundle.iter() {
            if value.is_null() {
                continue;
            }
            self.start_entry()?;
            self.write_mark(mark::STRING)?;
            self.write_string(key)?;
            self.write_object(value)?;
        }
        self.end_sequence()
    }

    // -----------------------------------------------------------------------
    // Marked values
    // -----------------------------------------------------------------------

    pub fn write_mark(&mut self, mark: Mark) -> Result<()> {
        self.write_byte(mark)
    }

    /// Write a value preceded by its mark.
    pub fn write_object(&mut self, value: &IonValue) -> Result<()> {
        match value {
            IonValue::Null => self.write_mark(mark::NULL),
            IonValue::Object(obj) => self.write_registered(obj),
            IonValue::Map(map) => {
                self.write_mark(mark::MAP)?;
                self.write_map(map)
            }
            IonValue::Sequence(items) => {
                self.write_mark(mark::SEQUENCE)?;
                self.write_sequence(items)
            }
            IonValue::ObjectArray(items) => {
                self.write_mark(mark::OBJECT_ARRAY)?;
                self.write_objects(items)
            }
            IonValue::Bool(v) => {
                self.write_mark(mark::BOOLEAN)?;
                self.write_bool(*v)
            }
            IonValue::Byte(v) => {
                self.write_mark(mark::BYTE)?;
                self.write_byte(*v)
            }
            IonValue::Char(v) => {
                self.write_mark(mark::CHAR)?;
                self.write_char(*v)
            }
            IonValue::Short(v) => {
                self.write_mark(mark::SHORT)?;
                self.write_short(*v)
            }
            IonValue::Int(v) => {
                self.write_mark(mark::INT)?;
                self.write_int(*v)
            }
            IonValue::Long(v) => {
                self.write_mark(mark::LONG)?;
                self.write_long(*v)
            }
            IonValue::Float(v) => {
                self.write_mark(mark::FLOAT)?;
                self.write_float(*v)
            }
            IonValue::Double(v) => {
                self.write_mark(mark::DOUBLE)?;
                self.write_double(*v)
            }
            IonValue::String(v) => {
                self.write_mark(mark::STRING)?;
                self.write_string(v)
            }
            IonValue::BoolArray(v) => {
                self.write_mark(mark::BOOLEAN_ARRAY)?;
                self.write_bools(v)
            }
            IonValue::ByteArray(v) => {
                self.write_mark(mark::BYTE_ARRAY)?;
                self.write_bytes(v)
            }
            IonValue::CharArray(v) => {
                self.write_mark(mark::CHAR_ARRAY)?;
                self.write_chars(v)
            }
            IonValue::ShortArray(v) => {
                self.write_mark(mark::SHORT_ARRAY)?;
                self.write_shorts(v)
            }
            IonValue::IntArray(v) => {
                self.write_mark(mark::INT_ARRAY)?;
                self.write_ints(v)
            }
            IonValue::LongArray(v) => {
                self.write_mark(mark::LONG_ARRAY)?;
                self.write_longs(v)
            }
            IonValue::FloatArray(v) => {
                self.write_mark(mark::FLOAT_ARRAY)?;
                self.write_floats(v)
            }
            IonValue::DoubleArray(v) => {
                self.write_mark(mark::DOUBLE_ARRAY)?;
                self.write_doubles(v)
            }
            IonValue::StringArray(v) => {
                self.write_mark(mark::STRING_ARRAY)?;
                self.write_strings(v.as_slice())
            }
        }
    }

    /// Adapter first, then the type's own capability.
    fn write_registered(&mut self, obj: &IonObject) -> Result<()> {
        let type_id = obj.type_id();
        let Some(entry) = self.registry.entry_for_type(type_id).cloned() else {
            return Err(IonError::Unsupported(format!(
                "{} is not registered",
                obj.type_name()
            )));
        };
        self.write_mark(entry.mark)?;

        if let Some(adapter) = self.registry.adapter(type_id).cloned() {
            return adapter.save(obj, self);
        }
        match entry.direct {
            Some(codec) => (codec.save)(obj, self),
            None => Err(IonError::NotRegistered(entry.type_name)),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }

    /// Flush and release the sink.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(f: impl FnOnce(&mut IonOutput<'_>) -> Result<()>) -> Vec<u8> {
        let registry = Registry::new();
        let mut buf = Vec::new();
        let mut out = IonOutput::with_registry(&mut buf, &registry, IonConfig::default());
        f(&mut out).unwrap();
        out.close().unwrap();
        buf
    }

    #[test]
    fn test_primitives_are_big_endian() {
        assert_eq!(written(|o| o.write_short(0x0102)), vec![1, 2]);
        assert_eq!(written(|o| o.write_int(-2)), vec![0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(
            written(|o| o.write_long(1)),
            vec![0, 0, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(written(|o| o.write_float(1.0)), 1.0f32.to_be_bytes());
        assert_eq!(written(|o| o.write_char('A')), vec![0, 0x41]);
    }

    #[test]
    fn test_marked_int() {
        let bytes = written(|o| o.write_object(&IonValue::Int(258)));
        assert_eq!(bytes, vec![mark::INT, 0, 0, 1, 2]);
    }

    #[test]
    fn test_string_framing() {
        let bytes = written(|o| o.write_object(&IonValue::from("hi")));
        assert_eq!(bytes, vec![mark::STRING, 0, 2, b'h', b'i']);
    }

    #[test]
    fn test_array_framing() {
        let bytes = written(|o| o.write_object(&IonValue::IntArray(vec![1, 2])));
        assert_eq!(
            bytes,
            vec![mark::INT_ARRAY, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2]
        );
    }

    #[test]
    fn test_sequence_framing() {
        let bytes = written(|o| {
            o.write_object(&IonValue::Sequence(vec![IonValue::Bool(true), IonValue::Null]))
        });
        assert_eq!(
            bytes,
            vec![
                mark::SEQUENCE,
                mark::ENTRY,
                mark::BOOLEAN,
                1,
                mark::ENTRY,
                mark::NULL,
                mark::END
            ]
        );
    }

    #[test]
    fn test_map_skips_null_values() {
        let mut map = IonMap::new();
        map.insert("a", 1u8);
        map.insert("b", IonValue::Null);
        let bytes = written(|o| o.write_object(&IonValue::Map(map.clone())));
        assert_eq!(
            bytes,
            vec![
                mark::MAP,
                mark::ENTRY,
                mark::STRING,
                0,
                1,
                b'a',
                mark::BYTE,
                1,
                mark::END
            ]
        );
    }

    #[test]
    fn test_unregistered_object_is_unsupported() {
        #[derive(Debug, Clone, PartialEq)]
        struct Stray;

        let registry = Registry::new();
        let mut out = IonOutput::with_registry(Vec::new(), &registry, IonConfig::default());
        let err = out.write_object(&IonValue::object(Stray)).unwrap_err();
        assert!(matches!(err, IonError::Unsupported(_)));
    }

    #[test]
    fn test_char_outside_bmp_is_unsupported() {
        let registry = Registry::new();
        let mut out = IonOutput::with_registry(Vec::new(), &registry, IonConfig::default());
        assert!(matches!(
            out.write_char('\u{1F600}'),
            Err(IonError::Unsupported(_))
        ));
    }

    #[test]
    fn test_int_byte_range() {
        assert_eq!(written(|o| o.write_int_byte(255)), vec![255]);
        assert_eq!(written(|o| o.write_int_short(0xABCD)), vec![0xAB, 0xCD]);

        let registry = Registry::new();
        let mut out = IonOutput::with_registry(Vec::new(), &registry, IonConfig::default());
        assert!(out.write_int_byte(256).is_err());
        assert!(out.write_int_short(65536).is_err());
    }
}
