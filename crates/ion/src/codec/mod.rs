// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary stream codec.
//!
//! # Wire Format
//!
//! ```text
//! value    := mark payload
//! mark     := u8
//! scalar   := bool(1) | byte(1) | char(2) | short(2) | int(4)
//!           | long(8) | float(4) | double(8)
//! string   := len:u16 modified-utf8[len]
//! array    := len:i32 element[len]
//! entries  := (ENTRY item)* END          sequence item = value
//!                                        map item      = value value
//! ```
//!
//! All multi-byte numbers are big-endian. Registered objects write their
//! mark followed by whatever their capability writes; bundled objects write
//! a bundle entry stream.

mod input;
pub mod mutf8;
mod output;

pub use input::IonInput;
pub use output::IonOutput;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IonConfig;
    use crate::registry::Registry;
    use crate::value::{IonMap, IonValue};

    fn roundtrip(value: &IonValue) -> IonValue {
        let registry = Registry::new();
        let mut buf = Vec::new();
        let mut out = IonOutput::with_registry(&mut buf, &registry, IonConfig::default());
        out.write_object(value).unwrap();
        out.close().unwrap();

        let mut cursor = std::io::Cursor::new(&buf);
        let decoded = {
            let mut input = IonInput::with_registry(&mut cursor, &registry, IonConfig::default());
            input.read_object().unwrap()
        };
        assert_eq!(cursor.position() as usize, buf.len(), "trailing bytes");
        decoded
    }

    #[test]
    fn scalars_roundtrip() {
        let values = [
            IonValue::Null,
            IonValue::Bool(false),
            IonValue::Byte(0xFF),
            IonValue::Char('\u{e9}'),
            IonValue::Short(i16::MIN),
            IonValue::Int(i32::MAX),
            IonValue::Long(-1),
            IonValue::Float(f32::MIN_POSITIVE),
            IonValue::Double(std::f64::consts::PI),
            IonValue::from("caf\u{e9} \u{1F600}"),
        ];
        for value in &values {
            assert_eq!(&roundtrip(value), value);
        }
    }

    #[test]
    fn arrays_roundtrip() {
        let values = [
            IonValue::BoolArray(vec![true, false]),
            IonValue::ByteArray(vec![]),
            IonValue::CharArray(vec!['a', '\0']),
            IonValue::ShortArray(vec![1, -1]),
            IonValue::IntArray(vec![0; 3]),
            IonValue::LongArray(vec![i64::MIN]),
            IonValue::FloatArray(vec![0.5]),
            IonValue::DoubleArray(vec![1e300]),
            IonValue::StringArray(vec!["".into(), "x".into()]),
            IonValue::ObjectArray(vec![IonValue::Int(1), IonValue::Null, IonValue::from("s")]),
        ];
        for value in &values {
            assert_eq!(&roundtrip(value), value);
        }
    }

    #[test]
    fn nested_containers_roundtrip() {
        let mut inner = IonMap::new();
        inner.insert(1i32, vec![1i64, 2]);
        inner.insert("k", IonValue::Sequence(vec![IonValue::Bool(true)]));

        let value = IonValue::Sequence(vec![
            IonValue::Map(inner),
            IonValue::Sequence(vec![]),
            IonValue::Null,
        ]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn randomized_int_sequences() {
        let mut rng = fastrand::Rng::with_seed(0x10);
        for _ in 0..32 {
            let len = rng.usize(0..64);
            let items: Vec<IonValue> = (0..len).map(|_| IonValue::Int(rng.i32(..))).collect();
            let value = IonValue::Sequence(items);
            assert_eq!(roundtrip(&value), value);
        }
    }
}
