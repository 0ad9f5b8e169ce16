// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sequence and map wrappers.
//!
//! Built-in registered types (marks 22 and 23) that let a bundle hold a
//! generic sequence or map as an object. Their payload is the same entry
//! stream the SEQUENCE and MAP marks use.

use crate::capability::IonBinary;
use crate::codec::{IonInput, IonOutput};
use crate::error::Result;
use crate::value::{IonMap, IonValue};

/// Generic sequence stored as a registered object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceWrapper {
    items: Vec<IonValue>,
}

impl SequenceWrapper {
    pub fn new(items: Vec<IonValue>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[IonValue] {
        &self.items
    }

    pub fn into_items(self) -> Vec<IonValue> {
        self.items
    }

    /// Append the wrapped elements to `target`.
    pub fn fill<C: Extend<IonValue>>(&self, target: &mut C) {
        target.extend(self.items.iter().cloned());
    }
}

impl IonBinary for SequenceWrapper {
    fn save(&self, out: &mut IonOutput<'_>) -> Result<()> {
        out.write_sequence(&self.items)
    }

    fn load(&mut self, input: &mut IonInput<'_>) -> Result<()> {
        self.items = input.read_sequence()?;
        Ok(())
    }
}

/// Generic map stored as a registered object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapWrapper {
    map: IonMap,
}

impl MapWrapper {
    pub fn new(map: IonMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &IonMap {
        &self.map
    }

    pub fn into_map(self) -> IonMap {
        self.map
    }

    /// Insert the wrapped pairs into `target`.
    pub fn fill<C: Extend<(IonValue, IonValue)>>(&self, target: &mut C) {
        target.extend(self.map.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl IonBinary for MapWrapper {
    fn save(&self, out: &mut IonOutput<'_>) -> Result<()> {
        out.write_map(&self.map)
    }

    fn load(&mut self, input: &mut IonInput<'_>) -> Result<()> {
        self.map = input.read_map()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark;
    use crate::registry::Registry;

    fn encode(value: &IonValue, registry: &Registry) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut out = IonOutput::with_registry(&mut buf, registry, Default::default());
        out.write_object(value).unwrap();
        out.close().unwrap();
        buf
    }

    #[test]
    fn sequence_wrapper_uses_entry_stream() {
        let registry = Registry::new();
        let wrapper = SequenceWrapper::new(vec![IonValue::Byte(7)]);
        let bytes = encode(&IonValue::object(wrapper.clone()), &registry);

        assert_eq!(
            bytes,
            vec![mark::SEQUENCE_WRAPPER, mark::ENTRY, mark::BYTE, 7, mark::END]
        );

        let mut input = IonInput::with_registry(&bytes[..], &registry, Default::default());
        let decoded = input.read_object().unwrap();
        assert_eq!(decoded.downcast_ref::<SequenceWrapper>(), Some(&wrapper));
    }

    #[test]
    fn map_wrapper_roundtrip() {
        let registry = Registry::new();
        let map: IonMap = vec![("k", 1i32)].into_iter().collect();
        let bytes = encode(&IonValue::object(MapWrapper::new(map.clone())), &registry);
        assert_eq!(bytes[0], mark::MAP_WRAPPER);

        let mut input = IonInput::with_registry(&bytes[..], &registry, Default::default());
        let decoded = input.read_object().unwrap();
        assert_eq!(decoded.as_map(), Some(&map));
    }

    #[test]
    fn fill_extends_target() {
        let wrapper = SequenceWrapper::new(vec![IonValue::Int(1), IonValue::Int(2)]);
        let mut target = vec![IonValue::Int(0)];
        wrapper.fill(&mut target);
        assert_eq!(target.len(), 3);

        let map_wrapper = MapWrapper::new(vec![("a", 1i32)].into_iter().collect());
        let mut map = IonMap::new();
        map_wrapper.fill(&mut map);
        assert_eq!(map.get("a"), Some(&IonValue::Int(1)));
    }
}
