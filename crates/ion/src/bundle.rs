// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data bundle.
//!
//! String-keyed container used by [`IonBundled`] types to save their fields
//! by name. A bundle is itself a registered binary type (mark 21) whose
//! payload is an entry stream of `(key, value)` pairs.
//!
//! # Example
//!
//! ```
//! use ion::IonBundle;
//!
//! let mut bundle = IonBundle::new();
//! bundle.put_int("hp", 40);
//! bundle.put_string("name", "rat");
//!
//! assert_eq!(bundle.get_int("hp", 0), 40);
//! assert_eq!(bundle.get_int("mana", 7), 7); // absent key, fallback
//! assert_eq!(bundle.get_string("name", ""), "rat");
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::capability::{IonBinary, IonBundled};
use crate::codec::{IonInput, IonOutput};
use crate::error::{IonError, Result};
use crate::registry::{self, Registry, TypeTable};
use crate::value::{FromIonValue, IonMap, IonObject, IonValue, ObjectValue};
use crate::wrapper::{MapWrapper, SequenceWrapper};

/// String-keyed value container.
///
/// Entries are kept sorted by key, so the encoded form of equal bundles is
/// identical.
///
/// Objects stored with [`put`](Self::put) are checked against a registry:
/// the one of the codec that handed out the bundle, or the global registry
/// for bundles made with [`new`](Self::new).
#[derive(Clone, Default)]
pub struct IonBundle {
    entries: BTreeMap<String, IonValue>,
    registry: Option<Arc<TypeTable>>,
}

macro_rules! typed_accessors {
    ($($put:ident / $get:ident : $ty:ty),* $(,)?) => {
        $(
            pub fn $put(&mut self, key: impl Into<String>, value: $ty) {
                self.entries.insert(key.into(), IonValue::from(value));
            }

            /// Value under `key`, or `fallback` if absent or of another kind.
            pub fn $get(&self, key: &str, fallback: $ty) -> $ty {
                self.get(key).unwrap_or(fallback)
            }
        )*
    };
}

impl IonBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bound_to(registry: Arc<TypeTable>) -> Self {
        Self {
            entries: BTreeMap::new(),
            registry: Some(registry),
        }
    }

    /// Empty bundle checked against the same registry as `self`.
    fn child(&self) -> Self {
        Self {
            entries: BTreeMap::new(),
            registry: self.registry.clone(),
        }
    }

    typed_accessors! {
        put_bool / get_bool: bool,
        put_byte / get_byte: u8,
        put_char / get_char: char,
        put_short / get_short: i16,
        put_int / get_int: i32,
        put_long / get_long: i64,
        put_float / get_float: f32,
        put_double / get_double: f64,
        put_bools / get_bools: Vec<bool>,
        put_bytes / get_bytes: Vec<u8>,
        put_chars / get_chars: Vec<char>,
        put_shorts / get_shorts: Vec<i16>,
        put_ints / get_ints: Vec<i32>,
        put_longs / get_longs: Vec<i64>,
        put_floats / get_floats: Vec<f32>,
        put_doubles / get_doubles: Vec<f64>,
        put_strings / get_strings: Vec<String>,
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), IonValue::String(value.into()));
    }

    pub fn get_string(&self, key: &str, fallback: &str) -> String {
        self.get_value(key)
            .and_then(IonValue::as_str)
            .unwrap_or(fallback)
            .to_string()
    }

    // -----------------------------------------------------------------------
    // Generic access
    // -----------------------------------------------------------------------

    /// Store an instance of a registered type.
    ///
    /// Primitives have their own `put_*` methods; a value passed here is
    /// always treated as an object and must be registered.
    pub fn put<T: ObjectValue>(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        self.put_value(key, IonValue::Object(IonObject::new(value)))
    }

    /// Store any value. Nulls are ignored; objects, including those nested in
    /// sequences and maps, must be registered.
    pub fn put_value(&mut self, key: impl Into<String>, value: impl Into<IonValue>) -> Result<()> {
        let value = value.into();
        if value.is_null() {
            return Ok(());
        }
        match &self.registry {
            Some(table) => registry::check_value(table, &value)?,
            None => Registry::global().check_value(&value)?,
        }
        self.entries.insert(key.into(), value);
        Ok(())
    }

    /// Store a length-prefixed array of values.
    pub fn put_objects(&mut self, key: impl Into<String>, values: Vec<IonValue>) -> Result<()> {
        self.put_value(key, IonValue::ObjectArray(values))
    }

    /// Value under `key` converted to `T`; `None` if absent or of another kind.
    pub fn get<T: FromIonValue>(&self, key: &str) -> Option<T> {
        self.get_value(key).and_then(T::from_ion)
    }

    pub fn get_or<T: FromIonValue>(&self, key: &str, fallback: T) -> T {
        self.get(key).unwrap_or(fallback)
    }

    pub fn get_value(&self, key: &str) -> Option<&IonValue> {
        self.entries.get(key)
    }

    /// Borrow a registered object stored under `key`.
    pub fn get_object<T: Any>(&self, key: &str) -> Option<&T> {
        self.get_value(key).and_then(IonValue::downcast_ref::<T>)
    }

    // -----------------------------------------------------------------------
    // Nested bundles
    // -----------------------------------------------------------------------

    /// Save `value` into a nested bundle under `key`.
    ///
    /// `T` does not need to be registered; only the nested bundle is written.
    pub fn put_bundled<T: IonBundled>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let mut nested = self.child();
        value.save(&mut nested)?;
        self.put_bundle(key, nested);
        Ok(())
    }

    /// Load `target` from the nested bundle under `key`.
    pub fn load_bundled<T: IonBundled>(&self, key: &str, target: &mut T) -> Result<()> {
        let nested = self.require_bundle(key)?;
        target.load(nested)
    }

    pub fn put_bundle(&mut self, key: impl Into<String>, bundle: IonBundle) {
        self.entries.insert(key.into(), IonValue::from(bundle));
    }

    pub fn get_bundle(&self, key: &str) -> Option<&IonBundle> {
        self.get_object::<IonBundle>(key)
    }

    /// Replace the contents of `target` with the nested bundle under `key`.
    pub fn load_bundle(&self, key: &str, target: &mut IonBundle) -> Result<()> {
        let nested = self.require_bundle(key)?;
        target.entries.clone_from(&nested.entries);
        Ok(())
    }

    fn require_bundle(&self, key: &str) -> Result<&IonBundle> {
        let value = self.require(key)?;
        value
            .downcast_ref::<IonBundle>()
            .ok_or_else(|| mismatch(key, "a bundle"))
    }

    // -----------------------------------------------------------------------
    // Sequences and maps
    // -----------------------------------------------------------------------

    /// Store a sequence under `key`. Elements keep their order.
    pub fn put_sequence<I>(&mut self, key: impl Into<String>, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<IonValue>,
    {
        let items = items.into_iter().map(Into::into).collect();
        self.put_value(key, IonValue::object(SequenceWrapper::new(items)))
    }

    /// Elements of the sequence under `key`.
    pub fn get_sequence(&self, key: &str) -> Option<&[IonValue]> {
        self.get_value(key).and_then(IonValue::as_sequence)
    }

    /// Clear `target` and fill it with the sequence under `key`.
    pub fn load_sequence<T, C>(&self, key: &str, target: &mut C) -> Result<()>
    where
        T: FromIonValue,
        C: Default + Extend<T> + IntoIterator<Item = T>,
    {
        let items = self
            .require(key)?
            .as_sequence()
            .ok_or_else(|| mismatch(key, "a sequence"))?;
        let converted = items
            .iter()
            .map(T::from_ion)
            .collect::<Option<Vec<T>>>()
            .ok_or_else(|| mismatch(key, std::any::type_name::<T>()))?;

        *target = C::default();
        target.extend(converted);
        Ok(())
    }

    /// Store a map under `key`. Pairs with a null value will not be written.
    pub fn put_map<I, K, V>(&mut self, key: impl Into<String>, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<IonValue>,
        V: Into<IonValue>,
    {
        let map: IonMap = pairs.into_iter().collect();
        self.put_value(key, IonValue::object(MapWrapper::new(map)))
    }

    pub fn get_map(&self, key: &str) -> Option<&IonMap> {
        self.get_value(key).and_then(IonValue::as_map)
    }

    /// Clear `target` and fill it with the map under `key`.
    pub fn load_map<K, V, C>(&self, key: &str, target: &mut C) -> Result<()>
    where
        K: FromIonValue,
        V: FromIonValue,
        C: Default + Extend<(K, V)> + IntoIterator<Item = (K, V)>,
    {
        let map = self
            .require(key)?
            .as_map()
            .ok_or_else(|| mismatch(key, "a map"))?;
        let converted = map
            .iter()
            .map(|(k, v)| Some((K::from_ion(k)?, V::from_ion(v)?)))
            .collect::<Option<Vec<(K, V)>>>()
            .ok_or_else(|| mismatch(key, std::any::type_name::<(K, V)>()))?;

        *target = C::default();
        target.extend(converted);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Housekeeping
    // -----------------------------------------------------------------------

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<IonValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy every entry of `other`, replacing equal keys.
    pub fn put_all(&mut self, other: &IonBundle) {
        self.entries
            .extend(other.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IonValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Save a bundled value into a new bundle.
    pub fn wrap<T: IonBundled>(value: &T) -> Result<IonBundle> {
        let mut bundle = IonBundle::new();
        value.save(&mut bundle)?;
        Ok(bundle)
    }

    /// Build a `T` from this bundle.
    pub fn unwrap<T: IonBundled + Default>(&self) -> Result<T> {
        let mut value = T::default();
        value.load(self)?;
        Ok(value)
    }

    /// Insert a decoded entry; the reader has already validated it.
    pub(crate) fn insert_loaded(&mut self, key: String, value: IonValue) {
        self.entries.insert(key, value);
    }

    fn require(&self, key: &str) -> Result<&IonValue> {
        self.get_value(key)
            .ok_or_else(|| IonError::MissingKey(key.to_string()))
    }
}

fn mismatch(key: &str, expected: &'static str) -> IonError {
    IonError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

impl PartialEq for IonBundle {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for IonBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl IonBinary for IonBundle {
    fn save(&self, out: &mut IonOutput<'_>) -> Result<()> {
        out.write_bundle(self)
    }

    fn load(&mut self, input: &mut IonInput<'_>) -> Result<()> {
        input.read_bundle_into(self)
    }
}

impl From<IonBundle> for IonValue {
    fn from(bundle: IonBundle) -> Self {
        IonValue::object(bundle)
    }
}

impl FromIonValue for IonBundle {
    fn from_ion(value: &IonValue) -> Option<Self> {
        value.downcast_ref::<IonBundle>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Stats {
        hp: i32,
        tags: Vec<String>,
    }

    impl IonBundled for Stats {
        fn save(&self, bundle: &mut IonBundle) -> Result<()> {
            bundle.put_int("hp", self.hp);
            bundle.put_strings("tags", self.tags.clone());
            Ok(())
        }

        fn load(&mut self, bundle: &IonBundle) -> Result<()> {
            self.hp = bundle.get_int("hp", 0);
            self.tags = bundle.get_strings("tags", Vec::new());
            Ok(())
        }
    }

    #[test]
    fn typed_getters_fall_back() {
        let mut bundle = IonBundle::new();
        bundle.put_long("id", 99);
        bundle.put_doubles("w", vec![0.5]);

        assert_eq!(bundle.get_long("id", 0), 99);
        assert_eq!(bundle.get_long("missing", -1), -1);
        // wrong kind also falls back
        assert_eq!(bundle.get_int("id", 3), 3);
        assert_eq!(bundle.get_doubles("w", vec![]), vec![0.5]);
        assert_eq!(bundle.get_string("id", "none"), "none");
        assert_eq!(bundle.get_or("missing", 1.5f32), 1.5);
        assert_eq!(bundle.get::<i64>("id"), Some(99));
    }

    #[test]
    fn put_unregistered_object_fails() {
        #[derive(Debug, Clone, PartialEq)]
        struct Loose;

        let mut bundle = IonBundle::new();
        let err = bundle.put("k", Loose).unwrap_err();
        assert!(matches!(err, IonError::NotRegistered(_)));
        assert!(!bundle.contains_key("k"));

        let err = bundle
            .put_sequence("s", vec![IonValue::object(Loose)])
            .unwrap_err();
        assert!(matches!(err, IonError::NotRegistered(_)));
    }

    #[test]
    fn put_value_ignores_null() {
        let mut bundle = IonBundle::new();
        bundle.put_value("n", IonValue::Null).unwrap();
        assert!(bundle.is_empty());
        bundle.put_value("i", 4i16).unwrap();
        assert_eq!(bundle.get_short("i", 0), 4);
    }

    #[test]
    fn bundled_value_roundtrip() {
        let stats = Stats {
            hp: 12,
            tags: vec!["undead".into()],
        };
        let mut bundle = IonBundle::new();
        bundle.put_bundled("stats", &stats).unwrap();
        assert!(bundle.get_bundle("stats").is_some());

        let mut loaded = Stats::default();
        bundle.load_bundled("stats", &mut loaded).unwrap();
        assert_eq!(loaded, stats);
    }

    #[test]
    fn load_family_reports_missing_key() {
        let bundle = IonBundle::new();
        let mut stats = Stats::default();
        let mut seq: Vec<i32> = Vec::new();
        let mut map: HashMap<String, i32> = HashMap::new();
        let mut nested = IonBundle::new();

        assert!(matches!(
            bundle.load_bundled("a", &mut stats),
            Err(IonError::MissingKey(k)) if k == "a"
        ));
        assert!(matches!(
            bundle.load_sequence("b", &mut seq),
            Err(IonError::MissingKey(_))
        ));
        assert!(matches!(
            bundle.load_map("c", &mut map),
            Err(IonError::MissingKey(_))
        ));
        assert!(matches!(
            bundle.load_bundle("d", &mut nested),
            Err(IonError::MissingKey(_))
        ));
    }

    #[test]
    fn load_sequence_clears_target() {
        let mut bundle = IonBundle::new();
        bundle.put_sequence("xs", vec![3i32, 1, 2]).unwrap();

        let mut xs = vec![100i32];
        bundle.load_sequence("xs", &mut xs).unwrap();
        assert_eq!(xs, vec![3, 1, 2]);

        let mut set: BTreeSet<i32> = BTreeSet::new();
        bundle.load_sequence("xs", &mut set).unwrap();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);

        let mut wrong: Vec<String> = Vec::new();
        assert!(matches!(
            bundle.load_sequence("xs", &mut wrong),
            Err(IonError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn load_map_clears_target() {
        let mut bundle = IonBundle::new();
        bundle
            .put_map("m", vec![("a".to_string(), 1i32), ("b".to_string(), 2i32)])
            .unwrap();

        let mut map = HashMap::from([("stale".to_string(), 0i32)]);
        bundle.load_map("m", &mut map).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 1);
        assert_eq!(map["b"], 2);

        assert_eq!(bundle.get_map("m").and_then(|m| m.get("a")), Some(&IonValue::Int(1)));
    }

    #[test]
    fn load_bundle_replaces_contents() {
        let mut inner = IonBundle::new();
        inner.put_bool("flag", true);
        let mut outer = IonBundle::new();
        outer.put_bundle("inner", inner.clone());

        let mut target = IonBundle::new();
        target.put_int("old", 1);
        outer.load_bundle("inner", &mut target).unwrap();
        assert_eq!(target, inner);

        outer.put_int("n", 1);
        assert!(matches!(
            outer.load_bundle("n", &mut target),
            Err(IonError::TypeMismatch { .. })
        ));
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Gem(i32);

    impl IonBinary for Gem {
        fn save(&self, out: &mut IonOutput<'_>) -> Result<()> {
            out.write_int(self.0)
        }

        fn load(&mut self, input: &mut IonInput<'_>) -> Result<()> {
            self.0 = input.read_int()?;
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Chest {
        gem: Gem,
        spare: Vec<Gem>,
    }

    impl IonBundled for Chest {
        fn save(&self, bundle: &mut IonBundle) -> Result<()> {
            bundle.put("gem", self.gem.clone())?;
            bundle.put_sequence("spare", self.spare.iter().cloned().map(IonValue::object))
        }

        fn load(&mut self, bundle: &IonBundle) -> Result<()> {
            self.gem = bundle.get_object::<Gem>("gem").cloned().unwrap_or_default();
            self.spare = bundle
                .get_sequence("spare")
                .unwrap_or_default()
                .iter()
                .filter_map(|v| v.downcast_ref::<Gem>().cloned())
                .collect();
            Ok(())
        }
    }

    #[test]
    fn put_checks_codec_registry() {
        let registry = Registry::new();
        registry.register_binary::<Gem>(90).unwrap();
        registry.register_bundled::<Chest>(91).unwrap();
        assert!(!Registry::global().is_registered::<Gem>());

        let chest = Chest {
            gem: Gem(3),
            spare: vec![Gem(4), Gem(5)],
        };
        let mut buf = Vec::new();
        {
            let mut out = IonOutput::with_registry(&mut buf, &registry, Default::default());
            out.write_object(&IonValue::object(chest.clone())).unwrap();
            out.close().unwrap();
        }

        let mut input = IonInput::with_registry(&buf[..], &registry, Default::default());
        let loaded = input.read_object().unwrap();
        assert_eq!(loaded.downcast_ref::<Chest>(), Some(&chest));

        // a bundle made outside a codec still checks the global registry
        let err = IonBundle::new().put("gem", Gem(1)).unwrap_err();
        assert!(matches!(err, IonError::NotRegistered(_)));
    }

    #[test]
    fn housekeeping() {
        let mut a = IonBundle::new();
        a.put_int("x", 1);
        a.put_int("y", 2);
        let mut b = IonBundle::new();
        b.put_int("y", 20);
        b.put_int("z", 30);

        a.put_all(&b);
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["x", "y", "z"]);
        assert_eq!(a.get_int("y", 0), 20);
        assert_eq!(a.remove("x"), Some(IonValue::Int(1)));
        assert_eq!(a.len(), 2);
        a.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn wrap_and_unwrap() {
        let stats = Stats {
            hp: 3,
            tags: vec![],
        };
        let bundle = IonBundle::wrap(&stats).unwrap();
        assert_eq!(bundle.get_int("hp", 0), 3);
        assert_eq!(bundle.unwrap::<Stats>().unwrap(), stats);
    }
}
