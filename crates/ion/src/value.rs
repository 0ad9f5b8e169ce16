// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Value model.
//!
//! [`IonValue`] is the closed set of things the codec knows how to write:
//! primitives, primitive arrays, strings, generic sequences and maps, and
//! registered objects carried type-erased in an [`IonObject`].

use crate::wrapper::{MapWrapper, SequenceWrapper};
use std::any::{Any, TypeId};
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

/// A value that can be written with a leading mark.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum IonValue {
    #[default]
    Null,

    // Scalars
    Bool(bool),
    Byte(u8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),

    // Primitive arrays (4-byte length prefix)
    BoolArray(Vec<bool>),
    ByteArray(Vec<u8>),
    CharArray(Vec<char>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),

    // Containers
    ObjectArray(Vec<IonValue>),
    Sequence(Vec<IonValue>),
    Map(IonMap),

    /// Instance of a registered type.
    Object(IonObject),
}

impl IonValue {
    /// Wrap an instance of a registered type.
    pub fn object<T: ObjectValue>(value: T) -> Self {
        Self::Object(IonObject::new(value))
    }

    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to a concrete Rust type, `None` on a kind mismatch.
    pub fn to<T: FromIonValue>(&self) -> Option<T> {
        T::from_ion(self)
    }

    /// Try to get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a sequence or object array.
    pub fn as_sequence(&self) -> Option<&[IonValue]> {
        match self {
            Self::Sequence(items) | Self::ObjectArray(items) => Some(items),
            Self::Object(obj) => obj
                .downcast_ref::<SequenceWrapper>()
                .map(SequenceWrapper::items),
            _ => None,
        }
    }

    /// Entries of a generic map.
    pub fn as_map(&self) -> Option<&IonMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Object(obj) => obj.downcast_ref::<MapWrapper>().map(MapWrapper::map),
            _ => None,
        }
    }

    /// The registered object, if this is one.
    pub fn as_object(&self) -> Option<&IonObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Borrow the registered object as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(IonObject::downcast_ref)
    }

    /// Short name of the value kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::BoolArray(_) => "bool[]",
            Self::ByteArray(_) => "byte[]",
            Self::CharArray(_) => "char[]",
            Self::ShortArray(_) => "short[]",
            Self::IntArray(_) => "int[]",
            Self::LongArray(_) => "long[]",
            Self::FloatArray(_) => "float[]",
            Self::DoubleArray(_) => "double[]",
            Self::StringArray(_) => "string[]",
            Self::ObjectArray(_) => "object[]",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
            Self::Object(obj) => obj.type_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registered objects
// ---------------------------------------------------------------------------

/// Object-safe view of a registered value.
///
/// Blanket-implemented for every `Any + Send + Sync + Debug + Clone + PartialEq`
/// type, so registered types only need the usual derives.
pub trait ObjectValue: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_object(&self) -> Box<dyn ObjectValue>;
    fn eq_object(&self, other: &dyn ObjectValue) -> bool;
    fn object_type_name(&self) -> &'static str;
}

impl<T> ObjectValue for T
where
    T: Any + Send + Sync + fmt::Debug + Clone + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_object(&self) -> Box<dyn ObjectValue> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn ObjectValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn object_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Type-erased instance of a registered type.
pub struct IonObject(Box<dyn ObjectValue>);

impl IonObject {
    pub fn new<T: ObjectValue>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Runtime type of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    /// Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.0.object_type_name()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.as_any_mut().downcast_mut::<T>()
    }

    /// Take the wrapped value out, `None` if it is not a `T`.
    pub fn into_inner<T: Any>(self) -> Option<T> {
        self.0.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl Clone for IonObject {
    fn clone(&self) -> Self {
        Self(self.0.clone_object())
    }
}

impl PartialEq for IonObject {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_object(other.0.as_ref())
    }
}

impl fmt::Debug for IonObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

// ---------------------------------------------------------------------------
// IonMap
// ---------------------------------------------------------------------------

/// Generic key/value container written with the MAP mark.
///
/// Keys are arbitrary values compared with `==`. Iteration order is not part
/// of the contract: decoding does not promise to reproduce the order of the
/// map that was written.
#[derive(Clone, Default)]
pub struct IonMap {
    entries: Vec<(IonValue, IonValue)>,
    /// Key hash to positions in `entries`.
    index: HashMap<u64, Vec<usize>>,
    hasher: RandomState,
}

impl IonMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            hasher: RandomState::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a pair, returning the previous value stored under an equal key.
    pub fn insert(
        &mut self,
        key: impl Into<IonValue>,
        value: impl Into<IonValue>,
    ) -> Option<IonValue> {
        let key = key.into();
        let value = value.into();
        let hash = self.hash_of(&key);
        if let Some(idx) = self.find(hash, &key) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        self.index.entry(hash).or_default().push(self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: impl Into<IonValue>) -> Option<&IonValue> {
        self.get_value(&key.into())
    }

    pub fn get_value(&self, key: &IonValue) -> Option<&IonValue> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn contains_key(&self, key: impl Into<IonValue>) -> bool {
        self.position(&key.into()).is_some()
    }

    pub fn remove(&mut self, key: impl Into<IonValue>) -> Option<IonValue> {
        let key = key.into();
        let hash = self.hash_of(&key);
        let idx = self.find(hash, &key)?;
        self.unindex(hash, idx);

        let last = self.entries.len() - 1;
        if idx != last {
            let moved = self.hash_of(&self.entries[last].0);
            if let Some(slot) = self
                .index
                .get_mut(&moved)
                .and_then(|bucket| bucket.iter_mut().find(|i| **i == last))
            {
                *slot = idx;
            }
        }
        Some(self.entries.swap_remove(idx).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IonValue, &IonValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &IonValue> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &IonValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    fn position(&self, key: &IonValue) -> Option<usize> {
        self.find(self.hash_of(key), key)
    }

    fn find(&self, hash: u64, key: &IonValue) -> Option<usize> {
        // a key holding NaN equals nothing, not even itself
        if holds_nan(key) {
            return None;
        }
        self.index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&idx| self.entries[idx].0 == *key)
    }

    fn unindex(&mut self, hash: u64, idx: usize) {
        if let Some(bucket) = self.index.get_mut(&hash) {
            bucket.retain(|&i| i != idx);
            if bucket.is_empty() {
                self.index.remove(&hash);
            }
        }
    }

    fn hash_of(&self, key: &IonValue) -> u64 {
        let mut state = self.hasher.build_hasher();
        hash_value(key, &mut state);
        state.finish()
    }
}

/// Hash consistent with `IonValue` equality.
///
/// Objects hash by type only and maps by size, so keys of those kinds share
/// buckets with equal-typed neighbours.
fn hash_value<H: Hasher>(value: &IonValue, state: &mut H) {
    std::mem::discriminant(value).hash(state);
    match value {
        IonValue::Null => {}
        IonValue::Bool(v) => v.hash(state),
        IonValue::Byte(v) => v.hash(state),
        IonValue::Char(v) => v.hash(state),
        IonValue::Short(v) => v.hash(state),
        IonValue::Int(v) => v.hash(state),
        IonValue::Long(v) => v.hash(state),
        IonValue::Float(v) => hash_f32(*v, state),
        IonValue::Double(v) => hash_f64(*v, state),
        IonValue::String(v) => v.hash(state),
        IonValue::BoolArray(v) => v.hash(state),
        IonValue::ByteArray(v) => v.hash(state),
        IonValue::CharArray(v) => v.hash(state),
        IonValue::ShortArray(v) => v.hash(state),
        IonValue::IntArray(v) => v.hash(state),
        IonValue::LongArray(v) => v.hash(state),
        IonValue::FloatArray(v) => {
            v.len().hash(state);
            v.iter().for_each(|x| hash_f32(*x, state));
        }
        IonValue::DoubleArray(v) => {
            v.len().hash(state);
            v.iter().for_each(|x| hash_f64(*x, state));
        }
        IonValue::StringArray(v) => v.hash(state),
        IonValue::ObjectArray(items) | IonValue::Sequence(items) => {
            items.len().hash(state);
            items.iter().for_each(|item| hash_value(item, state));
        }
        IonValue::Map(map) => map.len().hash(state),
        IonValue::Object(obj) => obj.type_id().hash(state),
    }
}

fn holds_nan(value: &IonValue) -> bool {
    match value {
        IonValue::Float(v) => v.is_nan(),
        IonValue::Double(v) => v.is_nan(),
        IonValue::FloatArray(v) => v.iter().any(|x| x.is_nan()),
        IonValue::DoubleArray(v) => v.iter().any(|x| x.is_nan()),
        IonValue::ObjectArray(items) | IonValue::Sequence(items) => items.iter().any(holds_nan),
        IonValue::Map(map) => map.iter().any(|(k, v)| holds_nan(k) || holds_nan(v)),
        _ => false,
    }
}

// -0.0 == 0.0, so both hash as zero
fn hash_f32<H: Hasher>(v: f32, state: &mut H) {
    let bits = if v == 0.0 { 0 } else { v.to_bits() };
    bits.hash(state);
}

fn hash_f64<H: Hasher>(v: f64, state: &mut H) {
    let bits = if v == 0.0 { 0 } else { v.to_bits() };
    bits.hash(state);
}

impl fmt::Debug for IonMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for IonMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get_value(k) == Some(v))
    }
}

impl<K: Into<IonValue>, V: Into<IonValue>> FromIterator<(K, V)> for IonMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = IonMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<IonValue>, V: Into<IonValue>> Extend<(K, V)> for IonMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for IonMap {
    type Item = (IonValue, IonValue);
    type IntoIter = std::vec::IntoIter<(IonValue, IonValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Fallible conversion out of an [`IonValue`].
///
/// Conversions are exact: an `Int` does not convert to `i64`.
pub trait FromIonValue: Sized {
    fn from_ion(value: &IonValue) -> Option<Self>;
}

macro_rules! copy_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for IonValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl FromIonValue for $ty {
                fn from_ion(value: &IonValue) -> Option<Self> {
                    match value {
                        IonValue::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

macro_rules! owned_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for IonValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl FromIonValue for $ty {
                fn from_ion(value: &IonValue) -> Option<Self> {
                    match value {
                        IonValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

copy_conversions! {
    bool => Bool,
    u8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

owned_conversions! {
    String => String,
    Vec<bool> => BoolArray,
    Vec<u8> => ByteArray,
    Vec<char> => CharArray,
    Vec<i16> => ShortArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
    Vec<String> => StringArray,
}

impl From<&str> for IonValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<IonMap> for IonValue {
    fn from(v: IonMap) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<IonValue>> From<Option<T>> for IonValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl FromIonValue for IonValue {
    fn from_ion(value: &IonValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromIonValue for Vec<IonValue> {
    fn from_ion(value: &IonValue) -> Option<Self> {
        value.as_sequence().map(<[IonValue]>::to_vec)
    }
}

impl FromIonValue for IonMap {
    fn from_ion(value: &IonValue) -> Option<Self> {
        value.as_map().cloned()
    }
}
