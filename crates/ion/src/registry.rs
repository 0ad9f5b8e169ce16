// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry.
//!
//! Maps marks to types and back. Every user type that travels inside an
//! [`IonValue::Object`] must be registered under a mark in `50..=255` before
//! it is written or read.
//!
//! # Architecture
//!
//! ```text
//! Registry (process-wide, Registry::global())
//! +-- table: ArcSwap<TypeTable>     snapshot, readers never lock
//! +-- write_lock: Mutex<()>         registrations are serialised
//!
//! TypeTable
//! +-- by_mark:  HashMap<u8, Arc<Entry>>
//! +-- by_type:  HashMap<TypeId, u8>
//! +-- adapters: HashMap<TypeId, Arc<dyn ErasedAdapter>>
//! ```
//!
//! A registration copies the current table, modifies the copy and publishes
//! it. Codec instances load one snapshot when they are created, so a single
//! encode or decode never observes a half-applied registration.
//!
//! # Thread Safety
//!
//! Registration is expected to happen during start-up. It is safe to register
//! concurrently with encoding, but a stream that was opened before a
//! registration will not see it.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::adapter::{BinaryAdapter, BinaryHandle, BundledAdapter, BundledHandle, ErasedAdapter};
use crate::bundle::IonBundle;
use crate::capability::{IonBinary, IonBundled, IonMarked};
use crate::codec::{IonInput, IonOutput};
use crate::error::{IonError, Result};
use crate::mark::{self, Mark, MarkKind};
use crate::value::{IonObject, IonValue, ObjectValue};
use crate::wrapper::{MapWrapper, SequenceWrapper};

/// Process-wide registry instance.
static GLOBAL: OnceLock<Registry> = OnceLock::new();

pub(crate) type LoadFn = fn(&mut IonInput<'_>) -> Result<IonObject>;
pub(crate) type SaveFn = fn(&IonObject, &mut IonOutput<'_>) -> Result<()>;

/// Codec of a type that implements a capability itself.
#[derive(Clone, Copy)]
pub(crate) struct DirectCodec {
    pub(crate) load: LoadFn,
    pub(crate) save: SaveFn,
}

/// One mark/type association.
pub(crate) struct Entry {
    pub(crate) mark: Mark,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) kind: MarkKind,
    pub(crate) direct: Option<DirectCodec>,
}

/// Immutable snapshot of the registry.
#[derive(Clone, Default)]
pub struct TypeTable {
    by_mark: HashMap<Mark, Arc<Entry>>,
    by_type: HashMap<TypeId, Mark>,
    adapters: HashMap<TypeId, Arc<dyn ErasedAdapter>>,
}

impl TypeTable {
    pub(crate) fn entry(&self, mark: Mark) -> Option<&Arc<Entry>> {
        self.by_mark.get(&mark)
    }

    pub(crate) fn entry_for_type(&self, type_id: TypeId) -> Option<&Arc<Entry>> {
        self.by_type.get(&type_id).and_then(|m| self.by_mark.get(m))
    }

    pub(crate) fn adapter(&self, type_id: TypeId) -> Option<&Arc<dyn ErasedAdapter>> {
        self.adapters.get(&type_id)
    }

    /// Mark bound to a type, if any.
    pub fn mark_of_type(&self, type_id: TypeId) -> Option<Mark> {
        self.by_type.get(&type_id).copied()
    }

    /// Capability recorded for a mark, if any.
    pub fn kind_of(&self, mark: Mark) -> Option<MarkKind> {
        self.by_mark.get(&mark).map(|e| e.kind)
    }

    /// Number of registered marks, built-ins included.
    pub fn len(&self) -> usize {
        self.by_mark.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mark.is_empty()
    }

    fn store(&mut self, mark: Mark, registration: Registration) {
        let Registration {
            type_id,
            type_name,
            kind,
            direct,
            adapter,
        } = registration;

        if let Some(adapter) = adapter {
            self.adapters.insert(type_id, adapter);
        }
        self.by_type.insert(type_id, mark);
        self.by_mark.insert(
            mark,
            Arc::new(Entry {
                mark,
                type_id,
                type_name,
                kind,
                direct,
            }),
        );
    }
}

/// What a registration binds to a mark.
///
/// Each constructor picks exactly one capability, which is the one both the
/// writer and the reader use for this mark.
pub struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    kind: MarkKind,
    direct: Option<DirectCodec>,
    adapter: Option<Arc<dyn ErasedAdapter>>,
}

impl Registration {
    /// Type writes its own payload ([`IonBinary`]).
    pub fn binary<T: IonBinary + ObjectValue + Default>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: MarkKind::Binary,
            direct: Some(DirectCodec {
                load: load_binary::<T>,
                save: save_binary::<T>,
            }),
            adapter: None,
        }
    }

    /// Type stores itself in a bundle ([`IonBundled`]).
    pub fn bundled<T: IonBundled + ObjectValue + Default>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: MarkKind::Bundled,
            direct: Some(DirectCodec {
                load: load_bundled::<T>,
                save: save_bundled::<T>,
            }),
            adapter: None,
        }
    }

    /// `T` is written by an external [`BinaryAdapter`].
    pub fn binary_adapter<T, A>(adapter: A) -> Self
    where
        T: ObjectValue,
        A: BinaryAdapter<T>,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: MarkKind::AdapterBinary,
            direct: None,
            adapter: Some(Arc::new(BinaryHandle::<T, A>::new(adapter))),
        }
    }

    /// `T` is written by an external [`BundledAdapter`].
    pub fn bundled_adapter<T, A>(adapter: A) -> Self
    where
        T: ObjectValue,
        A: BundledAdapter<T>,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            kind: MarkKind::AdapterBundled,
            direct: None,
            adapter: Some(Arc::new(BundledHandle::<T, A>::new(adapter))),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> MarkKind {
        self.kind
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .finish()
    }
}

fn load_binary<T: IonBinary + ObjectValue + Default>(
    input: &mut IonInput<'_>,
) -> Result<IonObject> {
    let mut value = T::default();
    IonBinary::load(&mut value, input)?;
    Ok(IonObject::new(value))
}

fn save_binary<T: IonBinary + ObjectValue>(value: &IonObject, out: &mut IonOutput<'_>) -> Result<()> {
    let value = value
        .downcast_ref::<T>()
        .ok_or(IonError::NotRegistered(value.type_name()))?;
    IonBinary::save(value, out)
}

fn load_bundled<T: IonBundled + ObjectValue + Default>(
    input: &mut IonInput<'_>,
) -> Result<IonObject> {
    let bundle = input.read_bundle()?;
    let mut value = T::default();
    IonBundled::load(&mut value, &bundle)?;
    Ok(IonObject::new(value))
}

fn save_bundled<T: IonBundled + ObjectValue>(value: &IonObject, out: &mut IonOutput<'_>) -> Result<()> {
    let value = value
        .downcast_ref::<T>()
        .ok_or(IonError::NotRegistered(value.type_name()))?;
    let mut bundle = out.new_bundle();
    IonBundled::save(value, &mut bundle)?;
    out.write_bundle(&bundle)
}

/// Mark/type registry.
pub struct Registry {
    table: ArcSwap<TypeTable>,
    write_lock: Mutex<()>,
}

impl Registry {
    /// Create an independent registry holding only the built-in types.
    pub fn new() -> Self {
        let mut table = TypeTable::default();
        table.store(mark::BUNDLE, Registration::binary::<IonBundle>());
        table.store(mark::SEQUENCE_WRAPPER, Registration::binary::<SequenceWrapper>());
        table.store(mark::MAP_WRAPPER, Registration::binary::<MapWrapper>());

        Self {
            table: ArcSwap::from_pointee(table),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the process-wide registry.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(|| {
            log::debug!("[ion::registry] global registry initialized");
            Registry::new()
        })
    }

    /// Current snapshot of the table.
    pub fn snapshot(&self) -> Arc<TypeTable> {
        self.table.load_full()
    }

    /// Bind `registration`'s type to `mark`.
    ///
    /// Re-registering the same type under the same mark with the same
    /// capability succeeds without changing anything, except that a new
    /// adapter instance replaces the previous one.
    ///
    /// # Errors
    ///
    /// - [`IonError::MarkOutOfRange`] if `mark > 255`
    /// - [`IonError::ReservedMark`] if `mark` is in `0..=49`
    /// - [`IonError::MarkInUse`] if another type owns `mark`
    /// - [`IonError::TypeAlreadyRegistered`] if the type owns another mark,
    ///   or owns `mark` with a different capability
    pub fn register(&self, mark: u32, registration: Registration) -> Result<()> {
        let _guard = self.write_lock.lock();
        let current = self.table.load_full();

        let mark = validate(&current, mark, &registration)?;
        if current.by_mark.contains_key(&mark) {
            if !registration.kind.is_adapter() {
                log::debug!(
                    "[ion::registry] {} already registered at mark {}",
                    registration.type_name,
                    mark
                );
                return Ok(());
            }
            log::debug!(
                "[ion::registry] replacing adapter of {} at mark {}",
                registration.type_name,
                mark
            );
        }

        log::debug!(
            "[ion::registry] registered {} at mark {} ({:?})",
            registration.type_name,
            mark,
            registration.kind
        );

        let mut next = TypeTable::clone(&current);
        next.store(mark, registration);
        self.table.store(Arc::new(next));
        Ok(())
    }

    pub fn register_binary<T: IonBinary + ObjectValue + Default>(&self, mark: u32) -> Result<()> {
        self.register(mark, Registration::binary::<T>())
    }

    pub fn register_bundled<T: IonBundled + ObjectValue + Default>(&self, mark: u32) -> Result<()> {
        self.register(mark, Registration::bundled::<T>())
    }

    pub fn register_binary_adapter<T, A>(&self, mark: u32, adapter: A) -> Result<()>
    where
        T: ObjectValue,
        A: BinaryAdapter<T>,
    {
        self.register(mark, Registration::binary_adapter::<T, A>(adapter))
    }

    pub fn register_bundled_adapter<T, A>(&self, mark: u32, adapter: A) -> Result<()>
    where
        T: ObjectValue,
        A: BundledAdapter<T>,
    {
        self.register(mark, Registration::bundled_adapter::<T, A>(adapter))
    }

    /// Register `T` under its declared [`IonMarked::ION_MARK`].
    ///
    /// `registration` must target `T`.
    pub fn register_marked<T: IonMarked + Any>(&self, registration: Registration) -> Result<()> {
        if registration.type_id != TypeId::of::<T>() {
            return Err(IonError::Unsupported(format!(
                "registration for {} used with the mark of {}",
                registration.type_name,
                std::any::type_name::<T>()
            )));
        }
        self.register(T::ION_MARK, registration)
    }

    /// Mark of a registered object value.
    pub fn mark_for(&self, value: &IonValue) -> Result<Mark> {
        match value {
            IonValue::Object(obj) => self
                .snapshot()
                .mark_of_type(obj.type_id())
                .ok_or(IonError::NotRegistered(obj.type_name())),
            other => Err(IonError::NotRegistered(other.kind_name())),
        }
    }

    pub fn mark_of<T: Any>(&self) -> Option<Mark> {
        self.snapshot().mark_of_type(TypeId::of::<T>())
    }

    pub fn is_registered<T: Any>(&self) -> bool {
        self.mark_of::<T>().is_some()
    }

    pub fn kind_of(&self, mark: Mark) -> Option<MarkKind> {
        self.snapshot().kind_of(mark)
    }

    /// Mark denotes a type implementing [`IonBinary`].
    pub fn is_binary(&self, mark: Mark) -> bool {
        self.kind_of(mark) == Some(MarkKind::Binary)
    }

    /// Mark denotes a type implementing [`IonBundled`].
    pub fn is_bundled(&self, mark: Mark) -> bool {
        self.kind_of(mark) == Some(MarkKind::Bundled)
    }

    /// Mark denotes a type handled by a [`BinaryAdapter`].
    pub fn is_adapter_binary(&self, mark: Mark) -> bool {
        self.kind_of(mark) == Some(MarkKind::AdapterBinary)
    }

    /// Mark denotes a type handled by a [`BundledAdapter`].
    pub fn is_adapter_bundled(&self, mark: Mark) -> bool {
        self.kind_of(mark) == Some(MarkKind::AdapterBundled)
    }

    /// Registered marks outside the reserved range, ascending.
    pub fn user_marks(&self) -> Vec<Mark> {
        let table = self.snapshot();
        let mut marks: Vec<Mark> = table
            .by_mark
            .keys()
            .copied()
            .filter(|m| !mark::is_reserved(u32::from(*m)))
            .collect();
        marks.sort_unstable();
        marks
    }

    /// Check that every object inside `value` can be written.
    pub fn check_value(&self, value: &IonValue) -> Result<()> {
        check_value(&self.snapshot(), value)
    }

    /// Drop every user registration, adapters included. Built-ins stay.
    pub fn reset(&self) {
        let _guard = self.write_lock.lock();
        let current = self.table.load_full();

        let mut next = TypeTable::clone(&current);
        next.by_mark.retain(|m, _| mark::is_reserved(u32::from(*m)));
        next.by_type.retain(|_, m| mark::is_reserved(u32::from(*m)));
        let by_type = &next.by_type;
        next.adapters.retain(|t, _| by_type.contains_key(t));

        let removed = current.by_mark.len() - next.by_mark.len();
        self.table.store(Arc::new(next));
        log::info!("[ion::registry] reset, {} user mark(s) removed", removed);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(table: &TypeTable, mark: u32, registration: &Registration) -> Result<Mark> {
    if mark > mark::RANGE_HIGH {
        return Err(IonError::MarkOutOfRange(mark));
    }
    let narrow = Mark::try_from(mark).map_err(|_| IonError::MarkOutOfRange(mark))?;
    if mark::is_reserved(mark) {
        return Err(IonError::ReservedMark(mark));
    }

    if let Some(existing) = table.by_mark.get(&narrow) {
        if existing.type_id != registration.type_id {
            return Err(IonError::MarkInUse {
                mark: narrow,
                registered: existing.type_name,
            });
        }
        if existing.kind != registration.kind {
            return Err(IonError::TypeAlreadyRegistered {
                type_name: registration.type_name,
                mark: narrow,
            });
        }
    }

    if let Some(&owned) = table.by_type.get(&registration.type_id) {
        if owned != narrow {
            return Err(IonError::TypeAlreadyRegistered {
                type_name: registration.type_name,
                mark: owned,
            });
        }
    }

    Ok(narrow)
}

pub(crate) fn check_value(table: &TypeTable, value: &IonValue) -> Result<()> {
    match value {
        IonValue::Object(obj) => {
            if table.mark_of_type(obj.type_id()).is_none() {
                return Err(IonError::NotRegistered(obj.type_name()));
            }
            if let Some(items) = value.as_sequence() {
                items.iter().try_for_each(|v| check_value(table, v))
            } else if let Some(map) = value.as_map() {
                map.iter().try_for_each(|(k, v)| {
                    check_value(table, k)?;
                    check_value(table, v)
                })
            } else {
                Ok(())
            }
        }
        IonValue::Sequence(items) | IonValue::ObjectArray(items) => {
            items.iter().try_for_each(|v| check_value(table, v))
        }
        IonValue::Map(map) => map.iter().try_for_each(|(k, v)| {
            check_value(table, k)?;
            check_value(table, v)
        }),
        _ => Ok(()),
    }
}
