// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! External adapters.
//!
//! An adapter serializes a type it does not own, for instance a type from a
//! third-party crate that cannot implement [`IonBinary`](crate::IonBinary) or
//! [`IonBundled`](crate::IonBundled). The target type is the adapter trait's
//! generic parameter.
//!
//! ```text
//! Registry
//! +-- by_mark:  mark    -> Entry { type, kind }
//! +-- by_type:  TypeId  -> mark
//! +-- adapters: TypeId  -> Arc<dyn ErasedAdapter>   (consulted first)
//! ```

use std::marker::PhantomData;

use crate::bundle::IonBundle;
use crate::codec::{IonInput, IonOutput};
use crate::error::{IonError, Result};
use crate::value::{IonObject, ObjectValue};

/// Writes and reads a `T` directly on the stream.
pub trait BinaryAdapter<T>: Send + Sync + 'static {
    fn save(&self, value: &T, out: &mut IonOutput<'_>) -> Result<()>;
    fn load(&self, input: &mut IonInput<'_>) -> Result<T>;
}

/// Stores and restores a `T` through a bundle.
pub trait BundledAdapter<T>: Send + Sync + 'static {
    fn save(&self, value: &T, bundle: &mut IonBundle) -> Result<()>;
    fn load(&self, bundle: &IonBundle) -> Result<T>;
}

/// Adapter with its target type erased, as stored in the registry.
pub(crate) trait ErasedAdapter: Send + Sync {
    fn save(&self, value: &IonObject, out: &mut IonOutput<'_>) -> Result<()>;
    fn load(&self, input: &mut IonInput<'_>) -> Result<IonObject>;
}

pub(crate) struct BinaryHandle<T, A> {
    adapter: A,
    _target: PhantomData<fn() -> T>,
}

impl<T, A> BinaryHandle<T, A> {
    pub(crate) fn new(adapter: A) -> Self {
        Self {
            adapter,
            _target: PhantomData,
        }
    }
}

impl<T: ObjectValue, A: BinaryAdapter<T>> ErasedAdapter for BinaryHandle<T, A> {
    fn save(&self, value: &IonObject, out: &mut IonOutput<'_>) -> Result<()> {
        let target = downcast::<T>(value)?;
        self.adapter.save(target, out)
    }

    fn load(&self, input: &mut IonInput<'_>) -> Result<IonObject> {
        self.adapter.load(input).map(IonObject::new)
    }
}

pub(crate) struct BundledHandle<T, A> {
    adapter: A,
    _target: PhantomData<fn() -> T>,
}

impl<T, A> BundledHandle<T, A> {
    pub(crate) fn new(adapter: A) -> Self {
        Self {
            adapter,
            _target: PhantomData,
        }
    }
}

impl<T: ObjectValue, A: BundledAdapter<T>> ErasedAdapter for BundledHandle<T, A> {
    fn save(&self, value: &IonObject, out: &mut IonOutput<'_>) -> Result<()> {
        let target = downcast::<T>(value)?;
        let mut bundle = out.new_bundle();
        self.adapter.save(target, &mut bundle)?;
        out.write_bundle(&bundle)
    }

    fn load(&self, input: &mut IonInput<'_>) -> Result<IonObject> {
        let bundle = input.read_bundle()?;
        self.adapter.load(&bundle).map(IonObject::new)
    }
}

fn downcast<T: ObjectValue>(value: &IonObject) -> Result<&T> {
    value.downcast_ref::<T>().ok_or_else(|| {
        IonError::Unsupported(format!(
            "adapter for {} cannot save {}",
            std::any::type_name::<T>(),
            value.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[derive(Debug, Clone, PartialEq)]
    struct Celsius(f64);

    struct CelsiusAdapter;

    impl BinaryAdapter<Celsius> for CelsiusAdapter {
        fn save(&self, value: &Celsius, out: &mut IonOutput<'_>) -> Result<()> {
            out.write_double(value.0)
        }

        fn load(&self, input: &mut IonInput<'_>) -> Result<Celsius> {
            Ok(Celsius(input.read_double()?))
        }
    }

    struct CelsiusBundler;

    impl BundledAdapter<Celsius> for CelsiusBundler {
        fn save(&self, value: &Celsius, bundle: &mut IonBundle) -> Result<()> {
            bundle.put_double("deg", value.0);
            Ok(())
        }

        fn load(&self, bundle: &IonBundle) -> Result<Celsius> {
            Ok(Celsius(bundle.get_double("deg", f64::NAN)))
        }
    }

    #[test]
    fn test_binary_handle_roundtrip() {
        let registry = Registry::new();
        let handle = BinaryHandle::<Celsius, _>::new(CelsiusAdapter);

        let mut buf = Vec::new();
        {
            let mut out = IonOutput::with_registry(&mut buf, &registry, Default::default());
            handle
                .save(&IonObject::new(Celsius(21.5)), &mut out)
                .unwrap();
            out.close().unwrap();
        }
        assert_eq!(buf, 21.5f64.to_be_bytes());

        let mut input = IonInput::with_registry(&buf[..], &registry, Default::default());
        let loaded = handle.load(&mut input).unwrap();
        assert_eq!(loaded.downcast_ref::<Celsius>(), Some(&Celsius(21.5)));
    }

    #[test]
    fn test_bundled_handle_roundtrip() {
        let registry = Registry::new();
        let handle = BundledHandle::<Celsius, _>::new(CelsiusBundler);

        let mut buf = Vec::new();
        {
            let mut out = IonOutput::with_registry(&mut buf, &registry, Default::default());
            handle.save(&IonObject::new(Celsius(-4.0)), &mut out).unwrap();
            out.close().unwrap();
        }

        let mut input = IonInput::with_registry(&buf[..], &registry, Default::default());
        let loaded = handle.load(&mut input).unwrap();
        assert_eq!(loaded.into_inner::<Celsius>(), Some(Celsius(-4.0)));
    }

    #[test]
    fn test_handle_rejects_foreign_value() {
        let registry = Registry::new();
        let handle = BinaryHandle::<Celsius, _>::new(CelsiusAdapter);
        let mut out = IonOutput::with_registry(Vec::new(), &registry, Default::default());
        let err = handle.save(&IonObject::new(42u32), &mut out).unwrap_err();
        assert!(matches!(err, IonError::Unsupported(_)));
    }
}
