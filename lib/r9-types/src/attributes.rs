/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the r9 authors
 */

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use foldhash::fast::FixedState;

struct KeyInner {
    debug_name: String,
}

/// A typed capability token identifying one attribute slot.
///
/// Keys compare by identity, not by name: two keys created with the same
/// debug name address different slots. Define keys as shared constants and
/// clone them wherever the value is read back.
pub struct Key<T> {
    inner: Arc<KeyInner>,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Key<T> {
    pub fn new(debug_name: impl Into<String>) -> Self {
        Key {
            inner: Arc::new(KeyInner {
                debug_name: debug_name.into(),
            }),
            _marker: PhantomData,
        }
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Key {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.inner.debug_name)
    }
}

/// One stored attribute. Holding the key's allocation here keeps its address
/// from being reused by a key created after the original was dropped.
#[derive(Clone)]
struct Slot {
    _key: Arc<KeyInner>,
    value: Arc<dyn Any + Send + Sync>,
}

type AttrMap = HashMap<usize, Slot, FixedState>;

/// An immutable identity-keyed map of out-of-band metadata.
///
/// Cloning is cheap. Two instances holding identical pairs stay distinct,
/// callers merge explicitly through [`Attributes::to_builder`].
#[derive(Clone, Default)]
pub struct Attributes {
    map: Arc<AttrMap>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes::default()
    }

    pub fn builder() -> AttributesBuilder {
        AttributesBuilder {
            map: HashMap::with_hasher(FixedState::with_seed(0)),
        }
    }

    pub fn to_builder(&self) -> AttributesBuilder {
        AttributesBuilder {
            map: self.map.as_ref().clone(),
        }
    }

    pub fn get<T: Any + Send + Sync>(&self, key: &Key<T>) -> Option<&T> {
        self.map
            .get(&key.id())
            .and_then(|slot| slot.value.downcast_ref::<T>())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attributes({} entries)", self.map.len())
    }
}

pub struct AttributesBuilder {
    map: AttrMap,
}

impl AttributesBuilder {
    pub fn set<T: Any + Send + Sync>(mut self, key: &Key<T>, value: T) -> Self {
        self.map.insert(
            key.id(),
            Slot {
                _key: Arc::clone(&key.inner),
                value: Arc::new(value),
            },
        );
        self
    }

    pub fn remove<T: Any + Send + Sync>(mut self, key: &Key<T>) -> Self {
        self.map.remove(&key.id());
        self
    }

    pub fn build(self) -> Attributes {
        Attributes {
            map: Arc::new(self.map),
        }
    }
}
