use crate::storable::downcast_arc;
use crate::{HeteroMapError, Key, MapKey, Storable, Value, ValueType};
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

fn not_found<K: fmt::Display, T: ?Sized>(key: &Key<K, T>) -> HeteroMapError {
    HeteroMapError::KeyNotFound(key.to_string())
}

/// Read access to a map whose values may have different types.
///
/// Implementors provide the untyped primitives; the typed accessors are
/// derived from them. A typed lookup succeeds only when the stored value has
/// exactly the key's value type.
pub trait HeteroMap {
    type Key: MapKey;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` if any value, of any type, is stored under `key`.
    fn contains_key(&self, key: &Self::Key) -> bool;

    /// All keys, in no particular order.
    fn keys(&self) -> Vec<Self::Key>;

    fn get_value(&self, key: &Self::Key) -> Option<&Value>;

    fn get_value_mut(&mut self, key: &Self::Key) -> Option<&mut Value>;

    fn at<T: ValueType>(&self, key: &Key<Self::Key, T>) -> Result<&T, HeteroMapError> {
        self.get_value(key.id())
            .and_then(T::from_value)
            .ok_or_else(|| not_found(key))
    }

    fn at_mut<T: ValueType>(&mut self, key: &Key<Self::Key, T>) -> Result<&mut T, HeteroMapError> {
        match self.get_value_mut(key.id()).and_then(T::from_value_mut) {
            Some(v) => Ok(v),
            None => Err(not_found(key)),
        }
    }

    fn contains<T: ValueType>(&self, key: &Key<Self::Key, T>) -> bool {
        self.at(key).is_ok()
    }

    /// An owned storable of concrete type `T`.
    fn at_storable<T: Storable>(&self, key: &Key<Self::Key, T>) -> Result<&T, HeteroMapError> {
        match self.get_value(key.id()) {
            Some(Value::Storable(b)) => b.downcast_ref::<T>().ok_or_else(|| not_found(key)),
            _ => Err(not_found(key)),
        }
    }

    fn at_storable_mut<T: Storable>(
        &mut self,
        key: &Key<Self::Key, T>,
    ) -> Result<&mut T, HeteroMapError> {
        match self.get_value_mut(key.id()) {
            Some(Value::Storable(b)) => match b.downcast_mut::<T>() {
                Some(v) => Ok(v),
                None => Err(not_found(key)),
            },
            _ => Err(not_found(key)),
        }
    }

    /// An owned storable of any concrete type.
    fn at_dyn(&self, key: &Key<Self::Key, dyn Storable>) -> Result<&dyn Storable, HeteroMapError> {
        match self.get_value(key.id()) {
            Some(Value::Storable(b)) => Ok(&**b),
            _ => Err(not_found(key)),
        }
    }

    /// A shared storable of concrete type `T`.
    fn at_shared<T: Storable>(&self, key: &Key<Self::Key, Arc<T>>) -> Result<Arc<T>, HeteroMapError> {
        match self.get_value(key.id()) {
            Some(Value::Shared(a)) => downcast_arc::<T>(a.clone()).ok_or_else(|| not_found(key)),
            _ => Err(not_found(key)),
        }
    }

    fn contains_storable<T: Storable>(&self, key: &Key<Self::Key, T>) -> bool {
        self.at_storable(key).is_ok()
    }

    fn contains_dyn(&self, key: &Key<Self::Key, dyn Storable>) -> bool {
        self.at_dyn(key).is_ok()
    }

    fn contains_shared<T: Storable>(&self, key: &Key<Self::Key, Arc<T>>) -> bool {
        self.at_shared(key).is_ok()
    }
}

/// A [`HeteroMap`] that supports insertion and removal.
pub trait MutableHeteroMap: HeteroMap {
    fn clear(&mut self);

    /// Store `value` unless `key` is already taken. Returns whether it was
    /// stored.
    fn insert_value(&mut self, key: Self::Key, value: Value) -> bool;

    /// Store `value`, replacing and returning any previous value.
    fn set_value(&mut self, key: Self::Key, value: Value) -> Option<Value>;

    fn remove_value(&mut self, key: &Self::Key) -> Option<Value>;

    /// Remove some entry, if any.
    fn take_any(&mut self) -> Option<(Self::Key, Value)>;

    fn insert<T: ValueType>(&mut self, key: &Key<Self::Key, T>, value: T) -> bool {
        self.insert_value(key.id().clone(), value.into_value())
    }

    fn insert_storable<T: Storable>(&mut self, key: &Key<Self::Key, T>, value: T) -> bool {
        self.insert_value(key.id().clone(), Value::Storable(Box::new(value)))
    }

    fn insert_dyn(&mut self, key: &Key<Self::Key, dyn Storable>, value: Box<dyn Storable>) -> bool {
        self.insert_value(key.id().clone(), Value::Storable(value))
    }

    fn insert_shared<T: Storable>(&mut self, key: &Key<Self::Key, Arc<T>>, value: Arc<T>) -> bool {
        self.insert_value(key.id().clone(), Value::Shared(value))
    }

    /// Remove the value under `key` if it has type `T`.
    fn erase<T: ValueType>(&mut self, key: &Key<Self::Key, T>) -> bool {
        self.contains(key) && self.remove_value(key.id()).is_some()
    }

    fn erase_storable<T: Storable>(&mut self, key: &Key<Self::Key, T>) -> bool {
        self.contains_storable(key) && self.remove_value(key.id()).is_some()
    }

    fn erase_shared<T: Storable>(&mut self, key: &Key<Self::Key, Arc<T>>) -> bool {
        self.contains_shared(key) && self.remove_value(key.id()).is_some()
    }
}

/// A [`MutableHeteroMap`] backed by an [`IndexMap`].
///
/// Removal and [`MutableHeteroMap::take_any`] are constant time, so
/// draining a map costs one step per entry.
#[derive(Clone)]
pub struct SimpleHeteroMap<K: MapKey> {
    values: IndexMap<K, Value>,
}

impl<K: MapKey> SimpleHeteroMap<K> {
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Value)> + '_ {
        self.values.iter()
    }
}

impl<K: MapKey> Default for SimpleHeteroMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: MapKey> HeteroMap for SimpleHeteroMap<K> {
    type Key = K;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    fn keys(&self) -> Vec<K> {
        self.values.keys().cloned().collect()
    }

    fn get_value(&self, key: &K) -> Option<&Value> {
        self.values.get(key)
    }

    fn get_value_mut(&mut self, key: &K) -> Option<&mut Value> {
        self.values.get_mut(key)
    }
}

impl<K: MapKey> MutableHeteroMap for SimpleHeteroMap<K> {
    fn clear(&mut self) {
        self.values.clear();
    }

    fn insert_value(&mut self, key: K, value: Value) -> bool {
        match self.values.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    fn set_value(&mut self, key: K, value: Value) -> Option<Value> {
        self.values.insert(key, value)
    }

    fn remove_value(&mut self, key: &K) -> Option<Value> {
        self.values.swap_remove(key)
    }

    fn take_any(&mut self) -> Option<(K, Value)> {
        self.values.pop()
    }
}

/// Maps are equal when they hold the same keys and each pair of values
/// compares equal.
impl<K: MapKey> PartialEq for SimpleHeteroMap<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .values
                .iter()
                .all(|(k, v)| other.values.get(k).is_some_and(|o| v == o))
    }
}

impl<K: MapKey> FromIterator<(K, Value)> for SimpleHeteroMap<K> {
    /// Later entries replace earlier ones with the same key.
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<K: MapKey> fmt::Debug for SimpleHeteroMap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        f.debug_map().entries(entries).finish()
    }
}

impl<K: MapKey> fmt::Display for SimpleHeteroMap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.write_str("{")?;
        for (i, key) in keys.into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {}", self.values[key])?;
        }
        f.write_str("}")
    }
}
