//! Dynamically typed access to a heterogeneous map.
//!
//! Keys arrive as [`AnyKey`] and values as [`DynValue`], so both have to be
//! checked at runtime. A key of the wrong kind is always an error, never a
//! silent miss. Bulk updates validate every entry before applying any.

use crate::{AnyKey, DynValue, HeteroMap, HeteroMapError, KeyKind, MapKey, MutableHeteroMap, Value};

/// Mapping operations over untyped keys and values.
///
/// Implemented for every [`MutableHeteroMap`].
pub trait DynamicMap: MutableHeteroMap {
    fn key_kind(&self) -> KeyKind {
        <Self::Key as MapKey>::KIND
    }

    /// Convert `key` to this map's key type.
    fn typed_key(&self, key: &AnyKey) -> Result<Self::Key, HeteroMapError> {
        <Self::Key as MapKey>::from_any_key(key).ok_or(HeteroMapError::KeyType {
            expected: self.key_kind(),
            found: key.type_name(),
        })
    }

    fn contains_any(&self, key: &AnyKey) -> Result<bool, HeteroMapError> {
        let key = self.typed_key(key)?;
        Ok(self.contains_key(&key))
    }

    fn get_item(&self, key: &AnyKey) -> Result<&Value, HeteroMapError> {
        let typed = self.typed_key(key)?;
        self.get_value(&typed)
            .ok_or_else(|| HeteroMapError::KeyNotFound(key.to_string()))
    }

    fn get(&self, key: &AnyKey) -> Result<Option<&Value>, HeteroMapError> {
        let key = self.typed_key(key)?;
        Ok(self.get_value(&key))
    }

    fn get_or(&self, key: &AnyKey, default: Value) -> Result<Value, HeteroMapError> {
        Ok(self.get(key)?.cloned().unwrap_or(default))
    }

    fn any_keys(&self) -> Vec<AnyKey> {
        self.keys().iter().map(MapKey::to_any_key).collect()
    }

    /// Values in the same order as [`DynamicMap::items`].
    fn values(&self) -> Vec<&Value> {
        self.keys()
            .iter()
            .filter_map(|k| self.get_value(k))
            .collect()
    }

    fn items(&self) -> Vec<(AnyKey, &Value)> {
        self.keys()
            .iter()
            .filter_map(|k| self.get_value(k).map(|v| (k.to_any_key(), v)))
            .collect()
    }

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: AnyKey, value: DynValue) -> Result<(), HeteroMapError> {
        let key = self.typed_key(&key)?;
        let value = Value::try_from_any(value)?;
        self.set_value(key, value);
        Ok(())
    }

    /// Copy every entry of `other`, whose keys must convert to this map's
    /// key type.
    fn update_mapping<M: HeteroMap>(&mut self, other: &M) -> Result<(), HeteroMapError> {
        let mut staged = Vec::with_capacity(other.len());
        for key in other.keys() {
            let typed = self.typed_key(&key.to_any_key())?;
            if let Some(value) = other.get_value(&key) {
                staged.push((typed, value.clone()));
            }
        }
        apply(self, staged);
        Ok(())
    }

    fn update_pairs<I>(&mut self, pairs: I) -> Result<(), HeteroMapError>
    where
        I: IntoIterator<Item = (AnyKey, DynValue)>,
    {
        let mut staged = Vec::new();
        for (key, value) in pairs {
            let key = self.typed_key(&key)?;
            staged.push((key, Value::try_from_any(value)?));
        }
        apply(self, staged);
        Ok(())
    }

    /// Keyword-style update: every key is a string.
    fn update_kwargs<'a, I>(&mut self, kwargs: I) -> Result<(), HeteroMapError>
    where
        I: IntoIterator<Item = (&'a str, DynValue)>,
    {
        self.update_pairs(
            kwargs
                .into_iter()
                .map(|(name, value)| (AnyKey::from(name), value)),
        )
    }

    fn del_item(&mut self, key: &AnyKey) -> Result<(), HeteroMapError> {
        self.pop(key).map(drop)
    }

    fn pop(&mut self, key: &AnyKey) -> Result<Value, HeteroMapError> {
        let typed = self.typed_key(key)?;
        self.remove_value(&typed)
            .ok_or_else(|| HeteroMapError::KeyNotFound(key.to_string()))
    }

    fn pop_or(&mut self, key: &AnyKey, default: Value) -> Result<Value, HeteroMapError> {
        let key = self.typed_key(key)?;
        Ok(self.remove_value(&key).unwrap_or(default))
    }

    /// Remove and return some entry; `Empty` once nothing is left.
    fn popitem(&mut self) -> Result<(AnyKey, Value), HeteroMapError> {
        self.take_any()
            .map(|(k, v)| (k.to_any_key(), v))
            .ok_or(HeteroMapError::Empty)
    }
}

impl<M: MutableHeteroMap> DynamicMap for M {}

fn apply<M: MutableHeteroMap + ?Sized>(map: &mut M, staged: Vec<(M::Key, Value)>) {
    log::trace!("applying {} validated entries", staged.len());
    for (key, value) in staged {
        map.set_value(key, value);
    }
}
