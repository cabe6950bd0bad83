use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// The key type a map instance accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Int,
    Long,
    Str,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyKind::Int => "i32",
            KeyKind::Long => "i64",
            KeyKind::Str => "String",
        })
    }
}

/// A key as it arrives through the dynamically typed interface.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyKey {
    Int(i64),
    Float(f64),
    Str(String),
}

impl AnyKey {
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyKey::Int(_) => "integer",
            AnyKey::Float(_) => "float",
            AnyKey::Str(_) => "string",
        }
    }
}

impl fmt::Display for AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyKey::Int(v) => write!(f, "{v}"),
            AnyKey::Float(v) => write!(f, "{v:?}"),
            AnyKey::Str(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i32> for AnyKey {
    fn from(v: i32) -> Self {
        AnyKey::Int(v.into())
    }
}

impl From<i64> for AnyKey {
    fn from(v: i64) -> Self {
        AnyKey::Int(v)
    }
}

impl From<f64> for AnyKey {
    fn from(v: f64) -> Self {
        AnyKey::Float(v)
    }
}

impl From<String> for AnyKey {
    fn from(v: String) -> Self {
        AnyKey::Str(v)
    }
}

impl From<&str> for AnyKey {
    fn from(v: &str) -> Self {
        AnyKey::Str(v.to_string())
    }
}

/// Types usable as map keys.
pub trait MapKey: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {
    const KIND: KeyKind;

    /// Convert a dynamic key; `None` if it is of the wrong kind or out of
    /// range.
    fn from_any_key(key: &AnyKey) -> Option<Self>;

    fn to_any_key(&self) -> AnyKey;

    /// Manufacture the key for a small integer index.
    fn from_index(index: i64) -> Self;
}

impl MapKey for i32 {
    const KIND: KeyKind = KeyKind::Int;

    fn from_any_key(key: &AnyKey) -> Option<Self> {
        match key {
            AnyKey::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    fn to_any_key(&self) -> AnyKey {
        AnyKey::Int((*self).into())
    }

    /// Indices outside the `i32` range wrap.
    fn from_index(index: i64) -> Self {
        index as i32
    }
}

impl MapKey for i64 {
    const KIND: KeyKind = KeyKind::Long;

    fn from_any_key(key: &AnyKey) -> Option<Self> {
        match key {
            AnyKey::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn to_any_key(&self) -> AnyKey {
        AnyKey::Int(*self)
    }

    fn from_index(index: i64) -> Self {
        index
    }
}

impl MapKey for String {
    const KIND: KeyKind = KeyKind::Str;

    fn from_any_key(key: &AnyKey) -> Option<Self> {
        match key {
            AnyKey::Str(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn to_any_key(&self) -> AnyKey {
        AnyKey::Str(self.clone())
    }

    fn from_index(index: i64) -> Self {
        index.to_string()
    }
}

/// A typed key: an id plus the type of value it refers to.
///
/// Two keys are equal when their ids are; the value type only selects which
/// accessor applies.
pub struct Key<K, T: ?Sized> {
    id: K,
    _value: PhantomData<fn() -> Box<T>>,
}

impl<K, T: ?Sized> Key<K, T> {
    pub const fn new(id: K) -> Self {
        Self {
            id,
            _value: PhantomData,
        }
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    /// Short name of the value type, without its module path.
    pub fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<T>())
    }
}

/// Build a key for values of type `T`.
pub fn make_key<T: ?Sized, K>(id: K) -> Key<K, T> {
    Key::new(id)
}

fn short_type_name(full: &'static str) -> &'static str {
    // Keep generic arguments intact: only strip the path before the first '<'.
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(pos) if !full.starts_with("dyn ") => &full[pos + 2..],
        _ => full,
    }
}

impl<K: Clone, T: ?Sized> Clone for Key<K, T> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<K: PartialEq, T: ?Sized> PartialEq for Key<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: Eq, T: ?Sized> Eq for Key<K, T> {}

impl<K: PartialOrd, T: ?Sized> PartialOrd for Key<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.id.partial_cmp(&other.id)
    }
}

impl<K: Ord, T: ?Sized> Ord for Key<K, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<K: Hash, T: ?Sized> Hash for Key<K, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<K: fmt::Display, T: ?Sized> fmt::Display for Key<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.id, self.type_name())
    }
}

impl<K: fmt::Debug, T: ?Sized> fmt::Debug for Key<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("id", &self.id)
            .field("type", &self.type_name())
            .finish()
    }
}
