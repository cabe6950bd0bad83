//! Heterogeneous maps: one container, values of many types.
//!
//! Values are drawn from a closed set of primitives ([`Value`]) plus
//! user-defined [`Storable`] types, owned or shared. Typed access goes
//! through [`Key`], which pairs an id with the expected value type; a lookup
//! whose type does not match the stored value fails like a missing key.
//!
//! [`DynamicMap`] layers a dynamically typed mapping protocol on top of any
//! [`MutableHeteroMap`], and [`conformance`] holds the checks every
//! implementation is expected to pass.

pub mod conformance;
mod dynamic;
mod error;
mod key;
mod map;
mod storable;
mod value;

pub use dynamic::DynamicMap;
pub use error::HeteroMapError;
pub use key::{make_key, AnyKey, Key, KeyKind, MapKey};
pub use map::{HeteroMap, MutableHeteroMap, SimpleHeteroMap};
pub use storable::{downcast_arc, AsAny, Storable, StorableClone};
pub use value::{DynValue, Value, ValueKind, ValueType};
