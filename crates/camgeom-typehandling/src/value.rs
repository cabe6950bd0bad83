use crate::{HeteroMapError, Storable};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Values arriving through the dynamically typed interface.
pub type DynValue = Box<dyn Any + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Long,
    Float,
    Double,
    String,
    Storable,
    Shared,
}

/// Everything a heterogeneous map can hold.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Owned by the map.
    Storable(Box<dyn Storable>),
    /// Shared with the caller.
    Shared(Arc<dyn Storable>),
}

impl Value {
    pub fn storable(value: impl Storable) -> Self {
        Value::Storable(Box::new(value))
    }

    pub fn shared(value: impl Storable) -> Self {
        Value::Shared(Arc::new(value))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::Storable(_) => ValueKind::Storable,
            Value::Shared(_) => ValueKind::Shared,
        }
    }

    /// The storable behind either storable variant.
    pub fn as_storable(&self) -> Option<&dyn Storable> {
        match self {
            Value::Storable(b) => Some(&**b),
            Value::Shared(a) => Some(&**a),
            _ => None,
        }
    }

    /// Check a dynamically typed value against the supported set.
    ///
    /// Accepts the primitive types, `String` and `&'static str`, a boxed or
    /// shared `dyn Storable`, or an already-built [`Value`].
    pub fn try_from_any(value: DynValue) -> Result<Self, HeteroMapError> {
        macro_rules! accept {
            ($value:ident, $t:ty, $wrap:expr) => {
                let $value = match $value.downcast::<$t>() {
                    Ok(v) => return Ok($wrap(*v)),
                    Err(other) => other,
                };
            };
        }
        accept!(value, Value, |v| v);
        accept!(value, bool, Value::Bool);
        accept!(value, i32, Value::Int);
        accept!(value, i64, Value::Long);
        accept!(value, f32, Value::Float);
        accept!(value, f64, Value::Double);
        accept!(value, String, Value::String);
        accept!(value, &'static str, |s: &str| Value::String(s.to_string()));
        accept!(value, Box<dyn Storable>, Value::Storable);
        accept!(value, Arc<dyn Storable>, Value::Shared);
        drop(value);
        Err(HeteroMapError::ValueType {
            found: "a value of an unsupported type".to_string(),
        })
    }
}

/// Strict by kind: `Int(1)` never equals `Long(1)`. Storables compare with
/// [`Storable::equals`] on the left operand.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Storable(a), Value::Storable(b)) => a.equals(&**b),
            (Value::Shared(a), Value::Shared(b)) => Arc::ptr_eq(a, b) || a.equals(&**b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Storable(v) => write!(f, "{v}"),
            Value::Shared(v) => write!(f, "{v}"),
        }
    }
}

/// Primitive types with a typed accessor.
pub trait ValueType: Sized + 'static {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<&Self>;
    fn from_value_mut(value: &mut Value) -> Option<&mut Self>;
    fn into_value(self) -> Value;
}

macro_rules! value_type {
    ($t:ty, $variant:ident) => {
        impl ValueType for $t {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn from_value_mut(value: &mut Value) -> Option<&mut Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::$variant(v)
            }
        }
    };
}

value_type!(bool, Bool);
value_type!(i32, Int);
value_type!(i64, Long);
value_type!(f32, Float);
value_type!(f64, Double);
value_type!(String, String);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Point(i32, i32);

    impl Storable for Point {
        fn equals(&self, other: &dyn Storable) -> bool {
            other.downcast_ref::<Point>() == Some(self)
        }
    }

    struct Opaque;

    #[test]
    fn dynamic_values_are_type_checked() {
        assert_eq!(Value::try_from_any(Box::new(true)), Ok(Value::Bool(true)));
        assert_eq!(Value::try_from_any(Box::new(7i64)), Ok(Value::Long(7)));
        assert_eq!(
            Value::try_from_any(Box::new("text")),
            Ok(Value::String("text".into()))
        );
        let boxed: Box<dyn Storable> = Box::new(Point(1, 2));
        assert_eq!(
            Value::try_from_any(Box::new(boxed)),
            Ok(Value::storable(Point(1, 2)))
        );
        assert!(matches!(
            Value::try_from_any(Box::new(Opaque)),
            Err(HeteroMapError::ValueType { .. })
        ));
        assert!(Value::try_from_any(Box::new(1u8)).is_err());
    }

    #[test]
    fn rejected_value_has_readable_message() {
        let err = Value::try_from_any(Box::new(Opaque)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "a value of an unsupported type cannot be stored in a HeteroMap"
        );
        assert!(!err.to_string().contains("TypeId"));
    }

    #[test]
    fn equality_is_strict_by_kind() {
        assert_ne!(Value::Int(42), Value::Long(42));
        assert_ne!(Value::Int(42), Value::Double(42.0));
        assert_ne!(Value::storable(Point(0, 0)), Value::shared(Point(0, 0)));
        assert_eq!(Value::shared(Point(0, 0)), Value::shared(Point(0, 0)));
    }

    #[test]
    fn typed_access() {
        let mut v = Value::from(41);
        *i32::from_value_mut(&mut v).expect("int") += 1;
        assert_eq!(i32::from_value(&v), Some(&42));
        assert_eq!(f64::from_value(&v), None);
        assert_eq!(v.to_string(), "42");
        assert_eq!(Value::from(42.0).to_string(), "42.0");
    }
}
