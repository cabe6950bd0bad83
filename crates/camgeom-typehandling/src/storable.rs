//! User-extensible opaque values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Runtime type access for trait objects.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Object-safe cloning for [`Storable`].
pub trait StorableClone {
    fn clone_box(&self) -> Box<dyn Storable>;
}

impl<T: Storable + Clone> StorableClone for T {
    fn clone_box(&self) -> Box<dyn Storable> {
        Box::new(self.clone())
    }
}

/// A value type defined outside this crate that a map can hold.
///
/// Everything is optional. `equals` defaults to `false`, so a storable that
/// does not override it is never equal to anything, itself included.
/// Implementations may be asymmetric.
pub trait Storable: StorableClone + AsAny + fmt::Debug + Send + Sync + 'static {
    /// Human-readable form; `None` falls back to `Debug`.
    fn describe(&self) -> Option<String> {
        None
    }

    fn hash_value(&self) -> Option<u64> {
        None
    }

    fn equals(&self, _other: &dyn Storable) -> bool {
        false
    }
}

impl dyn Storable {
    pub fn is<T: Storable>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Storable>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Storable>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// Downcast a shared storable, keeping the allocation.
pub fn downcast_arc<T: Storable>(value: Arc<dyn Storable>) -> Option<Arc<T>> {
    value.into_any_arc().downcast::<T>().ok()
}

impl Clone for Box<dyn Storable> {
    fn clone(&self) -> Self {
        (**self).clone_box()
    }
}

impl PartialEq for dyn Storable {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for dyn Storable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{self:?}"),
        }
    }
}
