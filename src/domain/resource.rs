//! Opaque loaded resources
//!
//! Asset decoding is outside this crate: backing stores hand back whatever
//! engine object they produced and callers downcast it to the type they
//! expect. Loading runs on a single cooperative thread, so the handle is
//! `Rc`-based and cloning it never duplicates the underlying object.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A shared, type-erased handle to a loaded asset or bundle
#[derive(Clone)]
pub struct Resource(Rc<dyn Any>);

impl Resource {
    /// Wrap an engine object
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrow the object as `T`, if it is one
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Check whether two handles point to the same object
    pub fn ptr_eq(&self, other: &Resource) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of live handles to the object
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("handles", &self.handle_count())
            .finish_non_exhaustive()
    }
}
