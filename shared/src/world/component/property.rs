use std::ops::{Deref, DerefMut};

use netbind_serde::Serde;

use crate::{world::component::property_mutate::PropertyMutator, PropertyIndex};

/// A replicated field of a network component.
///
/// Holds its own index within the component. Once attached, every mutable
/// access marks that index dirty; detached properties (scratch instances, or
/// components not yet bound) just carry their value.
pub struct Property<T: Serde> {
    inner: T,
    index: PropertyIndex,
    predictable: bool,
    mutator: Option<PropertyMutator>,
}

impl<T: Serde> Property<T> {
    pub fn new(value: T, index: PropertyIndex) -> Self {
        Self {
            inner: value,
            index,
            predictable: false,
            mutator: None,
        }
    }

    /// A property the owning client may predict ahead of the authority
    pub fn new_predictable(value: T, index: PropertyIndex) -> Self {
        Self {
            predictable: true,
            ..Self::new(value, index)
        }
    }

    pub fn index(&self) -> PropertyIndex {
        self.index
    }

    pub fn is_predictable(&self) -> bool {
        self.predictable
    }

    pub fn is_attached(&self) -> bool {
        self.mutator.is_some()
    }

    pub fn set_mutator(&mut self, mutator: &PropertyMutator) {
        self.mutator = Some(mutator.clone());
    }

    pub fn detach(&mut self) {
        self.mutator = None;
    }

    /// Replace the value, marking it dirty even if it is equal to the
    /// current one
    pub fn set(&mut self, value: T) {
        self.mutate();
        self.inner = value;
    }

    /// Mutable access that does not mark the property. Used by the delta
    /// pass, which applies inbound values without echoing them back out.
    pub(crate) fn untracked_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    fn mutate(&self) {
        if let Some(mutator) = &self.mutator {
            mutator.mutate(self.index, self.predictable);
        }
    }
}

// A copy is detached, so mutating it never marks the original's entity
impl<T: Serde> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            index: self.index,
            predictable: self.predictable,
            mutator: None,
        }
    }
}

impl<T: Serde> Deref for Property<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: Serde> DerefMut for Property<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // Just assume inner value will be changed, queue for update
        self.mutate();
        &mut self.inner
    }
}
