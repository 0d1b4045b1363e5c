use crate::{world::record::record_mutator::RecordMutator, NetComponentId, PropertyIndex};

/// Marks one component's properties dirty in the entity's records.
///
/// Handed to each [`Property`](super::property::Property) of a component when
/// it is attached to a binding.
#[derive(Clone)]
pub struct PropertyMutator {
    component: NetComponentId,
    current: RecordMutator,
    predictable: RecordMutator,
}

impl PropertyMutator {
    pub fn new(
        component: NetComponentId,
        current: &RecordMutator,
        predictable: &RecordMutator,
    ) -> Self {
        Self {
            component,
            current: current.clone(),
            predictable: predictable.clone(),
        }
    }

    pub fn component(&self) -> NetComponentId {
        self.component
    }

    /// Mark a property for the next outbound pass. Predictable properties
    /// are also marked as locally predicted until an authoritative update
    /// for them arrives.
    pub fn mutate(&self, index: PropertyIndex, predictable: bool) {
        self.current.mark(self.component, index);
        if predictable {
            self.predictable.mark(self.component, index);
        }
    }
}
