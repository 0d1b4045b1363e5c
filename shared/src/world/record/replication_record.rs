use crate::{NetComponentId, PropertyIndex};

use super::{diff_mask::DiffMask, error::RecordError};

/// Per-entity dirty state: one [`DiffMask`] per network component type on
/// the entity, in the order the components were bound.
///
/// A raised bit stays raised until it is serialized outbound, or until an
/// inbound apply proves it was a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplicationRecord {
    masks: Vec<(NetComponentId, DiffMask)>,
}

impl ReplicationRecord {
    pub fn new() -> Self {
        Self { masks: Vec::new() }
    }

    /// Allocate a bitset for a component type
    pub fn add_component(
        &mut self,
        component: NetComponentId,
        property_count: u8,
    ) -> Result<(), RecordError> {
        if self.contains_component(component) {
            return Err(RecordError::ComponentAlreadyRecorded { component });
        }
        self.masks.push((component, DiffMask::new(property_count)));
        Ok(())
    }

    /// Track a component type with bits already set, as read off the wire
    pub fn add_bits(&mut self, component: NetComponentId, mask: DiffMask) -> Result<(), RecordError> {
        if self.contains_component(component) {
            return Err(RecordError::ComponentAlreadyRecorded { component });
        }
        self.masks.push((component, mask));
        Ok(())
    }

    pub fn remove_component(&mut self, component: NetComponentId) {
        self.masks.retain(|(id, _)| *id != component);
    }

    pub fn contains_component(&self, component: NetComponentId) -> bool {
        self.masks.iter().any(|(id, _)| *id == component)
    }

    /// Raise the bit for one property. Raising an already raised bit does
    /// nothing.
    pub fn mark(&mut self, component: NetComponentId, index: PropertyIndex) -> Result<(), RecordError> {
        self.set(component, index, true)
    }

    /// Lower the bit for one property
    pub fn clear(&mut self, component: NetComponentId, index: PropertyIndex) -> Result<(), RecordError> {
        self.set(component, index, false)
    }

    fn set(
        &mut self,
        component: NetComponentId,
        index: PropertyIndex,
        value: bool,
    ) -> Result<(), RecordError> {
        let mask = self
            .bits_mut(component)
            .ok_or(RecordError::ComponentNotRecorded { component })?;
        if !mask.set_bit(index, value) {
            return Err(RecordError::PropertyOutOfRange {
                component,
                index,
                property_count: mask.bit_count(),
            });
        }
        Ok(())
    }

    pub fn bits(&self, component: NetComponentId) -> Option<&DiffMask> {
        self.masks
            .iter()
            .find(|(id, _)| *id == component)
            .map(|(_, mask)| mask)
    }

    pub fn bits_mut(&mut self, component: NetComponentId) -> Option<&mut DiffMask> {
        self.masks
            .iter_mut()
            .find(|(id, _)| *id == component)
            .map(|(_, mask)| mask)
    }

    pub fn is_clear(&self) -> bool {
        self.masks.iter().all(|(_, mask)| mask.is_clear())
    }

    pub fn is_component_clear(&self, component: NetComponentId) -> bool {
        self.bits(component).map_or(true, DiffMask::is_clear)
    }

    pub fn clear_component(&mut self, component: NetComponentId) {
        if let Some(mask) = self.bits_mut(component) {
            mask.clear();
        }
    }

    pub fn clear_all(&mut self) {
        self.masks.iter_mut().for_each(|(_, mask)| mask.clear());
    }

    /// Raise every bit of every component, used to hand over full state
    pub fn mark_all(&mut self) {
        self.masks.iter_mut().for_each(|(_, mask)| mask.set_all());
    }

    /// Raise every bit raised in `other`, for components both records track
    pub fn or(&mut self, other: &ReplicationRecord) {
        for (component, mask) in self.masks.iter_mut() {
            if let Some(other_mask) = other.bits(*component) {
                mask.or(other_mask);
            }
        }
    }

    /// Lower every bit raised in `other`, for components both records track
    pub fn subtract(&mut self, other: &ReplicationRecord) {
        for (component, mask) in self.masks.iter_mut() {
            if let Some(other_mask) = other.bits(*component) {
                mask.subtract(other_mask);
            }
        }
    }

    pub fn component_ids(&self) -> impl Iterator<Item = NetComponentId> + '_ {
        self.masks.iter().map(|(id, _)| *id)
    }

    pub fn components(&self) -> impl Iterator<Item = (NetComponentId, &DiffMask)> {
        self.masks.iter().map(|(id, mask)| (*id, mask))
    }

    /// Disjoint mutable views of every component's bitset. Each view may be
    /// handed to a different thread for the duration of a tick.
    pub fn components_mut(&mut self) -> impl Iterator<Item = (NetComponentId, &mut DiffMask)> {
        self.masks.iter_mut().map(|(id, mask)| (*id, mask))
    }
}
