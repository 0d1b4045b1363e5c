use thiserror::Error;

use crate::{NetComponentId, PropertyIndex};

/// Errors that can occur while reading or mutating a ReplicationRecord
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The component type has no bitset in this record
    #[error("Component {component:?} is not tracked by this ReplicationRecord")]
    ComponentNotRecorded { component: NetComponentId },

    /// The component type already has a bitset in this record
    #[error("Component {component:?} is already tracked by this ReplicationRecord")]
    ComponentAlreadyRecorded { component: NetComponentId },

    /// The property index is not declared for the component type
    #[error("Property index {index} is out of range for component {component:?}, which declares {property_count} properties")]
    PropertyOutOfRange {
        component: NetComponentId,
        index: PropertyIndex,
        property_count: u8,
    },

    /// The record's lock was poisoned by a panicking writer
    #[error("Lock on ReplicationRecord is poisoned")]
    LockPoisoned,
}
