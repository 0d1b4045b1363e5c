use thiserror::Error;

use netbind_serde::SerdeErr;

use crate::{
    world::{component::error::ComponentError, controller::error::ControllerError},
    NetComponentId, NetEntityId,
};

/// Errors that can occur when querying a binding's role
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// The binding the role belonged to no longer exists
    #[error("Role queried after its binding was destroyed")]
    BindingDestroyed,

    /// The component has not been attached to a binding
    #[error("Component is not attached to a binding")]
    NotAttached,

    /// The role's lock was poisoned by a panicking writer
    #[error("Lock on RoleState is poisoned")]
    LockPoisoned,
}

/// Errors that can occur while replicating an entity
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicationError {
    /// Traffic addressed to an entity this host does not know
    #[error("No binding for entity {entity:?}")]
    EntityNotFound { entity: NetEntityId },

    /// Traffic addressed to a component the entity does not carry
    #[error("Entity {entity:?} has no component {component:?}")]
    ComponentNotFound {
        entity: NetEntityId,
        component: NetComponentId,
    },

    /// An entity was bound twice
    #[error("Entity {entity:?} is already bound")]
    EntityAlreadyBound { entity: NetEntityId },

    /// A component type was added to the same entity twice
    #[error("Entity {entity:?} already carries component {component:?}")]
    ComponentAlreadyBound {
        entity: NetEntityId,
        component: NetComponentId,
    },

    /// Malformed or truncated input
    #[error("Failed to serialize state of entity {entity:?}: {source}")]
    Serialization {
        entity: NetEntityId,
        #[source]
        source: SerdeErr,
    },

    /// A component's delta pass reported failure without a codec error
    #[error("Component {component:?} of entity {entity:?} failed its delta pass")]
    ComponentDeltaFailed {
        entity: NetEntityId,
        component: NetComponentId,
    },

    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Component(#[from] ComponentError),
}
