use std::sync::{Arc, PoisonError, RwLock};

use netbind_serde::Serde;

use crate::{
    world::{
        component::{component_registry::ComponentKind, network_component::NetworkComponent},
        record::record_mutator::RecordMutator,
        rpc::{rpc_message::NetworkEntityRpcMessage, rpc_outbox::RpcOutbox},
    },
    NetComponentId, NetEntityId,
};

use super::role::{NetEntityRole, RoleAccessor};

/// The component types bound on one entity. Shared between a binding and the
/// contexts of its components.
#[derive(Clone, Default)]
pub struct SiblingDirectory {
    entries: Arc<RwLock<Vec<(ComponentKind, NetComponentId)>>>,
}

impl SiblingDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, kind: ComponentKind, net_id: NetComponentId) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push((kind, net_id));
    }

    pub(crate) fn remove(&self, net_id: NetComponentId) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|(_, id)| *id != net_id);
    }

    pub fn find(&self, kind: &ComponentKind) -> Option<NetComponentId> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .find(|(entry, _)| entry == kind)
            .map(|(_, net_id)| *net_id)
    }

    pub fn net_ids(&self) -> Vec<NetComponentId> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().map(|(_, net_id)| *net_id).collect()
    }
}

/// What a component may reach of its binding: the entity and component
/// type it is bound as, a read-only view of the binding's role, the
/// binding's RPC outbox, its dirty record and the directory of its sibling
/// components.
#[derive(Clone)]
pub struct NetBindContext {
    entity: NetEntityId,
    component: NetComponentId,
    roles: RoleAccessor,
    rpc_outbox: RpcOutbox,
    current: RecordMutator,
    siblings: SiblingDirectory,
}

impl NetBindContext {
    pub fn new(
        entity: NetEntityId,
        component: NetComponentId,
        roles: RoleAccessor,
        rpc_outbox: RpcOutbox,
        current: RecordMutator,
        siblings: SiblingDirectory,
    ) -> Self {
        Self {
            entity,
            component,
            roles,
            rpc_outbox,
            current,
            siblings,
        }
    }

    pub fn entity(&self) -> NetEntityId {
        self.entity
    }

    pub fn component(&self) -> NetComponentId {
        self.component
    }

    pub fn roles(&self) -> &RoleAccessor {
        &self.roles
    }

    /// Queue an RPC for the next outbound pass, addressed to this same
    /// component on hosts holding `target`
    pub fn send_rpc<A: Serde>(&self, target: NetEntityRole, args: &A) {
        self.rpc_outbox.push(NetworkEntityRpcMessage::with_args(
            self.entity,
            self.component,
            target,
            args,
        ));
    }

    /// Mark every property of this component, so the next outbound pass
    /// carries its full state
    pub fn mark_dirty(&self) {
        self.current.mark_component(self.component);
    }

    /// The id a sibling component of type `C` is bound under on the same
    /// entity, if there is one. The host reaches the sibling itself through
    /// the binding.
    pub fn sibling<C: NetworkComponent>(&self) -> Option<NetComponentId> {
        self.siblings.find(&ComponentKind::of::<C>())
    }

    /// Every component type bound on this entity, this one included
    pub fn siblings(&self) -> Vec<NetComponentId> {
        self.siblings.net_ids()
    }
}
