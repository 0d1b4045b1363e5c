use std::any::Any;

use crate::{
    connection::Connection,
    world::{
        binding::{error::RoleError, net_bind_context::NetBindContext, role::NetEntityRole},
        controller::{
            error::{ControllerError, ControllerOperation, ControllerState},
            network_controller::NetworkController,
        },
        delta::{serializer::Serializer, stats::ReplicationStats},
        record::{record_mutator::RecordMutator, replication_record::ReplicationRecord},
        rpc::rpc_message::NetworkEntityRpcMessage,
    },
    ConnectionId, EntityIsMigrating, NetComponentId, Strictness,
};

use super::{
    component_core::ComponentCore,
    component_registry::{ComponentKind, PropertyDecl},
};

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A component type whose declared properties replicate across hosts.
///
/// Implementors declare their properties once, in index order, wire them in
/// [`NetworkComponent::network_attach`], and visit them in the same order in
/// [`NetworkComponent::serialize_state_delta`]. The controller lifecycle is
/// provided on top of [`ComponentCore`].
pub trait NetworkComponent: AsAny + Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Replicated properties, indexed by position
    fn properties(&self) -> &'static [PropertyDecl];

    fn core(&self) -> &ComponentCore;

    fn core_mut(&mut self) -> &mut ComponentCore;

    /// One-time wiring to a binding, before any traffic
    fn network_attach(
        &mut self,
        context: NetBindContext,
        current: &RecordMutator,
        predictable: &RecordMutator,
    );

    /// Run every declared property through the delta helper, in ascending
    /// index order. Returns false only if the serializer failed.
    fn serialize_state_delta(
        &mut self,
        record: &mut ReplicationRecord,
        serializer: &mut dyn Serializer,
        stats: &mut ReplicationStats,
    ) -> bool;

    /// Called once after an inbound delta applied, with only the bits that
    /// carried real changes
    fn notify_state_delta_changes(&mut self, record: &ReplicationRecord) {
        let _ = record;
    }

    /// Whether the component recognized and consumed the RPC
    fn handle_rpc(
        &mut self,
        connection: &dyn Connection,
        role: NetEntityRole,
        message: &NetworkEntityRpcMessage,
    ) -> bool {
        let _ = (connection, role, message);
        false
    }

    /// A fresh controller, for component types that have one
    fn create_controller(&self) -> Option<Box<dyn NetworkController>> {
        None
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::from(self.as_any().type_id())
    }

    fn net_component_id(&self) -> Option<NetComponentId> {
        self.core().net_component_id()
    }

    fn set_owning_connection_id(&mut self, connection: Option<ConnectionId>) {
        self.core_mut().set_owning_connection(connection);
    }

    fn owning_connection_id(&self) -> Option<ConnectionId> {
        self.core().owning_connection()
    }

    fn controller_state(&self) -> ControllerState {
        self.core().controller_slot().state()
    }

    fn has_controller(&self) -> bool {
        self.core().controller_slot().has_controller()
    }

    fn controller(&self) -> Option<&dyn NetworkController> {
        self.core().controller_slot().controller()
    }

    /// NoController -> Constructed. A no-op for component types without a
    /// controller.
    fn construct_controller(&mut self, strictness: Strictness) -> Result<(), ControllerError> {
        let name = self.name();
        if self.has_controller() {
            return self
                .core()
                .controller_slot()
                .conflict(name, ControllerOperation::Construct, strictness);
        }
        let Some(controller) = self.create_controller() else {
            return Ok(());
        };
        self.core_mut()
            .controller_slot_mut()
            .construct(name, controller, strictness)
    }

    /// Constructed -> Active
    fn activate_controller(
        &mut self,
        migrating: EntityIsMigrating,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        let name = self.name();
        let (context, slot) = self.core_mut().context_and_slot();
        let Some(context) = context else {
            return Err(ControllerError::NotAttached {
                component: name,
                operation: ControllerOperation::Activate,
            });
        };
        slot.activate(name, context, migrating, strictness)
    }

    /// Active -> Constructed
    fn deactivate_controller(
        &mut self,
        migrating: EntityIsMigrating,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        let name = self.name();
        let (context, slot) = self.core_mut().context_and_slot();
        let Some(context) = context else {
            return Err(ControllerError::NotAttached {
                component: name,
                operation: ControllerOperation::Deactivate,
            });
        };
        slot.deactivate(name, context, migrating, strictness)
    }

    /// Constructed -> NoController
    fn destruct_controller(&mut self, strictness: Strictness) -> Result<(), ControllerError> {
        let name = self.name();
        self.core_mut().controller_slot_mut().destruct(name, strictness)
    }

    /// Back to NoController from wherever the controller is
    fn abort_controller(&mut self, migrating: EntityIsMigrating) {
        let (context, slot) = self.core_mut().context_and_slot();
        slot.abort(context, migrating);
    }

    fn try_is_authority(&self) -> Result<bool, RoleError> {
        self.core().roles()?.try_is_authority()
    }

    fn try_is_autonomous(&self) -> Result<bool, RoleError> {
        self.core().roles()?.try_is_autonomous()
    }

    fn try_is_server(&self) -> Result<bool, RoleError> {
        self.core().roles()?.try_is_server()
    }

    fn try_is_client(&self) -> Result<bool, RoleError> {
        self.core().roles()?.try_is_client()
    }
}

impl dyn NetworkComponent {
    pub fn downcast_ref<C: NetworkComponent>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    pub fn downcast_mut<C: NetworkComponent>(&mut self) -> Option<&mut C> {
        self.as_any_mut().downcast_mut::<C>()
    }
}
