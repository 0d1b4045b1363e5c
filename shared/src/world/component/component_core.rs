use crate::{
    world::{
        binding::{error::RoleError, net_bind_context::NetBindContext, role::RoleAccessor},
        component::property_mutate::PropertyMutator,
        controller::controller_slot::ControllerSlot,
        record::record_mutator::RecordMutator,
    },
    ConnectionId, NetComponentId,
};

/// Binding state every network component carries: its assigned id, its
/// bind context once attached, its owning connection, and its controller.
#[derive(Default)]
pub struct ComponentCore {
    net_component_id: Option<NetComponentId>,
    context: Option<NetBindContext>,
    owning_connection: Option<ConnectionId>,
    controller: ControllerSlot,
}

impl ComponentCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_net_component_id(&mut self, net_id: NetComponentId) {
        self.net_component_id = Some(net_id);
    }

    pub fn net_component_id(&self) -> Option<NetComponentId> {
        self.net_component_id
    }

    /// Store the bind context and build the mutator the component's
    /// properties should mark through
    pub fn attach(
        &mut self,
        context: NetBindContext,
        current: &RecordMutator,
        predictable: &RecordMutator,
    ) -> PropertyMutator {
        let mutator = PropertyMutator::new(context.component(), current, predictable);
        self.net_component_id = Some(context.component());
        self.context = Some(context);
        mutator
    }

    pub fn detach(&mut self) {
        self.context = None;
    }

    pub fn context(&self) -> Option<&NetBindContext> {
        self.context.as_ref()
    }

    pub fn roles(&self) -> Result<&RoleAccessor, RoleError> {
        self.context
            .as_ref()
            .map(NetBindContext::roles)
            .ok_or(RoleError::NotAttached)
    }

    pub fn set_owning_connection(&mut self, connection: Option<ConnectionId>) {
        self.owning_connection = connection;
    }

    pub fn owning_connection(&self) -> Option<ConnectionId> {
        self.owning_connection
    }

    pub fn controller_slot(&self) -> &ControllerSlot {
        &self.controller
    }

    pub fn controller_slot_mut(&mut self) -> &mut ControllerSlot {
        &mut self.controller
    }

    /// The bind context and the controller slot, borrowed together
    pub(crate) fn context_and_slot(&mut self) -> (Option<&NetBindContext>, &mut ControllerSlot) {
        (self.context.as_ref(), &mut self.controller)
    }
}
