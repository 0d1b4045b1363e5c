use crate::{world::binding::net_bind_context::NetBindContext, EntityIsMigrating};

/// Behaviour that only runs on hosts holding Authority or Autonomous over a
/// component's entity.
///
/// Created by [`NetworkComponent::create_controller`](crate::NetworkComponent::create_controller)
/// and owned by the component's [`ControllerSlot`](super::controller_slot::ControllerSlot).
pub trait NetworkController: Send + Sync {
    /// Called on the transition from Constructed to Active. Returning an
    /// error leaves the controller Constructed.
    fn on_activate(
        &mut self,
        context: &NetBindContext,
        migrating: EntityIsMigrating,
    ) -> Result<(), String> {
        let _ = (context, migrating);
        Ok(())
    }

    /// Called on the transition from Active back to Constructed
    fn on_deactivate(&mut self, context: &NetBindContext, migrating: EntityIsMigrating) {
        let _ = (context, migrating);
    }
}
