use log::{debug, warn};

use crate::{world::binding::net_bind_context::NetBindContext, EntityIsMigrating, Strictness};

use super::{
    error::{ControllerError, ControllerOperation, ControllerState},
    network_controller::NetworkController,
};

/// Holds a component's controller and enforces its lifecycle:
/// `NoController -> Constructed -> Active -> Constructed -> NoController`.
///
/// Illegal transitions are reported as [`ControllerError::RoleConflict`] under
/// [`Strictness::Development`] and logged and ignored under
/// [`Strictness::Production`].
#[derive(Default)]
pub struct ControllerSlot {
    state: ControllerState,
    controller: Option<Box<dyn NetworkController>>,
}

impl ControllerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// False in NoController, never an error
    pub fn has_controller(&self) -> bool {
        self.state != ControllerState::NoController
    }

    /// None in NoController, never an error
    pub fn controller(&self) -> Option<&dyn NetworkController> {
        self.controller.as_deref()
    }

    pub fn controller_mut(&mut self) -> Option<&mut (dyn NetworkController + 'static)> {
        self.controller.as_deref_mut()
    }

    pub fn construct(
        &mut self,
        component: &'static str,
        controller: Box<dyn NetworkController>,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        if self.state != ControllerState::NoController {
            return self.conflict(component, ControllerOperation::Construct, strictness);
        }
        self.controller = Some(controller);
        self.state = ControllerState::Constructed;
        debug!("Constructed controller of {}", component);
        Ok(())
    }

    pub fn activate(
        &mut self,
        component: &'static str,
        context: &NetBindContext,
        migrating: EntityIsMigrating,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        if self.state != ControllerState::Constructed {
            return self.conflict(component, ControllerOperation::Activate, strictness);
        }
        let Some(controller) = self.controller.as_mut() else {
            return self.conflict(component, ControllerOperation::Activate, strictness);
        };
        controller
            .on_activate(context, migrating)
            .map_err(|reason| ControllerError::ActivationFailed { component, reason })?;
        self.state = ControllerState::Active;
        debug!("Activated controller of {} (migrating: {:?})", component, migrating);
        Ok(())
    }

    pub fn deactivate(
        &mut self,
        component: &'static str,
        context: &NetBindContext,
        migrating: EntityIsMigrating,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        if self.state != ControllerState::Active {
            return self.conflict(component, ControllerOperation::Deactivate, strictness);
        }
        if let Some(controller) = self.controller.as_mut() {
            controller.on_deactivate(context, migrating);
        }
        self.state = ControllerState::Constructed;
        debug!("Deactivated controller of {} (migrating: {:?})", component, migrating);
        Ok(())
    }

    pub fn destruct(
        &mut self,
        component: &'static str,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        if self.state != ControllerState::Constructed {
            return self.conflict(component, ControllerOperation::Destruct, strictness);
        }
        self.controller = None;
        self.state = ControllerState::NoController;
        debug!("Destructed controller of {}", component);
        Ok(())
    }

    /// Return to NoController from any state, deactivating first if needed.
    /// Never fails.
    pub fn abort(&mut self, context: Option<&NetBindContext>, migrating: EntityIsMigrating) {
        if self.state == ControllerState::Active {
            if let (Some(controller), Some(context)) = (self.controller.as_mut(), context) {
                controller.on_deactivate(context, migrating);
            }
        }
        self.controller = None;
        self.state = ControllerState::NoController;
    }

    pub(crate) fn conflict(
        &self,
        component: &'static str,
        operation: ControllerOperation,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        let error = ControllerError::RoleConflict {
            component,
            operation,
            state: self.state,
        };
        if strictness.is_development() {
            return Err(error);
        }
        warn!("Ignoring illegal controller transition: {}", error);
        Ok(())
    }
}
