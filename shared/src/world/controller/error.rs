use std::fmt;

use thiserror::Error;

/// Lifecycle state of a component's controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ControllerState {
    #[default]
    NoController,
    Constructed,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerOperation {
    Construct,
    Activate,
    Deactivate,
    Destruct,
}

impl fmt::Display for ControllerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerOperation::Construct => "construct",
            ControllerOperation::Activate => "activate",
            ControllerOperation::Deactivate => "deactivate",
            ControllerOperation::Destruct => "destruct",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while driving a controller's lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The transition is not legal from the controller's current state
    #[error("Cannot {operation} controller of {component} while it is {state:?}")]
    RoleConflict {
        component: &'static str,
        operation: ControllerOperation,
        state: ControllerState,
    },

    /// The controller refused to activate
    #[error("Controller of {component} failed to activate: {reason}")]
    ActivationFailed {
        component: &'static str,
        reason: String,
    },

    /// The component has not been attached to a binding yet
    #[error("Component {component} must be attached to a binding before its controller can {operation}")]
    NotAttached {
        component: &'static str,
        operation: ControllerOperation,
    },
}
