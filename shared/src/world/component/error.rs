use thiserror::Error;

/// Errors that can occur while registering or instantiating components
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// Component type not registered in the protocol
    #[error("Component not registered with Protocol. Must call `add_component()` during protocol initialization. Component: {component_name}")]
    ComponentNotRegistered { component_name: &'static str },

    /// Net ID lookup failed (component not found in registry)
    #[error("Component net ID {net_id} not found in registry. Must properly initialize Component with Protocol via `add_component()` function")]
    NetIdNotFound { net_id: u16 },

    /// The same component type was registered twice
    #[error("Component {component_name} is already registered")]
    DuplicateComponent { component_name: &'static str },

    /// A component type declares more properties than a bitset can index
    #[error("Component {component_name} declares {property_count} properties, more than the supported {max}")]
    TooManyProperties {
        component_name: &'static str,
        property_count: usize,
        max: usize,
    },

    /// Every component id has been handed out
    #[error("No component ids left to assign")]
    RegistryFull,
}
