pub mod component_core;
pub mod component_registry;
pub mod error;
pub mod network_component;
pub mod property;
pub mod property_mutate;
