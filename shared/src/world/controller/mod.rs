pub mod controller_slot;
pub mod error;
pub mod network_controller;
