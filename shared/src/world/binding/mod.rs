pub mod error;
pub mod net_bind_context;
pub mod net_binding;
pub mod replication_manager;
pub mod role;
