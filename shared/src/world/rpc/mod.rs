pub mod error;
pub mod rpc_message;
pub mod rpc_outbox;
