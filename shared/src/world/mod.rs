pub mod binding;
pub mod component;
pub mod controller;
pub mod delta;
pub mod record;
pub mod rpc;
