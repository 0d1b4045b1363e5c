pub mod packet_exchange;

pub use packet_exchange::{exchange_rpcs, exchange_updates, tick_and_exchange};
pub use test_host::{host_pair, host_pair_with, TestHost, CLIENT_CONNECTION, SERVER_CONNECTION};
