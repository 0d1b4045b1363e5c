use thiserror::Error;

/// Errors that can occur while queueing or draining RPCs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The outbox lock was poisoned by a panicking writer
    #[error("Lock on RpcOutbox is poisoned")]
    OutboxLockPoisoned,
}
