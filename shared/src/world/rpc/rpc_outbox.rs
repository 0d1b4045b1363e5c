use std::{
    collections::VecDeque,
    sync::{Arc, RwLock},
};

use super::{error::RpcError, rpc_message::NetworkEntityRpcMessage};

/// FIFO of RPCs queued by one binding's components. Clones share the queue.
#[derive(Clone, Default)]
pub struct RpcOutbox {
    queue: Arc<RwLock<VecDeque<NetworkEntityRpcMessage>>>,
}

impl RpcOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_push` for non-panicking error handling.
    pub fn push(&self, message: NetworkEntityRpcMessage) {
        self.try_push(message)
            .expect("Lock on RpcOutbox is poisoned")
    }

    pub fn try_push(&self, message: NetworkEntityRpcMessage) -> Result<(), RpcError> {
        self.queue
            .write()
            .map_err(|_| RpcError::OutboxLockPoisoned)?
            .push_back(message);
        Ok(())
    }

    /// Take every queued RPC, oldest first
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_drain` for non-panicking error handling.
    pub fn drain(&self) -> Vec<NetworkEntityRpcMessage> {
        self.try_drain()
            .expect("Lock on RpcOutbox is poisoned")
    }

    pub fn try_drain(&self) -> Result<Vec<NetworkEntityRpcMessage>, RpcError> {
        let mut queue = self.queue.write().map_err(|_| RpcError::OutboxLockPoisoned)?;
        Ok(queue.drain(..).collect())
    }

    /// Put RPCs back at the front, keeping their order
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_requeue_front` for non-panicking error handling.
    pub fn requeue_front(&self, messages: Vec<NetworkEntityRpcMessage>) {
        self.try_requeue_front(messages)
            .expect("Lock on RpcOutbox is poisoned")
    }

    pub fn try_requeue_front(&self, messages: Vec<NetworkEntityRpcMessage>) -> Result<(), RpcError> {
        let mut queue = self.queue.write().map_err(|_| RpcError::OutboxLockPoisoned)?;
        for message in messages.into_iter().rev() {
            queue.push_front(message);
        }
        Ok(())
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_len` for non-panicking error handling.
    pub fn len(&self) -> usize {
        self.try_len()
            .expect("Lock on RpcOutbox is poisoned")
    }

    pub fn try_len(&self) -> Result<usize, RpcError> {
        Ok(self.queue.read().map_err(|_| RpcError::OutboxLockPoisoned)?.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
