use crate::ConnectionId;

/// A link to one remote host, supplied by the transport layer
pub trait Connection {
    fn id(&self) -> ConnectionId;

    /// Hand a finished packet to the transport
    fn send(&mut self, payload: Vec<u8>);
}
