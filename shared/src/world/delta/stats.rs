use std::collections::HashMap;

use crate::{NetComponentId, PropertyIndex};

/// Byte counters for one (component type, property) key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub updates_sent: u64,
    pub updates_received: u64,
}

/// Byte counters for RPCs addressed to one component type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RpcStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub rpcs_sent: u64,
    pub rpcs_received: u64,
    /// Queued RPCs too large for any packet, dropped before sending
    pub rpcs_dropped: u64,
}

/// Session-wide replication bandwidth accounting. Counters only grow; they
/// are reset at a session boundary with [`ReplicationStats::reset`].
#[derive(Clone, Debug, Default)]
pub struct ReplicationStats {
    properties: HashMap<(NetComponentId, PropertyIndex), PropertyStats>,
    rpcs: HashMap<NetComponentId, RpcStats>,
    inconsistencies: u64,
}

impl ReplicationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_property_sent(
        &mut self,
        component: NetComponentId,
        index: PropertyIndex,
        bytes: u32,
    ) {
        let stats = self.properties.entry((component, index)).or_default();
        stats.bytes_sent += u64::from(bytes);
        stats.updates_sent += 1;
    }

    pub fn record_property_received(
        &mut self,
        component: NetComponentId,
        index: PropertyIndex,
        bytes: u32,
    ) {
        let stats = self.properties.entry((component, index)).or_default();
        stats.bytes_received += u64::from(bytes);
        stats.updates_received += 1;
    }

    pub fn record_rpc_sent(&mut self, component: NetComponentId, bytes: u32) {
        let stats = self.rpcs.entry(component).or_default();
        stats.bytes_sent += u64::from(bytes);
        stats.rpcs_sent += 1;
    }

    pub fn record_rpc_received(&mut self, component: NetComponentId, bytes: u32) {
        let stats = self.rpcs.entry(component).or_default();
        stats.bytes_received += u64::from(bytes);
        stats.rpcs_received += 1;
    }

    pub fn record_rpc_dropped(&mut self, component: NetComponentId) {
        self.rpcs.entry(component).or_default().rpcs_dropped += 1;
    }

    pub fn record_inconsistency(&mut self) {
        self.inconsistencies += 1;
    }

    /// Counters for one property, zeroed if it never moved a byte
    pub fn property(&self, component: NetComponentId, index: PropertyIndex) -> PropertyStats {
        self.properties
            .get(&(component, index))
            .copied()
            .unwrap_or_default()
    }

    pub fn rpc(&self, component: NetComponentId) -> RpcStats {
        self.rpcs.get(&component).copied().unwrap_or_default()
    }

    /// Sum over every property of one component type
    pub fn component(&self, component: NetComponentId) -> PropertyStats {
        self.properties
            .iter()
            .filter(|((id, _), _)| *id == component)
            .fold(PropertyStats::default(), |mut total, (_, stats)| {
                total.bytes_sent += stats.bytes_sent;
                total.bytes_received += stats.bytes_received;
                total.updates_sent += stats.updates_sent;
                total.updates_received += stats.updates_received;
                total
            })
    }

    pub fn total_bytes_sent(&self) -> u64 {
        self.properties.values().map(|stats| stats.bytes_sent).sum()
    }

    pub fn total_bytes_received(&self) -> u64 {
        self.properties.values().map(|stats| stats.bytes_received).sum()
    }

    pub fn inconsistencies(&self) -> u64 {
        self.inconsistencies
    }

    /// Fold another set of counters into this one
    pub fn merge(&mut self, other: &ReplicationStats) {
        for (key, stats) in other.properties.iter() {
            let total = self.properties.entry(*key).or_default();
            total.bytes_sent += stats.bytes_sent;
            total.bytes_received += stats.bytes_received;
            total.updates_sent += stats.updates_sent;
            total.updates_received += stats.updates_received;
        }
        for (component, stats) in other.rpcs.iter() {
            let total = self.rpcs.entry(*component).or_default();
            total.bytes_sent += stats.bytes_sent;
            total.bytes_received += stats.bytes_received;
            total.rpcs_sent += stats.rpcs_sent;
            total.rpcs_received += stats.rpcs_received;
            total.rpcs_dropped += stats.rpcs_dropped;
        }
        self.inconsistencies += other.inconsistencies;
    }

    pub fn reset(&mut self) {
        self.properties.clear();
        self.rpcs.clear();
        self.inconsistencies = 0;
    }
}
