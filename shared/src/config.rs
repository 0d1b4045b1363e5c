use netbind_serde::MTU_SIZE_BYTES;

/// How protocol bugs and illegal lifecycle transitions are treated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strictness {
    /// Fail loudly: lifecycle conflicts return errors and inconsistent
    /// serializer state panics
    Development,
    /// Fail safe: conflicts become logged no-ops and inconsistent properties
    /// are assumed changed so they are sent again
    Production,
}

impl Strictness {
    pub fn is_development(self) -> bool {
        self == Strictness::Development
    }
}

cfg_if! {
    if #[cfg(debug_assertions)] {
        const DEFAULT_STRICTNESS: Strictness = Strictness::Development;
    } else {
        const DEFAULT_STRICTNESS: Strictness = Strictness::Production;
    }
}

impl Default for Strictness {
    fn default() -> Self {
        DEFAULT_STRICTNESS
    }
}

/// Tuning for a replication session
#[derive(Clone, Debug)]
pub struct ReplicationConfig {
    /// Handling of conflicts and inconsistencies
    pub strictness: Strictness,
    /// Budget for one outbound update packet. Entities whose payload does not
    /// fit keep their dirty bits and are retried next tick.
    pub max_packet_bytes: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            max_packet_bytes: MTU_SIZE_BYTES,
        }
    }
}
