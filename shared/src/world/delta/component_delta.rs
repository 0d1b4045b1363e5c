use log::warn;

use netbind_serde::{Serde, SerdeErr};

use crate::{
    world::{
        component::property::Property,
        record::{diff_mask::DiffMask, replication_record::ReplicationRecord},
    },
    NetComponentId, PropertyIndex,
};

use super::{
    property_helper::serialize_network_property,
    serializer::{Serializer, SerializerMode},
    stats::ReplicationStats,
};

/// Drives one component's properties through a delta pass.
///
/// Properties must be visited in ascending index order. After the first
/// failure the remaining properties are skipped, and [`ComponentDelta::finish`]
/// reports the pass as failed.
///
/// ```ignore
/// fn serialize_state_delta(&mut self, record: &mut ReplicationRecord,
///     serializer: &mut dyn Serializer, stats: &mut ReplicationStats) -> bool {
///     let Some(mut delta) = ComponentDelta::new(self.net_component_id(), record, serializer, stats) else {
///         return true;
///     };
///     delta.property("x", &mut self.x).property("y", &mut self.y);
///     delta.finish()
/// }
/// ```
pub struct ComponentDelta<'a> {
    component: NetComponentId,
    bits: &'a mut DiffMask,
    serializer: &'a mut dyn Serializer,
    stats: &'a mut ReplicationStats,
    prune_on_no_change: bool,
    error: Option<SerdeErr>,
}

impl<'a> ComponentDelta<'a> {
    /// Returns `None` if the record has no bitset for `component`
    pub fn new(
        component: NetComponentId,
        record: &'a mut ReplicationRecord,
        serializer: &'a mut dyn Serializer,
        stats: &'a mut ReplicationStats,
    ) -> Option<Self> {
        let prune_on_no_change = serializer.mode() == SerializerMode::Read;
        let bits = record.bits_mut(component)?;
        Some(Self {
            component,
            bits,
            serializer,
            stats,
            prune_on_no_change,
            error: None,
        })
    }

    pub fn property<T: Serde>(&mut self, name: &'static str, property: &mut Property<T>) -> &mut Self {
        let index = property.index();
        self.value(index, name, property.untracked_mut())
    }

    /// Same as [`ComponentDelta::property`], for values that are not wrapped
    /// in a [`Property`]
    pub fn value<T: Serde>(
        &mut self,
        index: PropertyIndex,
        name: &'static str,
        value: &mut T,
    ) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(error) = serialize_network_property(
            &mut *self.serializer,
            self.prune_on_no_change,
            self.bits,
            index,
            value,
            name,
            self.component,
            self.stats,
        ) {
            self.error = Some(error);
        }
        self
    }

    pub fn error(&self) -> Option<&SerdeErr> {
        self.error.as_ref()
    }

    /// Whether every visited property serialized
    pub fn finish(self) -> bool {
        match self.error {
            None => true,
            Some(error) => {
                warn!("Delta pass for {:?} failed: {}", self.component, error);
                false
            }
        }
    }
}
