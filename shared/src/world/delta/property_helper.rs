use log::warn;

use netbind_serde::{Serde, SerdeErr};

use crate::{world::record::diff_mask::DiffMask, NetComponentId, PropertyIndex};

use super::{serializer::Serializer, stats::ReplicationStats};

/// One property's trip through a delta pass, in either direction.
///
/// Does nothing unless the property's bit is raised. Otherwise the value is
/// encoded (or decoded over `value`), and the bytes the stream grew by are
/// credited to `stats` for `(component, bit_index)`: as received when
/// `prune_on_no_change` is set, as sent otherwise. When pruning, a decode
/// that leaves the value untouched lowers the bit so no change is reported.
///
/// A serializer error is returned as is, with the bit left alone.
///
/// # Panics
///
/// Panics in [`Strictness::Development`](crate::Strictness) if the
/// serializer reports a change without consuming any input.
#[allow(clippy::too_many_arguments)]
pub fn serialize_network_property<T: Serde>(
    serializer: &mut dyn Serializer,
    prune_on_no_change: bool,
    bitset: &mut DiffMask,
    bit_index: PropertyIndex,
    value: &mut T,
    name: &'static str,
    component: NetComponentId,
    stats: &mut ReplicationStats,
) -> Result<(), SerdeErr> {
    if !bitset.bit(bit_index) {
        return Ok(());
    }

    let bits_before = serializer.bit_position();
    let size_before = serializer.size();

    serializer.clear_tracked_changes();
    serializer.serialize(value, name)?;
    let changed = serializer.tracked_changes();

    if prune_on_no_change {
        if !changed {
            bitset.set_bit(bit_index, false);
        } else if serializer.bit_position() == bits_before {
            if serializer.strictness().is_development() {
                panic!(
                    "Serializer reported a change to {} ({:?}, property {}) without consuming input",
                    name, component, bit_index
                );
            }
            warn!(
                "Inconsistent serializer state for {} ({:?}, property {}); keeping it marked",
                name, component, bit_index
            );
            stats.record_inconsistency();
        }
    }

    let update_size = serializer.size() - size_before;
    if update_size > 0 {
        if prune_on_no_change {
            stats.record_property_received(component, bit_index, update_size);
        } else {
            stats.record_property_sent(component, bit_index, update_size);
        }
    }

    Ok(())
}
