/// PROPERTY-BASED TESTS: Dirty marking and delta replication
///
/// Key invariants:
/// 1. A property marked any number of times is sent exactly once
/// 2. Untouched properties are never sent
/// 3. The replica only reports properties whose value actually changed
use std::collections::BTreeSet;

use proptest::prelude::*;

use netbind_shared::{
    NetComponentId, NetEntityId, NetEntityRole, PropertyIndex, RecordMutator, ReplicationRecord,
};
use netbind_test::{exchange_updates, host_pair, Position, TestHost};

const ENTITY: NetEntityId = NetEntityId::new(12);

fn bound_pair() -> (TestHost, TestHost) {
    let (mut server, mut client) = host_pair();
    server.spawn(ENTITY, NetEntityRole::Authority);
    client.spawn(ENTITY, NetEntityRole::Client);
    server.manager.add_component(ENTITY, Position::default()).unwrap();
    client.manager.add_component(ENTITY, Position::default()).unwrap();
    (server, client)
}

// (property index, new value)
fn mutation_strategy() -> impl Strategy<Value = (PropertyIndex, i32)> {
    (0u8..3u8, -3i32..3i32)
}

proptest! {
    #[test]
    fn prop_each_marked_property_sent_once(
        mutations in prop::collection::vec(mutation_strategy(), 0..20)
    ) {
        let (mut server, mut client) = bound_pair();
        let position = server.manager.registry().net_id_of::<Position>().unwrap();

        {
            let source = server.manager.component_mut::<Position>(ENTITY).unwrap();
            for (index, value) in &mutations {
                match index {
                    0 => *source.x = *value,
                    1 => *source.y = *value,
                    _ => *source.z = *value,
                }
            }
        }
        exchange_updates(&mut server, &mut client);

        let touched: BTreeSet<PropertyIndex> = mutations.iter().map(|(index, _)| *index).collect();
        for index in 0..3 {
            let expected = u64::from(touched.contains(&index));
            prop_assert_eq!(server.manager.stats().property(position, index).updates_sent, expected);
        }

        let source = server.manager.component::<Position>(ENTITY).unwrap();
        let replica = client.manager.component::<Position>(ENTITY).unwrap();
        prop_assert_eq!(
            (*replica.x, *replica.y, *replica.z),
            (*source.x, *source.y, *source.z)
        );

        // a property set back to its starting value changes nothing
        let changed: Vec<PropertyIndex> = [*source.x, *source.y, *source.z]
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0)
            .map(|(index, _)| index as PropertyIndex)
            .collect();
        if changed.is_empty() {
            prop_assert!(replica.notifications.is_empty());
        } else {
            prop_assert_eq!(replica.notifications.clone(), vec![changed]);
        }
    }

    #[test]
    fn prop_subtracting_a_snapshot_clears_only_its_bits(
        before in prop::collection::btree_set(0u8..8u8, 0..8),
        after in prop::collection::btree_set(0u8..8u8, 0..8),
    ) {
        let component = NetComponentId::new(0);
        let mut record = ReplicationRecord::new();
        record.add_component(component, 8).unwrap();
        let mutator = RecordMutator::new(record);

        for index in &before {
            mutator.mark(component, *index);
        }
        let snapshot = mutator.snapshot();
        for index in &after {
            mutator.mark(component, *index);
        }
        mutator.subtract(&snapshot);

        let remaining = mutator.snapshot();
        let bits = remaining.bits(component).unwrap();
        for index in 0..8u8 {
            let expected = after.contains(&index) && !before.contains(&index);
            prop_assert_eq!(bits.bit(index), expected);
        }
    }
}
