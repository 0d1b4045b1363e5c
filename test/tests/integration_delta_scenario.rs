/// INTEGRATION TESTS: Dirty tracking and delta replication between two hosts
///
/// Covers the outbound pass (snapshot, encode, commit), inbound pruning of
/// values that did not actually change, notifications, and byte accounting.
use netbind_shared::{NetComponentId, NetEntityId, NetEntityRole, PropertyStats};
use netbind_test::{exchange_updates, host_pair, test_protocol::HitPoints, Health, Position, TestHost};

const ENTITY: NetEntityId = NetEntityId::new(1);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn position_id(host: &TestHost) -> NetComponentId {
    host.manager.registry().net_id_of::<Position>().unwrap()
}

fn health_id(host: &TestHost) -> NetComponentId {
    host.manager.registry().net_id_of::<Health>().unwrap()
}

/// Server holds Authority, client holds the replica; both bind Position and
/// Health
fn bound_pair() -> (TestHost, TestHost) {
    let (mut server, mut client) = host_pair();
    server.spawn(ENTITY, NetEntityRole::Authority);
    client.spawn(ENTITY, NetEntityRole::Client);
    for host in [&mut server, &mut client] {
        host.manager.add_component(ENTITY, Position::default()).unwrap();
        host.manager.add_component(ENTITY, Health::default()).unwrap();
    }
    (server, client)
}

#[test]
fn test_binding_alone_sends_nothing() {
    init_logger();
    let (mut server, mut client) = bound_pair();

    let report = exchange_updates(&mut server, &mut client);

    assert!(report.applied.is_empty());
    assert_eq!(server.connection.packets_sent(), 0);
}

#[test]
fn test_single_property_scenario() {
    init_logger();
    let (mut server, mut client) = bound_pair();
    let position = position_id(&server);

    // Tick 1: property 1 changes
    *server.manager.component_mut::<Position>(ENTITY).unwrap().y = 17;

    let snapshot = server.manager.binding(ENTITY).unwrap().current_record().snapshot();
    let bits = snapshot.bits(position).unwrap();
    assert!(!bits.bit(0));
    assert!(bits.bit(1));
    assert!(!bits.bit(2));

    let report = exchange_updates(&mut server, &mut client);
    assert_eq!(report.applied, vec![ENTITY]);

    let sent = server.manager.stats().property(position, 1);
    assert_eq!(sent.updates_sent, 1);
    assert_eq!(sent.bytes_sent, 4);

    let replica = client.manager.component::<Position>(ENTITY).unwrap();
    assert_eq!(*replica.y, 17);
    assert_eq!(replica.notifications, vec![vec![1]]);

    // Tick 2: the same value is set again
    server.manager.component_mut::<Position>(ENTITY).unwrap().y.set(17);

    let report = exchange_updates(&mut server, &mut client);
    assert_eq!(report.applied, vec![ENTITY]);

    let replica = client.manager.component::<Position>(ENTITY).unwrap();
    assert_eq!(*replica.y, 17);
    assert_eq!(replica.notifications.len(), 1, "an unchanged value must not notify");

    // Tick 3: nothing left to send
    assert!(server.manager.write_updates().is_none());
}

#[test]
fn test_marking_many_times_sends_one_field() {
    init_logger();
    let (mut server, mut client) = bound_pair();
    let position = position_id(&server);

    {
        let source = server.manager.component_mut::<Position>(ENTITY).unwrap();
        for value in 1..=5 {
            *source.x = value;
        }
    }

    exchange_updates(&mut server, &mut client);

    assert_eq!(server.manager.stats().property(position, 0).updates_sent, 1);
    assert_eq!(client.manager.stats().property(position, 0).updates_received, 1);
    let replica = client.manager.component::<Position>(ENTITY).unwrap();
    assert_eq!(*replica.x, 5);
    assert_eq!(replica.notifications, vec![vec![0]]);
}

#[test]
fn test_unmarked_properties_cost_nothing() {
    init_logger();
    let (mut server, mut client) = bound_pair();
    let position = position_id(&server);
    let health = health_id(&server);

    *server.manager.component_mut::<Position>(ENTITY).unwrap().y = -3;
    exchange_updates(&mut server, &mut client);

    for host in [&server, &client] {
        let stats = host.manager.stats();
        assert_eq!(stats.property(position, 0), PropertyStats::default());
        assert_eq!(stats.property(position, 2), PropertyStats::default());
        assert_eq!(stats.component(health), PropertyStats::default());
    }
    let replica = client.manager.component::<Health>(ENTITY).unwrap();
    assert!(replica.notifications.is_empty());
}

#[test]
fn test_sent_bytes_equal_received_bytes() {
    init_logger();
    let (mut server, mut client) = bound_pair();
    let position = position_id(&server);
    let health = health_id(&server);

    {
        let source = server.manager.component_mut::<Health>(ENTITY).unwrap();
        source.hit_points.set(HitPoints::new(73.4));
        *source.alive = false;
    }
    *server.manager.component_mut::<Position>(ENTITY).unwrap().z = 90_000;
    exchange_updates(&mut server, &mut client);

    let sent = server.manager.stats();
    let received = client.manager.stats();
    for (component, index) in [(health, 0), (health, 1), (position, 2)] {
        assert_eq!(
            sent.property(component, index).bytes_sent,
            received.property(component, index).bytes_received,
            "byte mismatch for {:?} property {}",
            component,
            index
        );
    }
    assert_eq!(sent.total_bytes_sent(), received.total_bytes_received());
}

#[test]
fn test_quantized_duplicate_is_pruned() {
    init_logger();
    let (mut server, mut client) = bound_pair();

    server
        .manager
        .component_mut::<Health>(ENTITY)
        .unwrap()
        .hit_points
        .set(HitPoints::new(42.04));
    exchange_updates(&mut server, &mut client);

    // rounds to the same wire value
    server
        .manager
        .component_mut::<Health>(ENTITY)
        .unwrap()
        .hit_points
        .set(HitPoints::new(41.98));
    exchange_updates(&mut server, &mut client);

    let replica = client.manager.component::<Health>(ENTITY).unwrap();
    assert_eq!(replica.hit_points.get(), 42.0);
    assert_eq!(replica.notifications, vec![vec![0]]);
}

#[test]
fn test_inbound_values_are_not_echoed() {
    init_logger();
    let (mut server, mut client) = bound_pair();

    *server.manager.component_mut::<Position>(ENTITY).unwrap().x = 8;
    exchange_updates(&mut server, &mut client);

    assert!(client
        .manager
        .binding(ENTITY)
        .unwrap()
        .current_record()
        .is_clear());
    assert!(client.manager.write_updates().is_none());
}

#[test]
fn test_authoritative_update_clears_prediction() {
    init_logger();
    let (mut server, mut client) = bound_pair();
    let health = health_id(&server);

    // the client predicts ahead of the server
    client
        .manager
        .component_mut::<Health>(ENTITY)
        .unwrap()
        .hit_points
        .set(HitPoints::new(10.0));
    let predicted = client
        .manager
        .binding(ENTITY)
        .unwrap()
        .predictable_record()
        .snapshot();
    assert!(predicted.bits(health).unwrap().bit(0));

    server
        .manager
        .component_mut::<Health>(ENTITY)
        .unwrap()
        .hit_points
        .set(HitPoints::new(12.5));
    exchange_updates(&mut server, &mut client);

    let binding = client.manager.binding(ENTITY).unwrap();
    assert!(binding.predictable_record().snapshot().is_clear());
    let replica = client.manager.component::<Health>(ENTITY).unwrap();
    assert_eq!(replica.hit_points.get(), 12.5);
}

#[test]
fn test_unpredictable_property_is_not_tracked_as_prediction() {
    init_logger();
    let (_server, mut client) = bound_pair();

    *client.manager.component_mut::<Health>(ENTITY).unwrap().alive = false;

    let binding = client.manager.binding(ENTITY).unwrap();
    assert!(binding.predictable_record().is_clear());
    assert!(!binding.current_record().is_clear());
}

#[test]
fn test_full_state_after_mark_all() {
    init_logger();
    let (mut server, mut client) = bound_pair();
    {
        let source = server.manager.component_mut::<Position>(ENTITY).unwrap();
        *source.x = 1;
        *source.y = 2;
        *source.z = 3;
    }
    server.manager.binding(ENTITY).unwrap().current_record().clear_all();

    server.manager.binding(ENTITY).unwrap().mark_all();
    exchange_updates(&mut server, &mut client);

    let replica = client.manager.component::<Position>(ENTITY).unwrap();
    assert_eq!((*replica.x, *replica.y, *replica.z), (1, 2, 3));
    assert_eq!(replica.notifications, vec![vec![0, 1, 2]]);
    // Health values equal the defaults, so nothing about it is reported
    assert!(client
        .manager
        .component::<Health>(ENTITY)
        .unwrap()
        .notifications
        .is_empty());
}
