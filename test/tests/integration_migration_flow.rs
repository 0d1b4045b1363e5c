/// INTEGRATION TESTS: Handing an entity over between hosts
///
/// The source host tears its controllers down as a migration, the target
/// builds the entity from the hand-off payload and brings its controllers up
/// as a migration.
use netbind_shared::{
    ControllerState, NetEntityId, NetEntityRole, ReplicationError, ReplicationManager, RoleState,
};
use netbind_test::{
    assert_controller_state, exchange_rpcs, host_pair, protocol, test_protocol::HitPoints, Health,
    Journal, LifecycleEvent, Position, Thruster,
};

const ENTITY: NetEntityId = NetEntityId::new(5);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn authority() -> RoleState {
    RoleState::new(NetEntityRole::Authority)
}

fn source_host(journal: &Journal) -> ReplicationManager {
    let mut host = ReplicationManager::new(protocol());
    host.spawn_entity(ENTITY, authority()).unwrap();
    host.add_component(ENTITY, Health::new(55.5).with_journal(journal.clone()))
        .expect("Health is registered");
    host.add_component(ENTITY, Position::new(4, -2, 9)).unwrap();
    host
}

#[test]
fn test_controller_lifecycle_across_hosts() {
    init_logger();
    let journal = Journal::new();
    let mut host_a = source_host(&journal);
    let mut host_b = ReplicationManager::new(protocol());

    assert_eq!(
        journal.events(),
        vec![
            LifecycleEvent::Constructed,
            LifecycleEvent::Activated { migrating: false },
        ]
    );
    journal.clear();

    let payload = host_a.migrate_out(ENTITY).unwrap();

    assert_eq!(
        journal.events(),
        vec![
            LifecycleEvent::Deactivated { migrating: true },
            LifecycleEvent::Destructed,
        ]
    );
    assert!(!host_a.has_entity(ENTITY));

    host_b.migrate_in(ENTITY, authority(), &payload).unwrap();

    let migrated = host_b.component::<Health>(ENTITY).unwrap();
    assert_eq!(
        migrated.journal.events(),
        vec![
            LifecycleEvent::Constructed,
            LifecycleEvent::Activated { migrating: true },
        ]
    );
    assert_controller_state!(host_b, ENTITY, Health, ControllerState::Active);
    // the source journal saw nothing more after the hand-off
    assert_eq!(journal.events().len(), 2);
}

#[test]
fn test_state_is_carried_over() {
    init_logger();
    let journal = Journal::new();
    let mut host_a = source_host(&journal);
    host_a
        .component_mut::<Health>(ENTITY)
        .unwrap()
        .alive
        .set(false);
    let mut host_b = ReplicationManager::new(protocol());

    let payload = host_a.migrate_out(ENTITY).unwrap();
    host_b.migrate_in(ENTITY, authority(), &payload).unwrap();

    let health = host_b.component::<Health>(ENTITY).unwrap();
    assert_eq!(*health.hit_points, HitPoints::new(55.5));
    assert!(!*health.alive);
    let position = host_b.component::<Position>(ENTITY).unwrap();
    assert_eq!((*position.x, *position.y, *position.z), (4, -2, 9));
    assert!(host_b.component::<Thruster>(ENTITY).is_none());
}

#[test]
fn test_hand_off_is_not_counted_as_traffic() {
    init_logger();
    let journal = Journal::new();
    let mut host_a = source_host(&journal);
    let mut host_b = ReplicationManager::new(protocol());

    let payload = host_a.migrate_out(ENTITY).unwrap();
    host_b.migrate_in(ENTITY, authority(), &payload).unwrap();

    assert_eq!(host_a.stats().total_bytes_sent(), 0);
    assert_eq!(host_b.stats().total_bytes_received(), 0);
    // migrated values are current on the target, not pending changes
    assert!(host_b.write_updates().is_none());
}

#[test]
fn test_replica_target_starts_no_controllers() {
    init_logger();
    let journal = Journal::new();
    let mut host_a = source_host(&journal);
    let mut host_b = ReplicationManager::new(protocol());

    let payload = host_a.migrate_out(ENTITY).unwrap();
    host_b
        .migrate_in(ENTITY, RoleState::new(NetEntityRole::Server), &payload)
        .unwrap();

    let migrated = host_b.component::<Health>(ENTITY).unwrap();
    assert!(migrated.journal.events().is_empty());
    assert_controller_state!(host_b, ENTITY, Health, ControllerState::NoController);
}

#[test]
fn test_nothing_reaches_the_source_after_hand_off() {
    init_logger();
    let (mut server, mut client) = host_pair();
    server.spawn(ENTITY, NetEntityRole::Authority);
    client.spawn(ENTITY, NetEntityRole::Client);
    server.manager.add_component(ENTITY, Thruster::default()).unwrap();
    client.manager.add_component(ENTITY, Thruster::default()).unwrap();

    server.manager.migrate_out(ENTITY).unwrap();

    let thruster = client.manager.component::<Thruster>(ENTITY).unwrap();
    assert!(thruster.fire(NetEntityRole::Authority, 3));
    let report = exchange_rpcs(&mut client, &mut server);

    assert_eq!(report.handled, 0);
    assert_eq!(report.dropped, 1);
    assert!(server.manager.write_updates().is_none());
}

#[test]
fn test_migration_errors() {
    init_logger();
    let journal = Journal::new();
    let mut host_a = source_host(&journal);

    assert!(matches!(
        host_a.migrate_out(NetEntityId::new(99)),
        Err(ReplicationError::EntityNotFound { .. })
    ));

    let payload = host_a.migrate_out(ENTITY).unwrap();
    let mut host_b = ReplicationManager::new(protocol());
    host_b.spawn_entity(ENTITY, authority()).unwrap();
    assert!(matches!(
        host_b.migrate_in(ENTITY, authority(), &payload),
        Err(ReplicationError::EntityAlreadyBound { .. })
    ));

    // a payload cut short builds nothing
    let mut host_c = ReplicationManager::new(protocol());
    let truncated = &payload[..payload.len() / 2];
    assert!(host_c.migrate_in(ENTITY, authority(), truncated).is_err());
    assert!(!host_c.has_entity(ENTITY));
}
