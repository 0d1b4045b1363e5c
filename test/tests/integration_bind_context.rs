/// INTEGRATION TESTS: What a component reaches through its bind context
use netbind_shared::{NetEntityId, NetEntityRole, NetworkComponent};
use netbind_test::{exchange_updates, host_pair, Health, Position, TestHost, Thruster};

const ENTITY: NetEntityId = NetEntityId::new(4);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn bound_pair() -> (TestHost, TestHost) {
    let (mut server, mut client) = host_pair();
    server.spawn(ENTITY, NetEntityRole::Authority);
    client.spawn(ENTITY, NetEntityRole::Client);
    for host in [&mut server, &mut client] {
        host.manager.add_component(ENTITY, Position::default()).unwrap();
        host.manager.add_component(ENTITY, Thruster::default()).unwrap();
    }
    (server, client)
}

#[test]
fn test_sibling_lookup_follows_bound_components() {
    init_logger();
    let (mut server, _client) = bound_pair();
    let position = server.manager.registry().net_id_of::<Position>().unwrap();
    let thruster = server.manager.registry().net_id_of::<Thruster>().unwrap();

    let context = server
        .manager
        .component::<Thruster>(ENTITY)
        .unwrap()
        .core()
        .context()
        .unwrap()
        .clone();
    assert_eq!(context.sibling::<Position>(), Some(position));
    assert_eq!(context.sibling::<Thruster>(), Some(thruster));
    assert_eq!(context.sibling::<Health>(), None);
    assert_eq!(context.siblings(), vec![position, thruster]);

    server.manager.remove_component(ENTITY, position).unwrap();
    assert_eq!(context.sibling::<Position>(), None);

    server.manager.add_component(ENTITY, Health::new(10.0)).unwrap();
    let health = server.manager.registry().net_id_of::<Health>().unwrap();
    assert_eq!(context.sibling::<Health>(), Some(health));
}

#[test]
fn test_mark_dirty_sends_full_component_state() {
    init_logger();
    let (mut server, mut client) = bound_pair();
    *server.manager.component_mut::<Thruster>(ENTITY).unwrap().throttle = 9;
    exchange_updates(&mut server, &mut client);
    assert!(server.manager.write_updates().is_none());

    server
        .manager
        .component::<Thruster>(ENTITY)
        .unwrap()
        .core()
        .context()
        .unwrap()
        .mark_dirty();

    let thruster = server.manager.registry().net_id_of::<Thruster>().unwrap();
    let position = server.manager.registry().net_id_of::<Position>().unwrap();
    let pending = server.manager.binding(ENTITY).unwrap().current_record().snapshot();
    assert!(pending.bits(thruster).unwrap().bit(0));
    assert!(pending.is_component_clear(position));

    let report = exchange_updates(&mut server, &mut client);
    assert_eq!(report.applied, vec![ENTITY]);
    assert_eq!(server.manager.stats().property(thruster, 0).updates_sent, 2);
    assert_eq!(*client.manager.component::<Thruster>(ENTITY).unwrap().throttle, 9);
}
