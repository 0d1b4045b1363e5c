/// INTEGRATION TESTS: One entity's bad payload never touches its siblings
use netbind_shared::{
    BitWrite, BitWriter, NetComponentId, NetEntityId, NetEntityRole, ReplicationError, Serde,
    UnsignedVariableInteger,
};
use netbind_test::{exchange_updates, host_pair, Position, TestHost, Thruster};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const FIRST: NetEntityId = NetEntityId::new(1);
const SECOND: NetEntityId = NetEntityId::new(2);
const STRANGER: NetEntityId = NetEntityId::new(3);

/// Frame entity payloads the way an updates packet carries them
fn frame(payloads: &[&[u8]]) -> Vec<u8> {
    let mut writer = BitWriter::unbounded();
    for payload in payloads {
        writer.write_bit(true);
        UnsignedVariableInteger::<7>::new(payload.len() as u64).ser(&mut writer);
        writer.write_bytes(payload);
    }
    writer.write_bit(false);
    writer.to_bytes()
}

fn payload_of(server: &mut TestHost, entity: NetEntityId) -> Vec<u8> {
    let binding = server.manager.binding_mut(entity).unwrap();
    let delta = binding.prepare_delta().unwrap().unwrap();
    binding.commit(&delta);
    delta.payload().to_vec()
}

fn populated_pair() -> (TestHost, TestHost) {
    let (mut server, mut client) = host_pair();
    for entity in [FIRST, SECOND, STRANGER] {
        server.spawn(entity, NetEntityRole::Authority);
        server.manager.add_component(entity, Position::default()).unwrap();
        let source = server.manager.component_mut::<Position>(entity).unwrap();
        *source.x = 11;
        *source.y = 22;
        *source.z = 33;
    }
    for entity in [FIRST, SECOND] {
        client.spawn(entity, NetEntityRole::Client);
        client.manager.add_component(entity, Position::default()).unwrap();
    }
    (server, client)
}

#[test]
fn test_truncated_entity_leaves_siblings_alone() {
    init_logger();
    let (mut server, mut client) = populated_pair();
    let first = payload_of(&mut server, FIRST);
    let second = payload_of(&mut server, SECOND);

    let truncated = &first[..first.len() - 2];
    let report = client.manager.read_updates(&frame(&[truncated, &second])).unwrap();

    assert_eq!(report.applied, vec![SECOND]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, FIRST);
    assert!(matches!(
        report.failed[0].1,
        ReplicationError::Serialization { .. }
    ));

    // nothing of the failed payload was applied, not even its leading fields
    let untouched = client.manager.component::<Position>(FIRST).unwrap();
    assert_eq!((*untouched.x, *untouched.y, *untouched.z), (0, 0, 0));
    assert!(untouched.notifications.is_empty());

    let applied = client.manager.component::<Position>(SECOND).unwrap();
    assert_eq!((*applied.x, *applied.y, *applied.z), (11, 22, 33));
}

#[test]
fn test_unknown_entity_is_dropped() {
    init_logger();
    let (mut server, mut client) = populated_pair();
    let stranger = payload_of(&mut server, STRANGER);
    let first = payload_of(&mut server, FIRST);

    let report = client.manager.read_updates(&frame(&[&stranger, &first])).unwrap();

    assert_eq!(report.dropped, vec![STRANGER]);
    assert_eq!(report.applied, vec![FIRST]);
    assert!(report.failed.is_empty());
}

#[test]
fn test_unregistered_component_type_rejects_entity() {
    init_logger();
    let (mut server, mut client) = populated_pair();
    let second = payload_of(&mut server, SECOND);

    let mut writer = BitWriter::unbounded();
    FIRST.ser(&mut writer);
    writer.write_bit(true);
    NetComponentId::new(200).ser(&mut writer);
    writer.write_bit(false);
    let bogus = writer.to_bytes();

    let report = client.manager.read_updates(&frame(&[&bogus, &second])).unwrap();

    assert_eq!(report.applied, vec![SECOND]);
    assert_eq!(report.failed.len(), 1);
}

#[test]
fn test_payload_for_missing_component_stays_aligned() {
    init_logger();
    let (mut server, mut client) = host_pair();
    server.spawn(FIRST, NetEntityRole::Authority);
    client.spawn(FIRST, NetEntityRole::Client);
    server.manager.add_component(FIRST, Position::default()).unwrap();
    server
        .manager
        .add_component(FIRST, Thruster::default())
        .unwrap();
    client
        .manager
        .add_component(FIRST, Thruster::default())
        .unwrap();

    *server.manager.component_mut::<Position>(FIRST).unwrap().x = 5;
    *server
        .manager
        .component_mut::<Thruster>(FIRST)
        .unwrap()
        .throttle = 200;
    let report = exchange_updates(&mut server, &mut client);

    assert_eq!(report.applied, vec![FIRST]);
    let thruster = client
        .manager
        .component::<Thruster>(FIRST)
        .unwrap();
    assert_eq!(*thruster.throttle, 200);
}

#[test]
fn test_malformed_frame_keeps_earlier_entities() {
    init_logger();
    let (mut server, mut client) = populated_pair();
    let first = payload_of(&mut server, FIRST);

    let mut writer = BitWriter::unbounded();
    writer.write_bit(true);
    UnsignedVariableInteger::<7>::new(first.len() as u64).ser(&mut writer);
    writer.write_bytes(&first);
    writer.write_bit(true);
    // announces far more bytes than follow
    UnsignedVariableInteger::<7>::new(500u64).ser(&mut writer);
    writer.write_bytes(&[1, 2, 3]);
    let packet = writer.to_bytes();

    assert!(client.manager.read_updates(&packet).is_err());
    assert_eq!(*client.manager.component::<Position>(FIRST).unwrap().x, 11);
}
