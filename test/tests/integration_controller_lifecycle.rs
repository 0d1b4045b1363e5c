/// INTEGRATION TESTS: Controllers follow the role of their binding
///
/// Only Authority and Autonomous run controllers. Every transition goes
/// NoController -> Constructed -> Active and back, and a failure anywhere
/// returns every component to NoController.
use netbind_shared::{
    ControllerError, ControllerOperation, ControllerState, EntityIsMigrating, NetEntityId,
    NetEntityRole, NetworkComponent, ReplicationError, ReplicationManager, RoleState, Strictness,
};
use netbind_test::{
    assert_controller_state, assert_roles_exclusive, protocol, Health, Journal, LifecycleEvent,
    Position,
};

use LifecycleEvent::{Activated, Constructed, Deactivated, Destructed};

const ENTITY: NetEntityId = NetEntityId::new(8);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn host_with(role: NetEntityRole, health: Health) -> ReplicationManager {
    let mut manager = ReplicationManager::new(protocol());
    manager.spawn_entity(ENTITY, RoleState::new(role)).unwrap();
    manager.add_component(ENTITY, Position::default()).unwrap();
    manager.add_component(ENTITY, health).unwrap();
    manager
}

#[test]
fn test_replicas_never_construct_controllers() {
    init_logger();
    for role in [NetEntityRole::Server, NetEntityRole::Client] {
        let journal = Journal::new();
        let manager = host_with(role, Health::new(1.0).with_journal(journal.clone()));

        assert!(journal.events().is_empty());
        assert_controller_state!(manager, ENTITY, Health, ControllerState::NoController);
        assert_roles_exclusive!(manager, ENTITY);
    }
}

#[test]
fn test_authority_runs_controllers_from_the_start() {
    init_logger();
    let journal = Journal::new();
    let manager = host_with(
        NetEntityRole::Authority,
        Health::new(1.0).with_journal(journal.clone()),
    );

    assert_eq!(journal.events(), vec![Constructed, Activated { migrating: false }]);
    assert_controller_state!(manager, ENTITY, Health, ControllerState::Active);
    // components without a controller type stay put
    assert_controller_state!(manager, ENTITY, Position, ControllerState::NoController);
}

#[test]
fn test_role_changes_start_and_stop_controllers() {
    init_logger();
    let journal = Journal::new();
    let mut manager = host_with(
        NetEntityRole::Client,
        Health::new(1.0).with_journal(journal.clone()),
    );

    manager
        .set_role(ENTITY, RoleState::new(NetEntityRole::Autonomous))
        .unwrap();
    assert_controller_state!(manager, ENTITY, Health, ControllerState::Active);

    // Autonomous to Authority keeps the same controller running
    manager
        .set_role(ENTITY, RoleState::autonomous_authority())
        .unwrap();
    assert_roles_exclusive!(manager, ENTITY);

    manager
        .set_role(ENTITY, RoleState::new(NetEntityRole::Server))
        .unwrap();
    assert_controller_state!(manager, ENTITY, Health, ControllerState::NoController);

    assert_eq!(
        journal.events(),
        vec![
            Constructed,
            Activated { migrating: false },
            Deactivated { migrating: false },
            Destructed,
        ]
    );
}

#[test]
fn test_refused_activation_aborts_to_no_controller() {
    init_logger();
    let journal = Journal::new();
    let mut manager = host_with(
        NetEntityRole::Client,
        Health::new(1.0)
            .with_journal(journal.clone())
            .refusing_activation(),
    );

    let result = manager.set_role(ENTITY, RoleState::new(NetEntityRole::Authority));

    assert!(matches!(
        result,
        Err(ReplicationError::Controller(
            ControllerError::ActivationFailed { .. }
        ))
    ));
    let binding = manager.binding(ENTITY).unwrap();
    assert!(!binding.controllers_running());
    for component in binding.components() {
        assert_eq!(component.controller_state(), ControllerState::NoController);
    }
    assert_eq!(journal.events(), vec![Constructed, Destructed]);
}

#[test]
fn test_component_added_to_running_binding_starts_at_once() {
    init_logger();
    let journal = Journal::new();
    let mut manager = ReplicationManager::new(protocol());
    manager
        .spawn_entity(ENTITY, RoleState::new(NetEntityRole::Authority))
        .unwrap();

    manager
        .add_component(ENTITY, Health::new(3.0).with_journal(journal.clone()))
        .unwrap();

    assert_eq!(journal.events(), vec![Constructed, Activated { migrating: false }]);
}

#[test]
fn test_refusing_component_is_not_bound() {
    init_logger();
    let mut manager = ReplicationManager::new(protocol());
    manager
        .spawn_entity(ENTITY, RoleState::new(NetEntityRole::Authority))
        .unwrap();

    let result = manager.add_component(ENTITY, Health::new(3.0).refusing_activation());

    assert!(result.is_err());
    assert!(manager.component::<Health>(ENTITY).is_none());
    // the type can still be bound afterwards
    manager.add_component(ENTITY, Health::new(3.0)).unwrap();
}

#[test]
fn test_despawn_and_removal_tear_down() {
    init_logger();
    let journal = Journal::new();
    let mut manager = host_with(
        NetEntityRole::Authority,
        Health::new(1.0).with_journal(journal.clone()),
    );
    journal.clear();

    let health = manager.registry().net_id_of::<Health>().unwrap();
    let removed = manager.remove_component(ENTITY, health).unwrap();
    assert_eq!(journal.events(), vec![Deactivated { migrating: false }, Destructed]);
    assert!(removed.try_is_authority().is_err());

    journal.clear();
    manager
        .add_component(ENTITY, Health::new(1.0).with_journal(journal.clone()))
        .unwrap();
    assert!(manager.despawn_entity(ENTITY));
    assert_eq!(
        journal.events(),
        vec![
            Constructed,
            Activated { migrating: false },
            Deactivated { migrating: false },
            Destructed,
        ]
    );
    assert!(!manager.despawn_entity(ENTITY));
}

#[test]
fn test_role_queries_from_components() {
    init_logger();
    let manager = host_with(NetEntityRole::Authority, Health::new(1.0));
    let health = manager.component::<Health>(ENTITY).unwrap();

    assert_eq!(health.try_is_authority(), Ok(true));
    assert_eq!(health.try_is_client(), Ok(false));
    assert_eq!(health.try_is_server(), Ok(false));
    assert_eq!(health.try_is_autonomous(), Ok(false));
}

#[test]
fn test_illegal_transitions_by_strictness() {
    init_logger();
    let mut manager = host_with(NetEntityRole::Authority, Health::new(1.0));
    let health = manager.component_mut::<Health>(ENTITY).unwrap();

    let result = health.construct_controller(Strictness::Development);
    assert!(matches!(
        result,
        Err(ControllerError::RoleConflict {
            operation: ControllerOperation::Construct,
            state: ControllerState::Active,
            ..
        })
    ));
    assert_eq!(health.controller_state(), ControllerState::Active);

    assert!(health
        .activate_controller(EntityIsMigrating::False, Strictness::Production)
        .is_ok());
    assert_eq!(health.controller_state(), ControllerState::Active);
}
