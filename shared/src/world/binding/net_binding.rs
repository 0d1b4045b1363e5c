use log::{debug, warn};

use netbind_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{
    connection::Connection,
    world::{
        component::{
            component_registry::ComponentRegistry, error::ComponentError,
            network_component::NetworkComponent,
        },
        controller::{error::ControllerError, error::ControllerState},
        delta::{
            serializer::{ReadSerializer, WriteSerializer},
            stats::ReplicationStats,
        },
        record::{
            diff_mask::DiffMask, record_mutator::RecordMutator,
            replication_record::ReplicationRecord,
        },
        rpc::{rpc_message::NetworkEntityRpcMessage, rpc_outbox::RpcOutbox},
    },
    ConnectionId, EntityIsMigrating, NetComponentId, NetEntityId, Strictness,
};

use super::{
    error::ReplicationError,
    net_bind_context::{NetBindContext, SiblingDirectory},
    role::{NetEntityRole, RoleAccessor, RoleHandle, RoleState},
};

/// An encoded delta that has not been committed yet. Committing lowers
/// exactly the bits it carries.
pub struct OutboundDelta {
    entity: NetEntityId,
    payload: Vec<u8>,
    committed: ReplicationRecord,
    stats: ReplicationStats,
}

impl OutboundDelta {
    pub fn entity(&self) -> NetEntityId {
        self.entity
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Counters to fold into the session once the payload is on the wire
    pub fn stats(&self) -> &ReplicationStats {
        &self.stats
    }
}

/// One replicated entity on this host: its components, its dirty records,
/// its role, and the controller lifecycle that follows from that role.
pub struct NetBinding {
    entity: NetEntityId,
    components: Vec<Box<dyn NetworkComponent>>,
    current: RecordMutator,
    predictable: RecordMutator,
    roles: RoleHandle,
    rpc_outbox: RpcOutbox,
    siblings: SiblingDirectory,
    owning_connection: Option<ConnectionId>,
    controllers_running: bool,
    strictness: Strictness,
}

impl NetBinding {
    pub fn new(entity: NetEntityId, role: RoleState, strictness: Strictness) -> Self {
        Self {
            entity,
            components: Vec::new(),
            current: RecordMutator::new(ReplicationRecord::new()),
            predictable: RecordMutator::new(ReplicationRecord::new()),
            roles: RoleHandle::new(role),
            rpc_outbox: RpcOutbox::new(),
            siblings: SiblingDirectory::new(),
            owning_connection: None,
            controllers_running: false,
            strictness,
        }
    }

    pub fn entity(&self) -> NetEntityId {
        self.entity
    }

    // Roles

    pub fn role_state(&self) -> RoleState {
        self.roles.get()
    }

    pub fn role(&self) -> NetEntityRole {
        self.roles.get().role()
    }

    /// A view of the role that outlives neither the binding nor its lock
    pub fn roles(&self) -> RoleAccessor {
        self.roles.accessor()
    }

    pub fn is_authority(&self) -> bool {
        self.roles.get().is_authority()
    }

    pub fn is_autonomous(&self) -> bool {
        self.roles.get().is_autonomous()
    }

    pub fn is_server(&self) -> bool {
        self.roles.get().is_server()
    }

    pub fn is_client(&self) -> bool {
        self.roles.get().is_client()
    }

    /// Assign a new role, constructing and activating controllers when the
    /// binding gains Authority or Autonomous and tearing them down when it
    /// loses both
    ///
    /// # Panics
    ///
    /// Panics if a controller transition fails.
    /// Consider using `try_set_role` for non-panicking error handling.
    pub fn set_role(&mut self, role: RoleState) {
        if let Err(error) = self.try_set_role(role) {
            panic!("Failed to assign role to {:?}: {}", self.entity, error);
        }
    }

    pub fn try_set_role(&mut self, role: RoleState) -> Result<(), ControllerError> {
        let previous = self.roles.get();
        self.roles.set(role);
        debug!(
            "{:?} role {:?} -> {:?}",
            self.entity,
            previous.role(),
            role.role()
        );

        let runs = role.role().runs_controllers();
        if runs && !self.controllers_running {
            self.start_controllers(EntityIsMigrating::False)
        } else if !runs && self.controllers_running {
            self.stop_controllers(EntityIsMigrating::False)
        } else {
            Ok(())
        }
    }

    pub fn controllers_running(&self) -> bool {
        self.controllers_running
    }

    /// Construct then activate every component's controller. Does nothing
    /// unless the role runs controllers. If any step fails, every component
    /// is returned to NoController.
    pub fn start_controllers(&mut self, migrating: EntityIsMigrating) -> Result<(), ControllerError> {
        if !self.role().runs_controllers() {
            return Ok(());
        }
        if let Err(error) = self.construct_and_activate_all(migrating) {
            warn!(
                "Aborting controllers of {:?}: {}",
                self.entity, error
            );
            self.abort_controllers(migrating);
            return Err(error);
        }
        self.controllers_running = true;
        Ok(())
    }

    fn construct_and_activate_all(&mut self, migrating: EntityIsMigrating) -> Result<(), ControllerError> {
        for component in self.components.iter_mut() {
            component.construct_controller(self.strictness)?;
        }
        for component in self.components.iter_mut() {
            if component.controller_state() == ControllerState::Constructed {
                component.activate_controller(migrating, self.strictness)?;
            }
        }
        Ok(())
    }

    /// Deactivate then destruct every component's controller
    pub fn stop_controllers(&mut self, migrating: EntityIsMigrating) -> Result<(), ControllerError> {
        self.controllers_running = false;
        let mut result = Ok(());
        for component in self.components.iter_mut() {
            let stopped = Self::stop_controller(&mut **component, migrating, self.strictness);
            if let Err(error) = stopped {
                component.abort_controller(migrating);
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        result
    }

    fn stop_controller(
        component: &mut dyn NetworkComponent,
        migrating: EntityIsMigrating,
        strictness: Strictness,
    ) -> Result<(), ControllerError> {
        if component.controller_state() == ControllerState::Active {
            component.deactivate_controller(migrating, strictness)?;
        }
        if component.controller_state() == ControllerState::Constructed {
            component.destruct_controller(strictness)?;
        }
        Ok(())
    }

    fn abort_controllers(&mut self, migrating: EntityIsMigrating) {
        self.controllers_running = false;
        for component in self.components.iter_mut() {
            component.abort_controller(migrating);
        }
    }

    // Components

    /// Bind a component under its registered id. If controllers are running
    /// its controller is started right away.
    pub fn add_component(
        &mut self,
        registry: &ComponentRegistry,
        mut component: Box<dyn NetworkComponent>,
    ) -> Result<NetComponentId, ReplicationError> {
        let net_id = registry
            .kind_to_net_id(&component.kind())
            .ok_or(ComponentError::ComponentNotRegistered {
                component_name: component.name(),
            })?;
        if self.component_by_id(net_id).is_some() {
            return Err(ReplicationError::ComponentAlreadyBound {
                entity: self.entity,
                component: net_id,
            });
        }
        let property_count = component.properties().len() as u8;
        self.current
            .write()
            .add_component(net_id, property_count)
            .map_err(|_| ReplicationError::ComponentAlreadyBound {
                entity: self.entity,
                component: net_id,
            })?;
        self.predictable
            .write()
            .add_component(net_id, property_count)
            .map_err(|_| ReplicationError::ComponentAlreadyBound {
                entity: self.entity,
                component: net_id,
            })?;

        let context = NetBindContext::new(
            self.entity,
            net_id,
            self.roles.accessor(),
            self.rpc_outbox.clone(),
            self.current.clone(),
            self.siblings.clone(),
        );
        component.network_attach(context, &self.current, &self.predictable);
        component.set_owning_connection_id(self.owning_connection);

        if self.controllers_running {
            let started = component
                .construct_controller(self.strictness)
                .and_then(|_| {
                    if component.controller_state() == ControllerState::Constructed {
                        component.activate_controller(EntityIsMigrating::False, self.strictness)
                    } else {
                        Ok(())
                    }
                });
            if let Err(error) = started {
                component.abort_controller(EntityIsMigrating::False);
                self.current.write().remove_component(net_id);
                self.predictable.write().remove_component(net_id);
                return Err(error.into());
            }
        }

        self.siblings.insert(component.kind(), net_id);
        self.components.push(component);
        Ok(net_id)
    }

    /// Unbind a component, tearing down its controller. Its role queries fail
    /// from then on.
    pub fn remove_component(&mut self, net_id: NetComponentId) -> Option<Box<dyn NetworkComponent>> {
        let position = self
            .components
            .iter()
            .position(|component| component.net_component_id() == Some(net_id))?;
        let mut component = self.components.remove(position);
        component.abort_controller(EntityIsMigrating::False);
        component.core_mut().detach();
        self.siblings.remove(net_id);
        self.current.write().remove_component(net_id);
        self.predictable.write().remove_component(net_id);
        Some(component)
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn NetworkComponent> {
        self.components.iter().map(|component| component.as_ref())
    }

    pub fn component_by_id(&self, net_id: NetComponentId) -> Option<&dyn NetworkComponent> {
        self.components()
            .find(|component| component.net_component_id() == Some(net_id))
    }

    pub fn component<C: NetworkComponent>(&self) -> Option<&C> {
        self.components
            .iter()
            .find_map(|component| component.downcast_ref::<C>())
    }

    pub fn component_mut<C: NetworkComponent>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find_map(|component| component.downcast_mut::<C>())
    }

    pub fn set_owning_connection(&mut self, connection: Option<ConnectionId>) {
        self.owning_connection = connection;
        for component in self.components.iter_mut() {
            component.set_owning_connection_id(connection);
        }
    }

    pub fn owning_connection(&self) -> Option<ConnectionId> {
        self.owning_connection
    }

    /// Mark every property of every component, so the next outbound pass
    /// carries full state
    pub fn mark_all(&self) {
        self.current.mark_all();
    }

    pub fn current_record(&self) -> &RecordMutator {
        &self.current
    }

    pub fn predictable_record(&self) -> &RecordMutator {
        &self.predictable
    }

    pub fn rpc_outbox(&self) -> &RpcOutbox {
        &self.rpc_outbox
    }

    // Outbound

    /// Encode every marked property from a snapshot of the record. Nothing is
    /// lowered until [`NetBinding::commit`]; bits marked meanwhile survive
    /// it, including those of properties the delta already carries.
    pub fn prepare_delta(&mut self) -> Result<Option<OutboundDelta>, ReplicationError> {
        let snapshot = self.current.send_snapshot();
        if snapshot.is_clear() {
            return Ok(None);
        }
        let mut record = snapshot.clone();
        let mut stats = ReplicationStats::new();
        let payload = self.encode(&mut record, false, &mut stats)?;
        Ok(Some(OutboundDelta {
            entity: self.entity,
            payload,
            committed: snapshot,
            stats,
        }))
    }

    /// Lower the bits a delta carried, now that it is on the wire
    pub fn commit(&self, delta: &OutboundDelta) {
        self.current.commit(&delta.committed);
    }

    /// Every property of every component, for handing the entity over to
    /// another host. Leaves the record untouched.
    pub fn full_state_payload(&mut self) -> Result<Vec<u8>, ReplicationError> {
        let mut record = self.current.snapshot();
        record.mark_all();
        self.encode(&mut record, true, &mut ReplicationStats::new())
    }

    fn encode(
        &mut self,
        record: &mut ReplicationRecord,
        include_clear: bool,
        stats: &mut ReplicationStats,
    ) -> Result<Vec<u8>, ReplicationError> {
        let mut writer = BitWriter::unbounded();
        self.entity.ser(&mut writer);

        for component in self.components.iter_mut() {
            let Some(net_id) = component.net_component_id() else {
                continue;
            };
            let Some(bits) = record.bits(net_id) else {
                continue;
            };
            if bits.is_clear() && !include_clear {
                continue;
            }
            writer.write_bit(true);
            net_id.ser(&mut writer);
            bits.write_bits(&mut writer);

            let mut serializer = WriteSerializer::new(&mut writer, self.strictness);
            if !component.serialize_state_delta(record, &mut serializer, stats) {
                return Err(ReplicationError::ComponentDeltaFailed {
                    entity: self.entity,
                    component: net_id,
                });
            }
        }

        writer.write_bit(false);
        Ok(writer.to_bytes())
    }

    // Inbound

    /// Apply an entity payload. Nothing is applied unless the whole payload
    /// decodes. Returns the record of properties that actually changed.
    pub fn apply_state_delta(
        &mut self,
        payload: &[u8],
        registry: &ComponentRegistry,
        stats: &mut ReplicationStats,
    ) -> Result<ReplicationRecord, ReplicationError> {
        let entity = self.entity;
        let strictness = self.strictness;
        Self::scan_payload(entity, payload, registry, strictness)?;

        let mut reader = BitReader::new(payload);
        read_entity(entity, &mut reader)?;

        let mut received = ReplicationRecord::new();
        let mut carried = ReplicationRecord::new();

        while let Some((net_id, bits)) = read_header(entity, &mut reader, registry)? {
            track(entity, &mut carried, net_id, bits.clone())?;
            track(entity, &mut received, net_id, bits)?;

            let mut serializer = ReadSerializer::new(&mut reader, strictness);
            let applied = match self
                .components
                .iter_mut()
                .find(|component| component.net_component_id() == Some(net_id))
            {
                Some(component) => {
                    component.serialize_state_delta(&mut received, &mut serializer, stats)
                }
                None => {
                    warn!(
                        "Discarding delta for component {:?} missing from {:?}",
                        net_id, entity
                    );
                    let mut scratch = registry.create(net_id)?;
                    let decoded = scratch.serialize_state_delta(
                        &mut received,
                        &mut serializer,
                        &mut ReplicationStats::new(),
                    );
                    received.remove_component(net_id);
                    carried.remove_component(net_id);
                    decoded
                }
            };
            if !applied {
                return Err(ReplicationError::ComponentDeltaFailed {
                    entity,
                    component: net_id,
                });
            }
        }

        // authoritative values replace whatever was predicted for them
        self.predictable.subtract(&carried);

        for component in self.components.iter_mut() {
            let Some(net_id) = component.net_component_id() else {
                continue;
            };
            if !received.is_component_clear(net_id) {
                component.notify_state_delta_changes(&received);
            }
        }

        Ok(received)
    }

    /// Decode a whole payload into scratch instances from the registry,
    /// touching no live state. Returns the component types it carries, in
    /// order.
    pub fn scan_payload(
        entity: NetEntityId,
        payload: &[u8],
        registry: &ComponentRegistry,
        strictness: Strictness,
    ) -> Result<Vec<NetComponentId>, ReplicationError> {
        let mut reader = BitReader::new(payload);
        read_entity(entity, &mut reader)?;

        let mut record = ReplicationRecord::new();
        let mut components = Vec::new();
        while let Some((net_id, bits)) = read_header(entity, &mut reader, registry)? {
            track(entity, &mut record, net_id, bits)?;
            let mut scratch = registry.create(net_id)?;
            let mut serializer = ReadSerializer::new(&mut reader, strictness);
            if !scratch.serialize_state_delta(&mut record, &mut serializer, &mut ReplicationStats::new()) {
                return Err(ReplicationError::ComponentDeltaFailed {
                    entity,
                    component: net_id,
                });
            }
            components.push(net_id);
        }
        Ok(components)
    }

    // RPC

    /// Route an RPC to its component. Returns whether the component consumed
    /// it; RPCs addressed to a role this host does not hold are ignored.
    pub fn handle_rpc(
        &mut self,
        connection: &dyn Connection,
        message: &NetworkEntityRpcMessage,
    ) -> Result<bool, ReplicationError> {
        let role = self.roles.get();
        let entity = self.entity;
        let component = self
            .components
            .iter_mut()
            .find(|component| component.net_component_id() == Some(message.component))
            .ok_or(ReplicationError::ComponentNotFound {
                entity,
                component: message.component,
            })?;
        if !role.holds(message.target) {
            debug!(
                "Ignoring RPC for {:?} on {:?}: addressed to {:?}, this host is {:?}",
                message.component,
                entity,
                message.target,
                role.role()
            );
            return Ok(false);
        }
        Ok(component.handle_rpc(connection, message.target, message))
    }
}

fn serialization(entity: NetEntityId, source: SerdeErr) -> ReplicationError {
    ReplicationError::Serialization { entity, source }
}

fn read_entity(entity: NetEntityId, reader: &mut BitReader) -> Result<(), ReplicationError> {
    let addressed = NetEntityId::de(reader).map_err(|source| serialization(entity, source))?;
    if addressed != entity {
        return Err(serialization(
            entity,
            SerdeErr::InvalidValue {
                type_name: "NetEntityId",
                reason: "payload is addressed to a different entity",
            },
        ));
    }
    Ok(())
}

/// `None` at the terminating continue bit
fn read_header(
    entity: NetEntityId,
    reader: &mut BitReader,
    registry: &ComponentRegistry,
) -> Result<Option<(NetComponentId, DiffMask)>, ReplicationError> {
    read_component_header(reader, registry).map_err(|source| serialization(entity, source))
}

fn read_component_header(
    reader: &mut BitReader,
    registry: &ComponentRegistry,
) -> Result<Option<(NetComponentId, DiffMask)>, SerdeErr> {
    if !reader.read_bit()? {
        return Ok(None);
    }
    let net_id = NetComponentId::de(reader)?;
    let descriptor = registry.descriptor(net_id).ok_or(SerdeErr::InvalidValue {
        type_name: "NetComponentId",
        reason: "component type is not registered",
    })?;
    let bits = DiffMask::read_bits(reader, descriptor.property_count())?;
    Ok(Some((net_id, bits)))
}

fn track(
    entity: NetEntityId,
    record: &mut ReplicationRecord,
    net_id: NetComponentId,
    bits: DiffMask,
) -> Result<(), ReplicationError> {
    record.add_bits(net_id, bits).map_err(|_| {
        serialization(
            entity,
            SerdeErr::InvalidValue {
                type_name: "NetComponentId",
                reason: "component appears twice in one payload",
            },
        )
    })
}

impl Drop for NetBinding {
    fn drop(&mut self) {
        for component in self.components.iter_mut() {
            component.abort_controller(EntityIsMigrating::False);
        }
    }
}
