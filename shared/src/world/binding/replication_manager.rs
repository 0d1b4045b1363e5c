use std::collections::BTreeMap;

use log::{debug, info, warn};

use netbind_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr, UnsignedVariableInteger};

use crate::{
    connection::Connection,
    world::{
        component::{component_registry::ComponentRegistry, network_component::NetworkComponent},
        delta::stats::ReplicationStats,
        rpc::rpc_message::NetworkEntityRpcMessage,
    },
    EntityIsMigrating, NetComponentId, NetEntityId, Protocol, ReplicationConfig,
};

use super::{error::ReplicationError, net_binding::NetBinding, role::RoleState};

/// Outcome of reading one updates packet
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Entities whose payload applied in full
    pub applied: Vec<NetEntityId>,
    /// Entities this host does not know; their payloads were skipped
    pub dropped: Vec<NetEntityId>,
    /// Entities whose payload was rejected. Nothing of theirs was applied.
    pub failed: Vec<(NetEntityId, ReplicationError)>,
}

/// Outcome of reading one RPC packet
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RpcReport {
    pub handled: usize,
    pub unrecognized: usize,
    pub dropped: usize,
}

/// Replication state of every entity bound on this host, and the per-tick
/// passes that move it to and from the wire
pub struct ReplicationManager {
    protocol: Protocol,
    bindings: BTreeMap<NetEntityId, NetBinding>,
    stats: ReplicationStats,
    oversized: Vec<NetEntityId>,
}

impl ReplicationManager {
    pub fn new(mut protocol: Protocol) -> Self {
        if !protocol.is_locked() {
            protocol.lock();
        }
        Self {
            protocol,
            bindings: BTreeMap::new(),
            stats: ReplicationStats::new(),
            oversized: Vec::new(),
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.protocol.component_registry
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.protocol.config
    }

    pub fn stats(&self) -> &ReplicationStats {
        &self.stats
    }

    /// Start a new accounting session
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // Entities

    /// Bind a new entity. Controllers start as components are added, if the
    /// role runs them.
    pub fn spawn_entity(&mut self, entity: NetEntityId, role: RoleState) -> Result<(), ReplicationError> {
        if self.bindings.contains_key(&entity) {
            return Err(ReplicationError::EntityAlreadyBound { entity });
        }
        let mut binding = NetBinding::new(entity, role, self.protocol.config.strictness);
        binding.start_controllers(EntityIsMigrating::False)?;
        self.bindings.insert(entity, binding);
        Ok(())
    }

    /// Unbind an entity, returning every controller to NoController
    pub fn despawn_entity(&mut self, entity: NetEntityId) -> bool {
        self.bindings.remove(&entity).is_some()
    }

    pub fn has_entity(&self, entity: NetEntityId) -> bool {
        self.bindings.contains_key(&entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = NetEntityId> + '_ {
        self.bindings.keys().copied()
    }

    pub fn binding(&self, entity: NetEntityId) -> Option<&NetBinding> {
        self.bindings.get(&entity)
    }

    pub fn binding_mut(&mut self, entity: NetEntityId) -> Option<&mut NetBinding> {
        self.bindings.get_mut(&entity)
    }

    pub fn add_component<C: NetworkComponent>(
        &mut self,
        entity: NetEntityId,
        component: C,
    ) -> Result<NetComponentId, ReplicationError> {
        self.add_boxed_component(entity, Box::new(component))
    }

    pub fn add_boxed_component(
        &mut self,
        entity: NetEntityId,
        component: Box<dyn NetworkComponent>,
    ) -> Result<NetComponentId, ReplicationError> {
        let binding = self
            .bindings
            .get_mut(&entity)
            .ok_or(ReplicationError::EntityNotFound { entity })?;
        binding.add_component(&self.protocol.component_registry, component)
    }

    pub fn remove_component(
        &mut self,
        entity: NetEntityId,
        component: NetComponentId,
    ) -> Result<Box<dyn NetworkComponent>, ReplicationError> {
        let binding = self
            .bindings
            .get_mut(&entity)
            .ok_or(ReplicationError::EntityNotFound { entity })?;
        binding
            .remove_component(component)
            .ok_or(ReplicationError::ComponentNotFound { entity, component })
    }

    pub fn component<C: NetworkComponent>(&self, entity: NetEntityId) -> Option<&C> {
        self.bindings.get(&entity)?.component::<C>()
    }

    pub fn component_mut<C: NetworkComponent>(&mut self, entity: NetEntityId) -> Option<&mut C> {
        self.bindings.get_mut(&entity)?.component_mut::<C>()
    }

    pub fn set_role(&mut self, entity: NetEntityId, role: RoleState) -> Result<(), ReplicationError> {
        let binding = self
            .bindings
            .get_mut(&entity)
            .ok_or(ReplicationError::EntityNotFound { entity })?;
        binding.try_set_role(role)?;
        Ok(())
    }

    // Migration

    /// Hand an entity over to another host. Its controllers are deactivated
    /// and destructed as a migration, and the binding is removed. Returns the
    /// full-state payload the receiving host passes to
    /// [`ReplicationManager::migrate_in`].
    pub fn migrate_out(&mut self, entity: NetEntityId) -> Result<Vec<u8>, ReplicationError> {
        let binding = self
            .bindings
            .get_mut(&entity)
            .ok_or(ReplicationError::EntityNotFound { entity })?;
        let payload = binding.full_state_payload()?;
        binding.stop_controllers(EntityIsMigrating::True)?;
        self.bindings.remove(&entity);
        info!("Migrated {:?} out ({} bytes of state)", entity, payload.len());
        Ok(payload)
    }

    /// Take over an entity from another host. Components are instantiated
    /// from the hand-off payload, the state is applied, and controllers are
    /// constructed and activated as a migration.
    pub fn migrate_in(
        &mut self,
        entity: NetEntityId,
        role: RoleState,
        payload: &[u8],
    ) -> Result<(), ReplicationError> {
        if self.bindings.contains_key(&entity) {
            return Err(ReplicationError::EntityAlreadyBound { entity });
        }
        let registry = &self.protocol.component_registry;
        let mut binding = NetBinding::new(entity, role, self.protocol.config.strictness);
        let strictness = self.protocol.config.strictness;
        for net_id in NetBinding::scan_payload(entity, payload, registry, strictness)? {
            binding.add_component(registry, registry.create(net_id)?)?;
        }
        binding.apply_state_delta(payload, registry, &mut ReplicationStats::new())?;
        binding.start_controllers(EntityIsMigrating::True)?;
        self.bindings.insert(entity, binding);
        info!("Migrated {:?} in", entity);
        Ok(())
    }

    // Updates

    /// Encode every dirty entity into one packet. Entities that do not fit
    /// in `max_packet_bytes`, or that fail to encode, keep their bits for
    /// the next tick. Returns `None` when there is nothing to send.
    pub fn write_updates(&mut self) -> Option<Vec<u8>> {
        let max_packet_bytes = self.protocol.config.max_packet_bytes;
        let mut writer = BitWriter::with_max_bytes(max_packet_bytes);
        let mut written = 0;
        self.oversized.clear();

        for (entity, binding) in self.bindings.iter_mut() {
            let delta = match binding.prepare_delta() {
                Ok(Some(delta)) => delta,
                Ok(None) => continue,
                Err(error) => {
                    warn!("Skipping update for {:?}: {}", entity, error);
                    continue;
                }
            };

            let length = UnsignedVariableInteger::<7>::new(delta.payload().len() as u64);
            let write_frame = |out: &mut dyn BitWrite| {
                out.write_bit(true);
                length.ser(out);
                out.write_bytes(delta.payload());
            };

            if !fits_empty_packet(max_packet_bytes, &write_frame) {
                warn!(
                    "Update for {:?} is {} bytes and can never fit a {} byte packet",
                    entity,
                    delta.payload().len(),
                    max_packet_bytes
                );
                self.oversized.push(*entity);
                continue;
            }

            let mut counter = writer.counter();
            write_frame(&mut counter);
            // room for the terminating bit
            counter.write_bit(false);
            if counter.overflowed() {
                debug!("Deferring update for {:?}: packet is full", entity);
                continue;
            }

            write_frame(&mut writer);

            binding.commit(&delta);
            self.stats.merge(delta.stats());
            written += 1;
        }

        if written == 0 {
            return None;
        }
        writer.write_bit(false);
        debug!("Wrote updates for {} entities", written);
        Some(writer.to_bytes())
    }

    /// Entities whose pending update was larger than a whole packet on the
    /// last [`ReplicationManager::write_updates`]. They keep their bits but
    /// will not replicate until their delta shrinks or the budget grows.
    pub fn oversized_entities(&self) -> &[NetEntityId] {
        &self.oversized
    }

    pub fn send_updates(&mut self, connection: &mut dyn Connection) {
        if let Some(packet) = self.write_updates() {
            connection.send(packet);
        }
    }

    /// Apply an updates packet. Each entity payload stands alone: one that is
    /// rejected leaves the others untouched. A malformed packet frame ends
    /// the read, after the entities before it have been applied.
    pub fn read_updates(&mut self, packet: &[u8]) -> Result<UpdateReport, SerdeErr> {
        let mut reader = BitReader::new(packet);
        let mut report = UpdateReport::default();

        while reader.read_bit()? {
            let length = UnsignedVariableInteger::<7>::de(&mut reader)?.get();
            let length = usize::try_from(length).map_err(|_| SerdeErr::InvalidValue {
                type_name: "payload length",
                reason: "length exceeds addressable memory",
            })?;
            let payload = reader.read_bytes(length)?;
            let entity = NetEntityId::de(&mut BitReader::new(&payload))?;

            let Some(binding) = self.bindings.get_mut(&entity) else {
                warn!("Dropping update for unknown {:?}", entity);
                report.dropped.push(entity);
                continue;
            };
            match binding.apply_state_delta(&payload, &self.protocol.component_registry, &mut self.stats) {
                Ok(_) => report.applied.push(entity),
                Err(error) => {
                    warn!("Rejected update for {:?}: {}", entity, error);
                    report.failed.push((entity, error));
                }
            }
        }

        Ok(report)
    }

    // RPC

    /// Drain every binding's RPC outbox, in entity order and FIFO within an
    /// entity. RPCs that do not fit are queued again in front of their
    /// outbox; RPCs larger than a whole packet are dropped.
    pub fn write_rpcs(&mut self) -> Option<Vec<u8>> {
        let max_packet_bytes = self.protocol.config.max_packet_bytes;
        let mut writer = BitWriter::with_max_bytes(max_packet_bytes);
        let mut written = 0;

        for binding in self.bindings.values() {
            let outbox = binding.rpc_outbox();
            let mut messages = outbox.drain().into_iter();
            while let Some(message) = messages.next() {
                let write_message = |out: &mut dyn BitWrite| {
                    out.write_bit(true);
                    message.ser(out);
                };

                if !fits_empty_packet(max_packet_bytes, &write_message) {
                    warn!(
                        "Dropping RPC for {:?} on {:?}: {} bytes can never fit a {} byte packet",
                        message.component,
                        message.entity,
                        message.bit_length().div_ceil(8),
                        max_packet_bytes
                    );
                    self.stats.record_rpc_dropped(message.component);
                    continue;
                }

                let mut counter = writer.counter();
                write_message(&mut counter);
                counter.write_bit(false);
                if counter.overflowed() {
                    debug!(
                        "Deferring RPCs of {:?}: packet is full",
                        binding.entity()
                    );
                    let mut remaining = vec![message];
                    remaining.extend(messages.by_ref());
                    outbox.requeue_front(remaining);
                    break;
                }

                write_message(&mut writer);
                self.stats
                    .record_rpc_sent(message.component, message.bit_length().div_ceil(8));
                written += 1;
            }
        }

        if written == 0 {
            return None;
        }
        writer.write_bit(false);
        Some(writer.to_bytes())
    }

    pub fn send_rpcs(&mut self, connection: &mut dyn Connection) {
        if let Some(packet) = self.write_rpcs() {
            connection.send(packet);
        }
    }

    /// Deliver an RPC packet received from `connection`, in order
    pub fn read_rpcs(
        &mut self,
        connection: &dyn Connection,
        packet: &[u8],
    ) -> Result<RpcReport, SerdeErr> {
        let mut reader = BitReader::new(packet);
        let mut report = RpcReport::default();

        while reader.read_bit()? {
            let message = NetworkEntityRpcMessage::de(&mut reader)?;
            self.stats
                .record_rpc_received(message.component, message.bit_length().div_ceil(8));

            let Some(binding) = self.bindings.get_mut(&message.entity) else {
                warn!("Dropping RPC for unknown {:?}", message.entity);
                report.dropped += 1;
                continue;
            };
            match binding.handle_rpc(connection, &message) {
                Ok(true) => report.handled += 1,
                Ok(false) => {
                    debug!(
                        "RPC for {:?} on {:?} was not recognized",
                        message.component, message.entity
                    );
                    report.unrecognized += 1;
                }
                Err(error) => {
                    warn!("Dropping RPC: {}", error);
                    report.dropped += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Whether a frame written by `write`, plus the terminating bit, fits an
/// otherwise empty packet
fn fits_empty_packet(max_packet_bytes: usize, write: &dyn Fn(&mut dyn BitWrite)) -> bool {
    let mut counter = BitWriter::with_max_bytes(max_packet_bytes).counter();
    write(&mut counter);
    counter.write_bit(false);
    !counter.overflowed()
}
