//! # Netbind Shared
//! Replication core: dirty-bit records, the delta serialization helper,
//! network components and their controller lifecycle, and the per-entity
//! bindings that move property changes and RPCs across the wire.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

pub use netbind_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, SerdeFloat,
    SerdeInteger, SignedFloat, SignedInteger, SignedVariableFloat, SignedVariableInteger,
    UnsignedFloat, UnsignedInteger, UnsignedVariableInteger, MTU_SIZE_BITS, MTU_SIZE_BYTES,
};

mod config;
mod connection;
mod protocol;
mod types;
mod world;

pub use config::{ReplicationConfig, Strictness};
pub use connection::Connection;
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use types::{ConnectionId, EntityIsMigrating, NetComponentId, NetEntityId, PropertyIndex};
pub use world::{
    binding::{
        error::{ReplicationError, RoleError},
        net_bind_context::{NetBindContext, SiblingDirectory},
        net_binding::{NetBinding, OutboundDelta},
        replication_manager::{ReplicationManager, RpcReport, UpdateReport},
        role::{NetEntityRole, RoleAccessor, RoleHandle, RoleState},
    },
    component::{
        component_core::ComponentCore,
        component_registry::{ComponentDescriptor, ComponentKind, ComponentRegistry, PropertyDecl},
        error::ComponentError,
        network_component::{AsAny, NetworkComponent},
        property::Property,
        property_mutate::PropertyMutator,
    },
    controller::{
        controller_slot::ControllerSlot,
        error::{ControllerError, ControllerOperation, ControllerState},
        network_controller::NetworkController,
    },
    delta::{
        component_delta::ComponentDelta,
        property_helper::serialize_network_property,
        serializer::{ReadSerializer, SerdeValue, Serializer, SerializerMode, WriteSerializer},
        stats::{PropertyStats, ReplicationStats, RpcStats},
    },
    record::{
        diff_mask::DiffMask, error::RecordError, record_mutator::RecordMutator,
        replication_record::ReplicationRecord,
    },
    rpc::{error::RpcError, rpc_message::NetworkEntityRpcMessage, rpc_outbox::RpcOutbox},
};
