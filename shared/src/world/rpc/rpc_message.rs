use netbind_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr};

use crate::{world::binding::role::NetEntityRole, NetComponentId, NetEntityId};

/// A one-way call addressed to one component of one entity, on hosts that
/// hold the target role.
///
/// Arguments travel as opaque bytes; the receiving component decodes them
/// with [`NetworkEntityRpcMessage::args`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkEntityRpcMessage {
    pub entity: NetEntityId,
    pub component: NetComponentId,
    pub target: NetEntityRole,
    pub data: Vec<u8>,
}

impl NetworkEntityRpcMessage {
    pub fn new(
        entity: NetEntityId,
        component: NetComponentId,
        target: NetEntityRole,
        data: Vec<u8>,
    ) -> Self {
        Self {
            entity,
            component,
            target,
            data,
        }
    }

    pub fn with_args<A: Serde>(
        entity: NetEntityId,
        component: NetComponentId,
        target: NetEntityRole,
        args: &A,
    ) -> Self {
        let mut writer = BitWriter::unbounded();
        args.ser(&mut writer);
        Self::new(entity, component, target, writer.to_bytes())
    }

    pub fn args<A: Serde>(&self) -> Result<A, SerdeErr> {
        let mut reader = BitReader::new(&self.data);
        A::de(&mut reader)
    }
}

impl Serde for NetworkEntityRpcMessage {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.entity.ser(writer);
        self.component.ser(writer);
        self.target.ser(writer);
        self.data.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            entity: NetEntityId::de(reader)?,
            component: NetComponentId::de(reader)?,
            target: NetEntityRole::de(reader)?,
            data: Vec::<u8>::de(reader)?,
        })
    }
}
