use netbind_serde::{
    BitReader, BitWrite, ConstBitLength, Serde, SerdeErr, UnsignedVariableInteger,
};

/// Ordinal of a replicated property within its component type
pub type PropertyIndex = u8;

/// Identifies a replicated entity across every host that knows about it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetEntityId(u64);

impl NetEntityId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn to_u64(self) -> u64 {
        self.0
    }
}

impl Serde for NetEntityId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = UnsignedVariableInteger::<7>::de(reader)?.get();
        let id = u64::try_from(value).map_err(|_| SerdeErr::InvalidValue {
            type_name: "NetEntityId",
            reason: "identifier exceeds 64 bits",
        })?;
        Ok(Self(id))
    }
}

/// Identifies a component *type*, assigned at registration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetComponentId(u16);

impl NetComponentId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn to_u16(self) -> u16 {
        self.0
    }
}

impl Serde for NetComponentId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u16::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        Self::const_bit_length()
    }
}

impl ConstBitLength for NetComponentId {
    fn const_bit_length() -> u32 {
        u16::const_bit_length()
    }
}

/// Identifies a connection to a remote host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u32);

impl ConnectionId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn to_u32(self) -> u32 {
        self.0
    }
}

/// Whether a controller transition is part of an authority hand-over
/// between hosts, rather than a fresh spawn or a final removal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityIsMigrating {
    False,
    True,
}

impl EntityIsMigrating {
    pub fn is_migrating(self) -> bool {
        self == EntityIsMigrating::True
    }
}

impl From<bool> for EntityIsMigrating {
    fn from(migrating: bool) -> Self {
        if migrating {
            EntityIsMigrating::True
        } else {
            EntityIsMigrating::False
        }
    }
}
