use std::sync::{Arc, RwLock, Weak};

use netbind_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr, UnsignedInteger};

use super::error::RoleError;

/// What a host is, relative to one replicated entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetEntityRole {
    /// Simulates the entity; its state is the source of truth
    Authority,
    /// Locally controls the entity without simulating it
    Autonomous,
    /// Server-side replica of an entity simulated elsewhere
    Server,
    /// Client-side replica
    Client,
}

impl NetEntityRole {
    fn to_bits(self) -> u8 {
        match self {
            NetEntityRole::Authority => 0,
            NetEntityRole::Autonomous => 1,
            NetEntityRole::Server => 2,
            NetEntityRole::Client => 3,
        }
    }

    /// Whether controllers run on a host holding this role
    pub fn runs_controllers(self) -> bool {
        matches!(self, NetEntityRole::Authority | NetEntityRole::Autonomous)
    }
}

impl Serde for NetEntityRole {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedInteger::<2>::new(self.to_bits()).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match UnsignedInteger::<2>::de(reader)?.get() {
            0 => Ok(NetEntityRole::Authority),
            1 => Ok(NetEntityRole::Autonomous),
            2 => Ok(NetEntityRole::Server),
            3 => Ok(NetEntityRole::Client),
            _ => Err(SerdeErr::InvalidValue {
                type_name: "NetEntityRole",
                reason: "role out of range",
            }),
        }
    }

    fn bit_length(&self) -> u32 {
        Self::const_bit_length()
    }
}

impl ConstBitLength for NetEntityRole {
    fn const_bit_length() -> u32 {
        2
    }
}

/// A binding's role, plus whether the authority also controls the entity
/// locally
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleState {
    role: NetEntityRole,
    allow_autonomy: bool,
}

impl RoleState {
    pub fn new(role: NetEntityRole) -> Self {
        Self {
            role,
            allow_autonomy: false,
        }
    }

    /// An authority that is also the locally controlling host
    pub fn autonomous_authority() -> Self {
        Self {
            role: NetEntityRole::Authority,
            allow_autonomy: true,
        }
    }

    pub fn role(&self) -> NetEntityRole {
        self.role
    }

    pub fn allows_autonomy(&self) -> bool {
        self.allow_autonomy
    }

    pub fn is_authority(&self) -> bool {
        self.role == NetEntityRole::Authority
    }

    pub fn is_autonomous(&self) -> bool {
        self.role == NetEntityRole::Autonomous
            || (self.role == NetEntityRole::Authority && self.allow_autonomy)
    }

    pub fn is_server(&self) -> bool {
        self.role == NetEntityRole::Server
    }

    pub fn is_client(&self) -> bool {
        self.role == NetEntityRole::Client
    }

    /// Whether traffic addressed to `role` is meant for this host
    pub fn holds(&self, role: NetEntityRole) -> bool {
        match role {
            NetEntityRole::Authority => self.is_authority(),
            NetEntityRole::Autonomous => self.is_autonomous(),
            NetEntityRole::Server => self.is_server(),
            NetEntityRole::Client => self.is_client(),
        }
    }
}

/// Owning side of a binding's role. Dropping it invalidates every
/// [`RoleAccessor`] handed out.
pub struct RoleHandle {
    state: Arc<RwLock<RoleState>>,
}

impl RoleHandle {
    pub fn new(state: RoleState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn accessor(&self) -> RoleAccessor {
        RoleAccessor {
            state: Arc::downgrade(&self.state),
        }
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_get` for non-panicking error handling.
    pub fn get(&self) -> RoleState {
        self.try_get().expect("Lock on RoleState is poisoned")
    }

    pub fn try_get(&self) -> Result<RoleState, RoleError> {
        Ok(*self.state.read().map_err(|_| RoleError::LockPoisoned)?)
    }

    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_set` for non-panicking error handling.
    pub fn set(&self, state: RoleState) {
        self.try_set(state).expect("Lock on RoleState is poisoned")
    }

    pub fn try_set(&self, state: RoleState) -> Result<(), RoleError> {
        *self.state.write().map_err(|_| RoleError::LockPoisoned)? = state;
        Ok(())
    }
}

/// Read-only view of a binding's role, held by components
#[derive(Clone)]
pub struct RoleAccessor {
    state: Weak<RwLock<RoleState>>,
}

impl RoleAccessor {
    pub fn try_role_state(&self) -> Result<RoleState, RoleError> {
        let state = self.state.upgrade().ok_or(RoleError::BindingDestroyed)?;
        let guard = state.read().map_err(|_| RoleError::LockPoisoned)?;
        Ok(*guard)
    }

    pub fn try_role(&self) -> Result<NetEntityRole, RoleError> {
        Ok(self.try_role_state()?.role())
    }

    pub fn try_is_authority(&self) -> Result<bool, RoleError> {
        Ok(self.try_role_state()?.is_authority())
    }

    pub fn try_is_autonomous(&self) -> Result<bool, RoleError> {
        Ok(self.try_role_state()?.is_autonomous())
    }

    pub fn try_is_server(&self) -> Result<bool, RoleError> {
        Ok(self.try_role_state()?.is_server())
    }

    pub fn try_is_client(&self) -> Result<bool, RoleError> {
        Ok(self.try_role_state()?.is_client())
    }

    /// # Panics
    ///
    /// Panics if the binding has been destroyed.
    /// Consider using `try_is_authority` for non-panicking error handling.
    pub fn is_authority(&self) -> bool {
        self.try_is_authority()
            .expect("Role queried after its binding was destroyed")
    }

    /// # Panics
    ///
    /// Panics if the binding has been destroyed.
    /// Consider using `try_is_autonomous` for non-panicking error handling.
    pub fn is_autonomous(&self) -> bool {
        self.try_is_autonomous()
            .expect("Role queried after its binding was destroyed")
    }

    /// # Panics
    ///
    /// Panics if the binding has been destroyed.
    /// Consider using `try_is_server` for non-panicking error handling.
    pub fn is_server(&self) -> bool {
        self.try_is_server()
            .expect("Role queried after its binding was destroyed")
    }

    /// # Panics
    ///
    /// Panics if the binding has been destroyed.
    /// Consider using `try_is_client` for non-panicking error handling.
    pub fn is_client(&self) -> bool {
        self.try_is_client()
            .expect("Role queried after its binding was destroyed")
    }
}
