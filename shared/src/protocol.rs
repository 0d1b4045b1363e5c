use crate::{
    world::component::{component_registry::ComponentRegistry, network_component::NetworkComponent},
    ReplicationConfig, Strictness,
};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

/// Everything two hosts must agree on before replicating: the registered
/// component types, in registration order, and the session configuration
#[derive(Clone, Default)]
pub struct Protocol {
    pub component_registry: ComponentRegistry,
    pub config: ReplicationConfig,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    /// # Panics
    ///
    /// Panics if the protocol is locked or the component cannot be
    /// registered.
    /// Consider using `try_add_component` for non-panicking error handling.
    pub fn add_component<C: NetworkComponent + Default>(&mut self) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.component_registry.add_component::<C>() {
            panic!("{}", error);
        }
        self
    }

    pub fn strictness(&mut self, strictness: Strictness) -> &mut Self {
        self.check_lock();
        self.config.strictness = strictness;
        self
    }

    pub fn max_packet_bytes(&mut self, max_packet_bytes: usize) -> &mut Self {
        self.check_lock();
        self.config.max_packet_bytes = max_packet_bytes;
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_add_component<C: NetworkComponent + Default>(
        &mut self,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.component_registry.add_component::<C>()?;
        Ok(self)
    }

    pub fn try_strictness(&mut self, strictness: Strictness) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.config.strictness = strictness;
        Ok(self)
    }

    pub fn try_max_packet_bytes(&mut self, max_packet_bytes: usize) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.config.max_packet_bytes = max_packet_bytes;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
