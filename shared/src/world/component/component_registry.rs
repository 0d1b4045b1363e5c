use std::{any::TypeId, collections::HashMap};

use crate::{NetComponentId, PropertyIndex};

use super::{error::ComponentError, network_component::NetworkComponent};

/// Type-level identity of a component, used to find its registration
#[derive(Eq, Hash, Copy, Clone, PartialEq, Debug)]
pub struct ComponentKind {
    type_id: TypeId,
}

impl From<TypeId> for ComponentKind {
    fn from(type_id: TypeId) -> Self {
        Self { type_id }
    }
}

impl ComponentKind {
    pub fn of<C: NetworkComponent>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
        }
    }
}

/// Declaration of one replicated property
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: &'static str,
    pub predictable: bool,
}

impl PropertyDecl {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            predictable: false,
        }
    }

    pub const fn predictable(name: &'static str) -> Self {
        Self {
            name,
            predictable: true,
        }
    }
}

/// Everything the registry knows about one component type
#[derive(Clone)]
pub struct ComponentDescriptor {
    pub name: &'static str,
    pub properties: &'static [PropertyDecl],
    factory: fn() -> Box<dyn NetworkComponent>,
}

impl ComponentDescriptor {
    pub fn property_count(&self) -> u8 {
        // bounded at registration
        self.properties.len() as u8
    }

    pub fn property(&self, index: PropertyIndex) -> Option<&PropertyDecl> {
        self.properties.get(index as usize)
    }
}

fn build<C: NetworkComponent + Default>() -> Box<dyn NetworkComponent> {
    Box::new(C::default())
}

/// Registration table assigning stable [`NetComponentId`]s to component
/// types, in the order they are added
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    kind_map: HashMap<ComponentKind, NetComponentId>,
    descriptors: Vec<ComponentDescriptor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component<C: NetworkComponent + Default>(
        &mut self,
    ) -> Result<NetComponentId, ComponentError> {
        let kind = ComponentKind::of::<C>();
        let prototype = C::default();
        let name = prototype.name();
        let properties = prototype.properties();

        if self.kind_map.contains_key(&kind) {
            return Err(ComponentError::DuplicateComponent {
                component_name: name,
            });
        }
        if properties.len() > PropertyIndex::MAX as usize {
            return Err(ComponentError::TooManyProperties {
                component_name: name,
                property_count: properties.len(),
                max: PropertyIndex::MAX as usize,
            });
        }
        let net_id = u16::try_from(self.descriptors.len())
            .map_err(|_| ComponentError::RegistryFull)?;
        let net_id = NetComponentId::new(net_id);

        self.kind_map.insert(kind, net_id);
        self.descriptors.push(ComponentDescriptor {
            name,
            properties,
            factory: build::<C>,
        });
        Ok(net_id)
    }

    pub fn kind_to_net_id(&self, kind: &ComponentKind) -> Option<NetComponentId> {
        self.kind_map.get(kind).copied()
    }

    pub fn net_id_of<C: NetworkComponent>(&self) -> Option<NetComponentId> {
        self.kind_to_net_id(&ComponentKind::of::<C>())
    }

    pub fn descriptor(&self, net_id: NetComponentId) -> Option<&ComponentDescriptor> {
        self.descriptors.get(net_id.to_u16() as usize)
    }

    /// A fresh, unattached instance of the component type registered under
    /// `net_id`
    pub fn create(&self, net_id: NetComponentId) -> Result<Box<dyn NetworkComponent>, ComponentError> {
        let descriptor = self.descriptor(net_id).ok_or(ComponentError::NetIdNotFound {
            net_id: net_id.to_u16(),
        })?;
        let mut component = (descriptor.factory)();
        component.core_mut().set_net_component_id(net_id);
        Ok(component)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
