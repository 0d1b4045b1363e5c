pub mod component_delta;
pub mod property_helper;
pub mod serializer;
pub mod stats;
