// Record types, their metadata, and the registry that exposes them

pub mod descriptor;
pub mod registry;
pub mod traits;

pub use descriptor::{AttributeDef, Cardinality, RelationDef, TypeDescriptor, ValueDomain};
pub use registry::Registry;
pub use traits::{Record, Resource};
