//! Model metadata: column descriptors, model descriptors, operations, registry.

pub mod column;
pub mod descriptor;
pub mod registry;

pub use column::*;
pub use descriptor::*;
pub use registry::*;
