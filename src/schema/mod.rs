//! Schema introspection and rendering.

pub mod introspect;
pub mod map;

pub use introspect::introspect;
pub use map::{ColumnDescriptor, SchemaMap, TableSchema};
