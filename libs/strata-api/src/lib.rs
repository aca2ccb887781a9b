pub mod accessor;
pub mod error;
pub mod format;
pub mod schema;
pub mod stats;
pub mod value;

pub use accessor::{FieldRef, StructAccessor, as_record};
pub use error::{ErrorKind, PluginError};
pub use format::{
    FormatBackend, LoadError, Loader, MAX_NESTING, SerializedFormat, SerializedRecord,
    ValueWriter, WriteError,
};
pub use schema::{Field, PrimitiveKind, Schema, TypeNode};
pub use stats::DecodeStats;
pub use value::{HierarchicalValue, Row, shape_name};
