pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
mod path;
pub mod schema_parser;
pub mod type_parser;
pub mod validate;

pub use codec::Codec;
pub use config::SerDeConfig;
pub use error::{DecodeError, EncodeError, EngineError, SchemaError};
pub use schema_parser::parse_schema;
