//! protoc plugin boundary for `bqschema-core`.
//!
//! [`generate_from_bytes`] takes the serialized `CodeGeneratorRequest` protoc
//! writes to a plugin's stdin and returns the `CodeGeneratorResponse` holding
//! one `.schema` file per annotated message. Annotations are read from custom
//! options through [`prost_reflect`], with extension names taken from
//! [`PluginConfig`].

mod annotations;
mod config;
mod error;
mod generator;
mod request;

pub use annotations::extract_annotations;
pub use config::PluginConfig;
pub use error::PluginError;
pub use generator::{error_response, generate, generate_from_bytes};
pub use request::PluginRequest;
