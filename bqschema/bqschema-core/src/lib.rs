//! Protobuf message descriptors to BigQuery table schemas.
//!
//! Conversion runs in two passes. [`register_files`] first loads every
//! message of the batch into a [`Namespace`]; [`generate_file`] then converts
//! the annotated messages of each requested file, resolving record fields
//! through [`Namespace::resolve`].

mod column;
mod convert;
mod error;
mod generate;
mod namespace;
mod options;
mod registrar;
mod resolver;

pub use column::{Column, ColumnType, Mode, render_schema};
pub use convert::{convert_message, mode_from_label, type_from_kind, well_known_type};
pub use error::ConvertError;
pub use generate::{GeneratedSchema, generate_file, schema_path};
pub use namespace::{Namespace, PackageId};
pub use options::{Annotations, FieldOptions, MessageAnnotations, MessageOptions, message_options};
pub use registrar::register_files;
pub use resolver::ResolvedType;
