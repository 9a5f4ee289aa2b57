//! Second pass: turn each qualifying message of a requested file into a
//! schema document.

use prost_types::FileDescriptorProto;
use tracing::{debug, error};

use crate::{
    Annotations, ConvertError, Namespace, convert_message, namespace::qualify, render_schema,
};

/// One generated `.schema` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSchema {
    /// `<package/as/dirs>/<table_name>.schema`.
    pub path: String,
    /// Pretty-printed JSON array of columns.
    pub content: String,
}

/// Output path for a table: the package with `.` replaced by `/`, then
/// `<table_name>.schema`. Tables in the root package have no directory.
pub fn schema_path(package: &str, table_name: &str) -> String {
    if package.is_empty() {
        format!("{table_name}.schema")
    } else {
        format!("{}/{table_name}.schema", package.replace('.', "/"))
    }
}

/// Generate schemas for every qualifying top-level message of `file`.
///
/// Messages without table options are skipped. Must run after all input files
/// have been registered in `namespace`.
pub fn generate_file(
    namespace: &Namespace<'_>,
    annotations: &Annotations,
    file: &FileDescriptorProto,
) -> Result<Vec<GeneratedSchema>, ConvertError> {
    let package_name = file.package();
    let package = namespace
        .lookup_package(package_name)
        .ok_or_else(|| ConvertError::PackageNotFound {
            package: package_name.to_string(),
        })?;
    let package_path = namespace.path(package);

    let mut generated = Vec::new();
    for message in &file.message_type {
        let full_name = qualify(package_path, message.name());
        let Some(options) = annotations.message_options(&full_name) else {
            continue;
        };

        debug!(message = %full_name, table = %options.table_name, "generating schema");
        let columns =
            convert_message(namespace, annotations, package, &full_name, message, &options)
                .inspect_err(|err| {
                    error!(file = file.name(), "failed to convert {full_name}: {err}")
                })?;
        generated.push(GeneratedSchema {
            path: schema_path(package_path, &options.table_name),
            content: render_schema(&columns)?,
        });
    }
    Ok(generated)
}
