//! Error types for the protoc plugin boundary.

use bqschema_core::ConvertError;

/// Errors produced while handling a code generation request.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The request bytes are not a valid `CodeGeneratorRequest`.
    #[error("failed to decode code generation request: {0}")]
    RequestDecode(#[from] prost::DecodeError),

    /// The plugin parameter string could not be parsed.
    #[error("invalid plugin parameter '{parameter}': {detail}")]
    InvalidParameter { parameter: String, detail: String },

    /// A file listed in `file_to_generate` has no descriptor in the request.
    #[error("requested file '{file}' not found in request")]
    FileNotFound { file: String },

    /// Converting a requested file failed.
    #[error("Failed to convert {file}: {source}")]
    Convert {
        file: String,
        #[source]
        source: ConvertError,
    },
}
