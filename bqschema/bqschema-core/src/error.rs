//! Error types for schema conversion.

/// Error returned while converting message descriptors into table schemas.
///
/// Every variant describes malformed or unresolvable input and aborts
/// generation for the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A field carried a cardinality label outside optional/required/repeated.
    #[error("unrecognized field label: {0}")]
    UnrecognizedLabel(i32),

    /// A field carried a kind with no column type mapping.
    #[error("unrecognized field type: {0}")]
    UnrecognizedKind(i32),

    /// A message-typed field referenced a type that is not registered.
    #[error("no such message type named {reference}")]
    UnresolvedType { reference: String },

    /// A message contains itself, directly or through other records.
    #[error("cyclic message type {full_name} (expansion path: {path})")]
    CyclicType { full_name: String, path: String },

    /// A requested file declared a package that was never registered.
    #[error("no such package found: {package}")]
    PackageNotFound { package: String },

    /// Converting a field failed; wraps the cause with the field's location.
    #[error("field {field} in {message}: {source}")]
    Field {
        message: String,
        field: String,
        #[source]
        source: Box<ConvertError>,
    },

    /// The resolved columns could not be rendered as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// The innermost error, with every field context stripped.
    pub fn root_cause(&self) -> &ConvertError {
        match self {
            Self::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
