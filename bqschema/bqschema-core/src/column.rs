//! Output column model for BigQuery table schemas.

use serde::{Serialize, Serializer};

/// BigQuery column type.
///
/// The fixed vocabulary produced by conversion, plus [`ColumnType::Custom`]
/// for names supplied through a field-level type override.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Float,
    Integer,
    String,
    Bytes,
    Boolean,
    Record,
    Timestamp,
    Custom(String),
}

impl ColumnType {
    /// Parse a type name, falling back to [`ColumnType::Custom`] for anything
    /// outside the built-in vocabulary.
    pub fn from_name(name: &str) -> Self {
        match name {
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "STRING" => Self::String,
            "BYTES" => Self::Bytes,
            "BOOLEAN" => Self::Boolean,
            "RECORD" => Self::Record,
            "TIMESTAMP" => Self::Timestamp,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Float => "FLOAT",
            Self::Integer => "INTEGER",
            Self::String => "STRING",
            Self::Bytes => "BYTES",
            Self::Boolean => "BOOLEAN",
            Self::Record => "RECORD",
            Self::Timestamp => "TIMESTAMP",
            Self::Custom(name) => name,
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// BigQuery column mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Nullable,
    Required,
    Repeated,
}

/// One column of a BigQuery table schema.
///
/// `fields` is non-empty exactly when `column_type` is [`ColumnType::Record`];
/// records with no surviving children are never constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Column>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, mode: Mode) -> Self {
        Self {
            name: name.into(),
            column_type,
            mode,
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Column>) -> Self {
        self.fields = fields;
        self
    }
}

/// Render columns as a pretty-printed JSON array indented by a single space.
pub fn render_schema(columns: &[Column]) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    columns.serialize(&mut serializer)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}
