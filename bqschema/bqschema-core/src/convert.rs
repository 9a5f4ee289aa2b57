//! Recursive conversion of message descriptors into BigQuery columns.

use prost_types::{
    DescriptorProto, FieldDescriptorProto,
    field_descriptor_proto::{Label, Type},
};
use tracing::{error, trace};

use crate::{
    Annotations, Column, ColumnType, ConvertError, MessageOptions, Mode, Namespace, PackageId,
};

/// Map a raw cardinality label to a column mode. An absent label is optional.
pub fn mode_from_label(label: Option<i32>) -> Result<Mode, ConvertError> {
    let Some(raw) = label else {
        return Ok(Mode::Nullable);
    };
    match Label::try_from(raw) {
        Ok(Label::Optional) => Ok(Mode::Nullable),
        Ok(Label::Required) => Ok(Mode::Required),
        Ok(Label::Repeated) => Ok(Mode::Repeated),
        Err(_) => Err(ConvertError::UnrecognizedLabel(raw)),
    }
}

/// Map a raw field kind to its base column type.
pub fn type_from_kind(kind: Option<i32>) -> Result<ColumnType, ConvertError> {
    let raw = kind.unwrap_or_default();
    let kind = Type::try_from(raw).map_err(|_| ConvertError::UnrecognizedKind(raw))?;
    let column_type = match kind {
        Type::Double | Type::Float => ColumnType::Float,
        Type::Int64
        | Type::Uint64
        | Type::Int32
        | Type::Uint32
        | Type::Fixed64
        | Type::Fixed32
        | Type::Sfixed32
        | Type::Sfixed64
        | Type::Sint32
        | Type::Sint64 => ColumnType::Integer,
        Type::String | Type::Enum => ColumnType::String,
        Type::Bytes => ColumnType::Bytes,
        Type::Bool => ColumnType::Boolean,
        Type::Group | Type::Message => ColumnType::Record,
    };
    Ok(column_type)
}

/// Scalar column type for the well-known wrapper and temporal messages.
pub fn well_known_type(type_name: &str) -> Option<ColumnType> {
    let column_type = match type_name {
        ".google.protobuf.Int32Value"
        | ".google.protobuf.Int64Value"
        | ".google.protobuf.UInt32Value"
        | ".google.protobuf.UInt64Value" => ColumnType::Integer,
        ".google.protobuf.DoubleValue" | ".google.protobuf.FloatValue" => ColumnType::Float,
        ".google.protobuf.BoolValue" => ColumnType::Boolean,
        ".google.protobuf.StringValue" | ".google.protobuf.Duration" => ColumnType::String,
        ".google.protobuf.BytesValue" => ColumnType::Bytes,
        ".google.protobuf.Timestamp" => ColumnType::Timestamp,
        _ => return None,
    };
    Some(column_type)
}

/// Convert the fields of `message` into columns.
///
/// `package` is the package `message` is declared in and serves as the scope
/// for relative type references; `full_name` is its fully-qualified name.
/// Record fields are expanded recursively using the nested message's own
/// options. A message that reappears on its own expansion path fails with
/// [`ConvertError::CyclicType`]. Failures are wrapped in
/// [`ConvertError::Field`] once per enclosing field.
pub fn convert_message(
    namespace: &Namespace<'_>,
    annotations: &Annotations,
    package: PackageId,
    full_name: &str,
    message: &DescriptorProto,
    options: &MessageOptions,
) -> Result<Vec<Column>, ConvertError> {
    let mut converter = Converter {
        namespace,
        annotations,
        active: Vec::new(),
    };
    converter.message(package, full_name, message, options)
}

struct Converter<'c, 'a> {
    namespace: &'c Namespace<'a>,
    annotations: &'c Annotations,
    /// Fully-qualified names currently being expanded.
    active: Vec<String>,
}

impl Converter<'_, '_> {
    fn message(
        &mut self,
        package: PackageId,
        full_name: &str,
        message: &DescriptorProto,
        options: &MessageOptions,
    ) -> Result<Vec<Column>, ConvertError> {
        if self.active.iter().any(|name| name == full_name) {
            let mut path = self.active.clone();
            path.push(full_name.to_string());
            return Err(ConvertError::CyclicType {
                full_name: full_name.to_string(),
                path: path.join(" -> "),
            });
        }

        trace!(message = full_name, "converting message");
        self.active.push(full_name.to_string());
        let mut columns = Vec::with_capacity(message.field.len());
        for field in &message.field {
            match self.field(package, full_name, field, options) {
                Ok(Some(column)) => columns.push(column),
                Ok(None) => {}
                Err(err) => {
                    error!(
                        field = field.name(),
                        message = full_name,
                        "failed to convert field: {}",
                        err.root_cause()
                    );
                    return Err(ConvertError::Field {
                        message: full_name.to_string(),
                        field: field.name().to_string(),
                        source: Box::new(err),
                    });
                }
            }
        }
        self.active.pop();
        Ok(columns)
    }

    /// Convert one field; `Ok(None)` means the field is omitted.
    fn field(
        &mut self,
        package: PackageId,
        message_name: &str,
        field: &FieldDescriptorProto,
        options: &MessageOptions,
    ) -> Result<Option<Column>, ConvertError> {
        let mut name = if options.use_json_names && !field.json_name().is_empty() {
            field.json_name()
        } else {
            field.name()
        }
        .to_string();
        let mut mode = mode_from_label(field.label)?;
        let mut column_type = type_from_kind(field.r#type)?;
        let mut description = None;

        if let Some(overrides) = self.annotations.field(message_name, field.name()) {
            if overrides.ignore {
                return Ok(None);
            }
            if overrides.require {
                mode = Mode::Required;
            }
            if !overrides.type_override.is_empty() {
                column_type = ColumnType::from_name(&overrides.type_override);
            }
            if !overrides.name.is_empty() {
                name = overrides.name.clone();
            }
            if !overrides.description.is_empty() {
                description = Some(overrides.description.clone());
            }
        }

        let column = Column::new(name, column_type, mode).with_description(description);
        if column.column_type != ColumnType::Record {
            return Ok(Some(column));
        }
        if let Some(scalar) = well_known_type(field.type_name()) {
            return Ok(Some(Column {
                column_type: scalar,
                ..column
            }));
        }

        let record = self
            .namespace
            .resolve(package, field.type_name())
            .ok_or_else(|| ConvertError::UnresolvedType {
                reference: field.type_name().to_string(),
            })?;
        let record_options = self
            .annotations
            .message_options(&record.full_name)
            .unwrap_or_default();
        let fields = self.message(
            record.package,
            &record.full_name,
            record.message,
            &record_options,
        )?;

        // A record with nothing left inside is dropped.
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(column.with_fields(fields)))
    }
}
