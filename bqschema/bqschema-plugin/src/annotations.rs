//! Extraction of typed annotations from custom options in a descriptor pool.

use bqschema_core::{Annotations, FieldOptions, MessageAnnotations};
use prost_reflect::{DescriptorPool, DynamicMessage, ExtensionDescriptor, Value};
use tracing::{debug, trace, warn};

use crate::PluginConfig;

struct Extensions {
    event_name: Option<ExtensionDescriptor>,
    event_version: Option<ExtensionDescriptor>,
    field: Option<ExtensionDescriptor>,
    message: Option<ExtensionDescriptor>,
}

impl Extensions {
    fn lookup(pool: &DescriptorPool, config: &PluginConfig) -> Self {
        let find = |name: &str| {
            let found = pool.get_extension_by_name(name);
            if found.is_none() {
                debug!(extension = name, "annotation extension not present in request");
            }
            found
        };
        Self {
            event_name: find(&config.event_name_extension),
            event_version: find(&config.event_version_extension),
            field: find(&config.field_extension),
            message: find(&config.message_extension),
        }
    }
}

/// Collect message and field annotations for every message in `pool`,
/// nested messages included.
pub fn extract_annotations(pool: &DescriptorPool, config: &PluginConfig) -> Annotations {
    let extensions = Extensions::lookup(pool, config);
    let mut annotations = Annotations::new();

    for message in pool.all_messages() {
        let options = message.options();
        let message_annotations = message_annotations(message.full_name(), &options, &extensions);
        if message_annotations != MessageAnnotations::default() {
            trace!(message = message.full_name(), ?message_annotations, "message annotations");
            annotations.insert_message(message.full_name(), message_annotations);
        }

        let Some(field_extension) = &extensions.field else {
            continue;
        };
        for field in message.fields() {
            let options = field.options();
            if !options.has_extension(field_extension) {
                continue;
            }
            let value = options.get_extension(field_extension);
            if let Some(overrides) = value.as_message() {
                annotations.insert_field(message.full_name(), field.name(), field_options(overrides));
            }
        }
    }
    annotations
}

fn message_annotations(
    full_name: &str,
    options: &DynamicMessage,
    extensions: &Extensions,
) -> MessageAnnotations {
    let mut annotations = MessageAnnotations::default();

    if let Some(value) = extension_value(options, extensions.event_name.as_ref()) {
        annotations.event_name = value.as_str().map(str::to_owned);
    }
    if let Some(value) = extension_value(options, extensions.event_version.as_ref()) {
        annotations.event_version = integer(&value);
        if annotations.event_version.is_none() {
            warn!(message = full_name, "ignoring event version {value:?}: not an i64");
        }
    }
    if let Some(value) = extension_value(options, extensions.message.as_ref()) {
        match &value {
            Value::Message(table) => {
                annotations.table_name = string_field(table, "table_name").filter(|n| !n.is_empty());
                annotations.use_json_names = bool_field(table, "use_json_names");
            }
            // Older descriptors declared the table annotation as a plain string.
            Value::String(table_name) => annotations.table_name = Some(table_name.clone()),
            _ => {}
        }
    }
    annotations
}

fn field_options(overrides: &DynamicMessage) -> FieldOptions {
    FieldOptions {
        ignore: bool_field(overrides, "ignore"),
        require: bool_field(overrides, "require"),
        type_override: string_field(overrides, "type_override").unwrap_or_default(),
        name: string_field(overrides, "name").unwrap_or_default(),
        description: string_field(overrides, "description").unwrap_or_default(),
    }
}

fn extension_value(options: &DynamicMessage, extension: Option<&ExtensionDescriptor>) -> Option<Value> {
    let extension = extension?;
    options
        .has_extension(extension)
        .then(|| options.get_extension(extension).into_owned())
}

fn integer(value: &Value) -> Option<i64> {
    match *value {
        Value::I32(v) => Some(i64::from(v)),
        Value::I64(v) => Some(v),
        Value::U32(v) => Some(i64::from(v)),
        Value::U64(v) => i64::try_from(v).ok(),
        _ => None,
    }
}

fn string_field(message: &DynamicMessage, name: &str) -> Option<String> {
    message
        .get_field_by_name(name)
        .and_then(|value| value.as_str().map(str::to_owned))
}

fn bool_field(message: &DynamicMessage, name: &str) -> bool {
    message
        .get_field_by_name(name)
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}
