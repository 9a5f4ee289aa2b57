//! Typed message and field annotations, and the policy deciding which
//! messages become tables.

use std::collections::HashMap;

/// Message-level annotations as decoded from custom options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageAnnotations {
    pub event_name: Option<String>,
    pub event_version: Option<i64>,
    /// Table name from the older single-string form of the table annotation.
    /// Decoded for compatibility only; [`message_options`] does not read it.
    pub table_name: Option<String>,
    /// Emit fields under their JSON name instead of their declared name.
    pub use_json_names: bool,
}

/// Field-level overrides. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
    /// Omit the field from the schema.
    pub ignore: bool,
    /// Force the column mode to `REQUIRED`.
    pub require: bool,
    pub type_override: String,
    pub name: String,
    pub description: String,
}

/// Options in effect while converting one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOptions {
    /// `<event_name>_v<event_version>`; empty for messages that are only
    /// converted as nested records.
    pub table_name: String,
    pub use_json_names: bool,
}

/// Derive table options for a message.
///
/// A message qualifies only when it has a non-empty event name and an event
/// version; otherwise it is skipped without error.
pub fn message_options(annotations: &MessageAnnotations) -> Option<MessageOptions> {
    let event_name = annotations.event_name.as_deref().filter(|n| !n.is_empty())?;
    let event_version = annotations.event_version?;
    Some(MessageOptions {
        table_name: format!("{event_name}_v{event_version}"),
        use_json_names: annotations.use_json_names,
    })
}

/// Annotation store for one batch, keyed by fully-qualified message name
/// without a leading dot.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    messages: HashMap<String, MessageAnnotations>,
    fields: HashMap<(String, String), FieldOptions>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_message(&mut self, full_name: impl Into<String>, annotations: MessageAnnotations) {
        self.messages.insert(full_name.into(), annotations);
    }

    pub fn insert_field(
        &mut self,
        message_full_name: impl Into<String>,
        field_name: impl Into<String>,
        options: FieldOptions,
    ) {
        self.fields
            .insert((message_full_name.into(), field_name.into()), options);
    }

    pub fn message(&self, full_name: &str) -> Option<&MessageAnnotations> {
        self.messages.get(full_name)
    }

    pub fn field(&self, message_full_name: &str, field_name: &str) -> Option<&FieldOptions> {
        self.fields
            .get(&(message_full_name.to_string(), field_name.to_string()))
    }

    /// Table options for `full_name`, or `None` if the message does not qualify.
    pub fn message_options(&self, full_name: &str) -> Option<MessageOptions> {
        self.message(full_name).and_then(message_options)
    }
}
