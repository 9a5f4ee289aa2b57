//! Plugin configuration read from the protoc `parameter` string.

use crate::PluginError;

/// Fully-qualified names of the extensions that carry schema annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// String extension on `MessageOptions` naming the event.
    pub event_name_extension: String,
    /// Integer extension on `MessageOptions` carrying the event version.
    pub event_version_extension: String,
    /// Message extension on `FieldOptions` with per-field overrides.
    pub field_extension: String,
    /// Message extension on `MessageOptions` with table-level settings.
    pub message_extension: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            event_name_extension: "faceit.tracking.v1.event_name".to_string(),
            event_version_extension: "faceit.tracking.v1.event_version".to_string(),
            field_extension: "gen_bq_schema.bigquery".to_string(),
            message_extension: "gen_bq_schema.bigquery_opts".to_string(),
        }
    }
}

impl PluginConfig {
    /// Parse comma-separated `key=value` pairs on top of the defaults.
    ///
    /// ```text
    /// --bq-schema_opt=event_name_extension=acme.events.name,event_version_extension=acme.events.version
    /// ```
    pub fn from_parameter(parameter: &str) -> Result<Self, PluginError> {
        let mut config = Self::default();
        let invalid = |detail: String| PluginError::InvalidParameter {
            parameter: parameter.to_string(),
            detail,
        };

        for pair in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected key=value, got '{pair}'")))?;
            let slot = match key.trim() {
                "event_name_extension" => &mut config.event_name_extension,
                "event_version_extension" => &mut config.event_version_extension,
                "field_extension" => &mut config.field_extension,
                "message_extension" => &mut config.message_extension,
                other => return Err(invalid(format!("unknown key '{other}'"))),
            };
            *slot = value.trim().trim_start_matches('.').to_string();
        }
        Ok(config)
    }
}
