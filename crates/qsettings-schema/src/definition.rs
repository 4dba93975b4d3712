use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::LoadConfig;
use crate::error::{Result, SchemaError};
use crate::projection::SchemaProjection;
use crate::validator::validate_document;

/// The full settings definition: every setting QMK knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDefinition {
    pub tabs: Vec<Tab>,
}

/// A group of related settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub name: String,
    pub fields: Vec<Field>,
}

/// One configurable field.
///
/// Boolean fields may share a QSID, each naming one `bit` of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub qsid: u32,
    /// Declared width in bytes; absent means one byte.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Field {
    /// A field with only a QSID and declared width.
    pub fn new(qsid: u32, width: Option<u8>) -> Self {
        Self {
            qsid,
            width,
            title: None,
            kind: None,
            bit: None,
            min: None,
            max: None,
        }
    }
}

impl SettingsDefinition {
    /// Parse a definition from a JSON string with default config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_str_with_config(json, &LoadConfig::default())
    }

    /// Parse a definition from a JSON string.
    pub fn from_json_str_with_config(json: &str, config: &LoadConfig) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_value(document, config)
    }

    /// Build a definition from an already parsed document.
    pub fn from_value(document: Value, config: &LoadConfig) -> Result<Self> {
        if config.validate {
            validate_document(&document)?;
        }
        let definition: Self = serde_json::from_value(document)?;
        debug!(
            tabs = definition.tabs.len(),
            fields = definition.field_count(),
            "settings definition parsed"
        );
        Ok(definition)
    }

    /// Load a definition file with default config.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_with_config(path, &LoadConfig::default())
    }

    /// Load a definition file.
    pub fn from_path_with_config(path: &Path, config: &LoadConfig) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

        let read_limit = u64::try_from(config.max_file_size.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
        if content.len() > config.max_file_size {
            return Err(SchemaError::LoadFailed(format!(
                "{}: file exceeds {} bytes",
                path.display(),
                config.max_file_size
            )));
        }

        Self::from_json_str_with_config(&content, config)
    }

    /// Total number of fields across all tabs.
    pub fn field_count(&self) -> usize {
        self.tabs.iter().map(|tab| tab.fields.len()).sum()
    }

    /// Flatten into the QSID → width lookup.
    pub fn projection(&self) -> Result<SchemaProjection> {
        SchemaProjection::from_definition(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "tabs": [
            {
                "name": "Grave Escape",
                "fields": [
                    { "type": "boolean", "title": "Always send Escape if Alt is pressed", "qsid": 1, "bit": 0 },
                    { "type": "boolean", "title": "Always send Escape if Control is pressed", "qsid": 1, "bit": 1 }
                ]
            },
            {
                "name": "Tap-Hold",
                "fields": [
                    { "type": "integer", "title": "Tapping Term", "qsid": 7, "min": 0, "max": 10000, "width": 2 },
                    { "type": "integer", "title": "Mouse key delay", "qsid": 9, "width": 4 }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_vial_style_definition() {
        let def = SettingsDefinition::from_json_str(SAMPLE).unwrap();
        assert_eq!(def.tabs.len(), 2);
        assert_eq!(def.field_count(), 4);
        assert_eq!(def.tabs[0].fields[1].bit, Some(1));
        assert_eq!(def.tabs[1].fields[0].kind.as_deref(), Some("integer"));
        assert_eq!(def.tabs[1].fields[0].width, Some(2));
    }

    #[test]
    fn validation_can_be_disabled() {
        let json = r#"{ "tabs": [{ "name": "x", "fields": [{ "qsid": 3, "width": 8 }] }] }"#;
        assert!(matches!(
            SettingsDefinition::from_json_str(json),
            Err(SchemaError::ValidationFailed(_))
        ));

        let config = LoadConfig {
            validate: false,
            ..LoadConfig::default()
        };
        let def = SettingsDefinition::from_json_str_with_config(json, &config).unwrap();
        assert!(matches!(
            def.projection(),
            Err(SchemaError::InvalidWidth { qsid: 3, width: 8 })
        ));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            SettingsDefinition::from_json_str("{ tabs"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn from_path_enforces_size_limit() {
        let dir = std::env::temp_dir().join(format!("qsettings-def-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("qmk_settings.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let def = SettingsDefinition::from_path(&path).unwrap();
        assert_eq!(def.field_count(), 4);

        let tight = LoadConfig {
            max_file_size: 16,
            ..LoadConfig::default()
        };
        assert!(matches!(
            SettingsDefinition::from_path_with_config(&path, &tight),
            Err(SchemaError::LoadFailed(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_load_failure() {
        let err = SettingsDefinition::from_path(Path::new("/nonexistent/qmk_settings.json"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::LoadFailed(_)));
    }
}
