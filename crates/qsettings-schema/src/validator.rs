use serde_json::Value;

use crate::error::{Result, SchemaError};

/// JSON Schema (2020-12) describing a settings definition document.
pub const DEFINITION_SCHEMA: &str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "type": "object",
  "required": ["tabs"],
  "properties": {
    "tabs": {
      "type": "array",
      "items": {
        "type": "object",
        "required": ["name", "fields"],
        "properties": {
          "name": { "type": "string" },
          "fields": {
            "type": "array",
            "items": {
              "type": "object",
              "required": ["qsid"],
              "properties": {
                "qsid": { "type": "integer", "minimum": 1, "maximum": 65534 },
                "width": { "enum": [1, 2, 4] },
                "type": { "type": "string" },
                "title": { "type": "string" },
                "bit": { "type": "integer", "minimum": 0, "maximum": 31 },
                "min": { "type": "number" },
                "max": { "type": "number" }
              }
            }
          }
        }
      }
    }
  }
}"#;

/// Check a parsed document against [`DEFINITION_SCHEMA`].
pub(crate) fn validate_document(document: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(DEFINITION_SCHEMA)?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|err| SchemaError::ValidationFailed(format!("schema compile: {err}")))?;

    let mut errors = validator.iter_errors(document);
    if let Some(first) = errors.next() {
        let mut message = first.to_string();
        for err in errors.take(3) {
            message.push_str("; ");
            message.push_str(&err.to_string());
        }
        return Err(SchemaError::ValidationFailed(message));
    }

    Ok(())
}
