use jsonschema::Validator;
use serde_json::Value;

use crate::error::{CatalogError, Result};

pub(crate) const SIGNAL_LIST_SCHEMA: &str = r##"{
    "$schema": "https://json-schema.org/draft/2020-12/schema",
    "title": "sigbus signal list",
    "type": "object",
    "required": ["version", "signals"],
    "additionalProperties": false,
    "properties": {
        "version": { "type": "integer" },
        "signals": {
            "type": "array",
            "items": { "$ref": "#/$defs/signal" }
        }
    },
    "$defs": {
        "signal": {
            "type": "object",
            "required": ["cat_id", "sub_id", "name", "timeout"],
            "additionalProperties": false,
            "properties": {
                "cat_id": { "type": "integer", "minimum": 0, "maximum": 255 },
                "sub_id": { "type": "integer", "minimum": 0, "maximum": 255 },
                "name": { "type": "string", "minLength": 1 },
                "description": { "type": "string" },
                "timeout": { "type": "integer", "minimum": 0, "maximum": 4294967295 },
                "type": { "enum": ["fixed", "integer", "buffer"] },
                "units": { "type": "string" },
                "resolution": {
                    "oneOf": [
                        { "type": "number" },
                        { "type": "string" }
                    ]
                },
                "length": { "type": "integer", "minimum": 0, "maximum": 4096 }
            }
        }
    }
}"##;

pub(crate) fn compile() -> Result<Validator> {
    let schema: Value = serde_json::from_str(SIGNAL_LIST_SCHEMA)?;
    jsonschema::validator_for(&schema).map_err(|err| CatalogError::ValidationFailed(err.to_string()))
}

pub(crate) fn validate_document(value: &Value) -> Result<()> {
    let validator = compile()?;

    let mut errors = validator.iter_errors(value);
    if let Some(first) = errors.next() {
        let mut message = first.to_string();
        for err in errors.take(3) {
            message.push_str("; ");
            message.push_str(&err.to_string());
        }
        return Err(CatalogError::ValidationFailed(message));
    }

    Ok(())
}
