use std::sync::LazyLock;

use jsonschema::JSONSchema;
use serde_json::Value;

use super::contracts::output_schema;

static MIND_MAP_VALIDATOR: LazyLock<Result<JSONSchema, String>> =
    LazyLock::new(|| JSONSchema::compile(&output_schema()).map_err(|err| err.to_string()));

/// Lists every way `payload` departs from the mind map reply shape.
///
/// Used for diagnostics only; replies are relayed to callers whether or not
/// they conform.
pub fn contract_violations(payload: &Value) -> Vec<String> {
    let validator = match MIND_MAP_VALIDATOR.as_ref() {
        Ok(validator) => validator,
        Err(message) => return vec![format!("schema_compile_failed: {message}")],
    };

    match validator.validate(payload) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|err| err.to_string()).collect(),
    }
}
