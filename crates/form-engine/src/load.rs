//! Structural checking of raw definition documents.

use jsonschema::Validator;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::DefinitionError;
use crate::spec::FormDefinition;

static DEFINITION_SCHEMA: Lazy<Result<Value, String>> = Lazy::new(|| {
    serde_json::to_value(schemars::schema_for!(FormDefinition)).map_err(|err| err.to_string())
});

static VALIDATOR: Lazy<Result<Validator, String>> = Lazy::new(|| {
    let schema = DEFINITION_SCHEMA.as_ref().map_err(Clone::clone)?;
    jsonschema::validator_for(schema).map_err(|err| err.to_string())
});

/// JSON Schema every definition document must satisfy.
pub fn definition_schema() -> Result<&'static Value, DefinitionError> {
    DEFINITION_SCHEMA
        .as_ref()
        .map_err(|err| DefinitionError::SchemaUnavailable(err.clone()))
}

/// Checks `raw` against the definition schema, reporting every violation.
/// An unavailable schema fails every check.
pub(crate) fn check_structure(raw: &Value) -> Result<(), DefinitionError> {
    let validator = VALIDATOR
        .as_ref()
        .map_err(|err| DefinitionError::SchemaUnavailable(err.clone()))?;
    if validator.is_valid(raw) {
        return Ok(());
    }
    let violations = validator
        .iter_errors(raw)
        .map(|err| err.to_string())
        .collect();
    Err(DefinitionError::Structure { violations })
}

/// Parses and structurally checks a definition document.
pub(crate) fn parse_definition(mut raw: Value) -> Result<FormDefinition, DefinitionError> {
    accept_aliases(&mut raw);
    check_structure(&raw)?;
    Ok(serde_json::from_value(raw)?)
}

/// Conditions may carry their expression as `valueExpression`; the derived
/// schema only knows `value`.
fn accept_aliases(raw: &mut Value) {
    let Some(Value::Array(conditions)) = raw.get_mut("conditions") else {
        return;
    };
    for condition in conditions.iter_mut().filter_map(Value::as_object_mut) {
        if condition.contains_key("value") {
            continue;
        }
        if let Some(expression) = condition.remove("valueExpression") {
            condition.insert("value".into(), expression);
        }
    }
}
