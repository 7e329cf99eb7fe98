use anyhow::{Context, Result, anyhow, bail};
use jsonschema::validator_for;
use schemars::schema_for;
use serde_json::Value;

use crate::io::{DocumentFormat, parse_document_str};

use super::definition::FormDefinition;

/// JSON Schema describing a valid `FormDefinition` document.
pub fn definition_schema() -> Result<Value> {
    serde_json::to_value(schema_for!(FormDefinition))
        .context("failed to serialize form definition schema")
}

/// Check a raw document against the definition schema, then deserialize it.
pub fn parse_form_definition(value: &Value) -> Result<FormDefinition> {
    let schema = definition_schema()?;
    let validator =
        validator_for(&schema).map_err(|err| anyhow!("invalid definition schema: {err}"))?;

    let issues = validator
        .iter_errors(value)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            let prefix = if pointer.is_empty() {
                "<root>".to_string()
            } else {
                pointer
            };
            format!("{prefix}: {error}")
        })
        .collect::<Vec<_>>();
    if !issues.is_empty() {
        bail!("form definition is invalid:\n  {}", issues.join("\n  "));
    }

    serde_json::from_value(value.clone()).context("failed to decode form definition")
}

/// Parse a definition document in any supported format.
pub fn load_form_definition(contents: &str, format: DocumentFormat) -> Result<FormDefinition> {
    let value = parse_document_str(contents, format)?;
    parse_form_definition(&value)
}
