use jsonschema::Validator;
use serde_json::Value;

use crate::form::{FieldId, FieldRegistry};

pub const REQUIRED_MESSAGE: &str = "Campo obrigatório";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Annotated fields, in page order.
    pub invalid: Vec<FieldId>,
    /// Problems that could not be attached to a field.
    pub global_errors: Vec<String>,
}

impl ValidationReport {
    pub fn ok(&self) -> bool {
        self.invalid.is_empty() && self.global_errors.is_empty()
    }

    pub fn first_invalid(&self) -> Option<&FieldId> {
        self.invalid.first()
    }

    pub fn issues(&self) -> usize {
        self.invalid.len() + self.global_errors.len()
    }
}

/// Submit gate: every field that is required, enabled and visible must be
/// non-empty. Hidden fields are skipped even when flagged required, so a
/// `FieldKind::Hidden` input or a member of a collapsed block never blocks
/// submission. Previous annotations are cleared first; the first invalid
/// field receives focus.
pub fn validate(registry: &mut FieldRegistry, message: &str) -> ValidationReport {
    registry.clear_errors();
    let mut report = ValidationReport::default();
    for field in registry.iter_mut() {
        if field.is_required() && field.is_enabled() && field.is_visible() && field.is_empty() {
            field.error = Some(message.to_string());
            report.invalid.push(field.id.clone());
        }
    }
    registry.focus(report.first_invalid().cloned());
    report
}

/// Check a built payload against the configured schema. Violations under
/// `/<field id>` annotate that field; anything else is reported globally.
pub fn validate_payload(
    registry: &mut FieldRegistry,
    validator: &Validator,
    payload: &Value,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    for error in validator.iter_errors(payload) {
        let pointer = error.instance_path.to_string();
        let message = error.to_string();
        let target = pointer
            .strip_prefix('/')
            .and_then(|rest| rest.split('/').next())
            .and_then(|segment| registry.resolve_mut(segment));
        match target {
            Some(field) => {
                if field.error.is_none() {
                    field.error = Some(message);
                }
                if !report.invalid.contains(&field.id) {
                    report.invalid.push(field.id.clone());
                }
            }
            None => {
                let prefix = if pointer.is_empty() {
                    "<root>".to_string()
                } else {
                    pointer
                };
                report.global_errors.push(format!("{prefix}: {message}"));
            }
        }
    }
    if registry.focused().is_none() {
        registry.focus(report.first_invalid().cloned());
    }
    report
}
