use super::field::FieldId;

/// Structural problems detected while wiring a page or applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    UnknownField(FieldId),
    DuplicateField(FieldId),
    /// A rule references a field that is not declared on the page.
    DanglingReference { rule: String, field: FieldId },
    SelfDependency(FieldId),
    DependencyCycle(Vec<FieldId>),
    /// A section member that a visibility rule also shows and hides.
    ConflictingControl { field: FieldId, section: String },
    ValueMismatch { field: FieldId, message: String },
    FieldDisabled(FieldId),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::UnknownField(id) => write!(f, "unknown field '{id}'"),
            FormError::DuplicateField(id) => write!(f, "field '{id}' is declared twice"),
            FormError::DanglingReference { rule, field } => {
                write!(f, "{rule} references unknown field '{field}'")
            }
            FormError::SelfDependency(id) => write!(f, "field '{id}' depends on itself"),
            FormError::DependencyCycle(path) => {
                let chain = path
                    .iter()
                    .map(FieldId::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                write!(f, "dependency cycle: {chain}")
            }
            FormError::ConflictingControl { field, section } => write!(
                f,
                "field '{field}' is controlled by both section '{section}' and a visibility rule"
            ),
            FormError::ValueMismatch { field, message } => write!(f, "{field}: {message}"),
            FormError::FieldDisabled(id) => write!(f, "field '{id}' is disabled"),
        }
    }
}

impl std::error::Error for FormError {}
