use std::borrow::Borrow;
use std::fmt;

use serde_json::Value;

use crate::domain::{ChoiceOption, FieldDefinition, FieldKind};
use crate::lookup::LookupItem;

use super::{error::FormError, mask::Mask};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
    Choice(Option<String>),
    Multi(Vec<String>),
}

impl FieldValue {
    pub fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Hidden => {
                FieldValue::Text(String::new())
            }
            FieldKind::Checkbox => FieldValue::Checked(false),
            FieldKind::Radio | FieldKind::Select | FieldKind::Lookup => FieldValue::Choice(None),
            FieldKind::MultiSelect => FieldValue::Multi(Vec::new()),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        FieldValue::Choice(Some(value.into()))
    }

    /// Emptiness as seen by the submit gate: unchecked boxes, unselected
    /// choices, empty multi selections and blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Checked(checked) => !checked,
            FieldValue::Choice(choice) => choice
                .as_deref()
                .map(|value| value.trim().is_empty())
                .unwrap_or(true),
            FieldValue::Multi(values) => values.is_empty(),
        }
    }

    /// Single scalar view used by predicates and lookup filters.
    pub fn scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            FieldValue::Choice(choice) => choice.as_deref(),
            FieldValue::Checked(_) | FieldValue::Multi(_) => None,
        }
    }

    fn accepts(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (
                FieldValue::Text(_),
                FieldKind::Text | FieldKind::Textarea | FieldKind::Hidden
            ) | (FieldValue::Checked(_), FieldKind::Checkbox)
                | (
                    FieldValue::Choice(_),
                    FieldKind::Radio | FieldKind::Select | FieldKind::Lookup
                )
                | (FieldValue::Multi(_), FieldKind::MultiSelect)
        )
    }

    pub fn from_json(kind: FieldKind, value: &Value) -> Result<Self, String> {
        match kind {
            FieldKind::Text | FieldKind::Textarea | FieldKind::Hidden => match value {
                Value::Null => Ok(FieldValue::Text(String::new())),
                Value::String(text) => Ok(FieldValue::Text(text.clone())),
                Value::Number(num) => Ok(FieldValue::Text(num.to_string())),
                other => Err(format!("expected text, found {other}")),
            },
            FieldKind::Checkbox => match value {
                Value::Null => Ok(FieldValue::Checked(false)),
                Value::Bool(flag) => Ok(FieldValue::Checked(*flag)),
                Value::String(text) => match text.as_str() {
                    "on" | "true" => Ok(FieldValue::Checked(true)),
                    "" | "off" | "false" => Ok(FieldValue::Checked(false)),
                    _ => Err(format!("'{text}' is not a checkbox state")),
                },
                other => Err(format!("expected a checkbox state, found {other}")),
            },
            FieldKind::Radio | FieldKind::Select | FieldKind::Lookup => match value {
                Value::Null => Ok(FieldValue::Choice(None)),
                Value::String(text) if text.is_empty() => Ok(FieldValue::Choice(None)),
                Value::String(text) => Ok(FieldValue::Choice(Some(text.clone()))),
                Value::Number(num) => Ok(FieldValue::Choice(Some(num.to_string()))),
                other => Err(format!("expected a single choice, found {other}")),
            },
            FieldKind::MultiSelect => match value {
                Value::Null => Ok(FieldValue::Multi(Vec::new())),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(text) => Ok(text.clone()),
                        Value::Number(num) => Ok(num.to_string()),
                        other => Err(format!("'{other}' is not a valid choice")),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(FieldValue::Multi),
                other => Err(format!("expected a list of choices, found {other}")),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(text) => Value::String(text.clone()),
            FieldValue::Checked(flag) => Value::Bool(*flag),
            FieldValue::Choice(Some(choice)) => Value::String(choice.clone()),
            FieldValue::Choice(None) => Value::Null,
            FieldValue::Multi(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// Declarative control state. Controllers compute a desired `FieldState`
/// and hand it to `FieldHandle::reconcile`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub visible: bool,
    pub required: bool,
    pub enabled: bool,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LookupStatus {
    #[default]
    Idle,
    Searching,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FieldHandle {
    pub id: FieldId,
    pub kind: FieldKind,
    pub label: String,
    state: FieldState,
    declared_required: bool,
    declared_disabled: bool,
    pub placeholder: Option<String>,
    pub choices: Vec<ChoiceOption>,
    pub mask: Option<Mask>,
    pub error: Option<String>,
    pub dirty: bool,
    pub options: Vec<LookupItem>,
    pub has_more: bool,
    pub lookup_status: LookupStatus,
    pub selected_label: Option<String>,
}

impl FieldHandle {
    pub fn new(id: impl Into<FieldId>, kind: FieldKind) -> Self {
        let id = id.into();
        Self {
            label: id.to_string(),
            id,
            kind,
            state: FieldState {
                visible: kind != FieldKind::Hidden,
                required: false,
                enabled: true,
                value: FieldValue::empty_for(kind),
            },
            declared_required: false,
            declared_disabled: false,
            placeholder: None,
            choices: Vec::new(),
            mask: None,
            error: None,
            dirty: false,
            options: Vec::new(),
            has_more: false,
            lookup_status: LookupStatus::Idle,
            selected_label: None,
        }
    }

    pub fn from_definition(definition: &FieldDefinition) -> Result<Self, FormError> {
        let mut handle = Self::new(definition.id.as_str(), definition.kind);
        if let Some(label) = &definition.label {
            handle.label = label.clone();
        }
        handle.state.required = definition.required;
        handle.state.enabled = !definition.disabled;
        handle.declared_required = definition.required;
        handle.declared_disabled = definition.disabled;
        handle.placeholder = definition.placeholder.clone();
        handle.choices = definition.options.clone();
        handle.mask = definition.mask.as_ref().map(Mask::from_spec);
        if let Some(initial) = &definition.initial {
            let value = FieldValue::from_json(definition.kind, initial).map_err(|message| {
                FormError::ValueMismatch {
                    field: handle.id.clone(),
                    message,
                }
            })?;
            handle.write_value(value)?;
            handle.dirty = false;
        }
        Ok(handle)
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.state.required = required;
        self.declared_required = required;
        self
    }

    pub fn with_choices(mut self, choices: Vec<ChoiceOption>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn value(&self) -> &FieldValue {
        &self.state.value
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn is_required(&self) -> bool {
        self.state.required
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    pub fn is_empty(&self) -> bool {
        self.state.value.is_empty()
    }

    /// Whether the field was declared required in its definition.
    pub fn declared_required(&self) -> bool {
        self.declared_required
    }

    /// Whether the definition locks the field regardless of its parent.
    pub fn declared_disabled(&self) -> bool {
        self.declared_disabled
    }

    /// Apply a desired state. Returns true when anything changed; applying
    /// the same state twice is a no-op the second time.
    pub fn reconcile(&mut self, desired: FieldState) -> bool {
        if self.state == desired {
            return false;
        }
        let value_changed = self.state.value != desired.value;
        self.state = desired;
        if value_changed && self.state.value.is_empty() {
            self.selected_label = None;
        }
        true
    }

    /// Store a user-provided value, formatting masked text on the way in.
    /// Returns true when the stored value changed.
    pub fn set_value(&mut self, value: FieldValue) -> Result<bool, FormError> {
        let changed = self.write_value(value)?;
        if changed {
            self.dirty = true;
        }
        Ok(changed)
    }

    pub fn clear_value(&mut self) -> bool {
        let empty = FieldValue::empty_for(self.kind);
        let changed = self.state.value != empty;
        self.state.value = empty;
        self.selected_label = None;
        changed
    }

    /// Forget remote options and any selection label.
    pub fn reset_lookup(&mut self) {
        self.options.clear();
        self.has_more = false;
        self.lookup_status = LookupStatus::Idle;
        self.selected_label = None;
    }

    /// Value as posted on submit; masks are stripped.
    pub fn submitted_value(&self) -> Option<Value> {
        match (&self.state.value, &self.mask) {
            (FieldValue::Text(text), Some(mask)) => Some(Value::String(mask.unmask(text))),
            (FieldValue::Choice(None), _) => None,
            (value, _) => Some(value.to_json()),
        }
    }

    pub fn display_value(&self) -> String {
        match &self.state.value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Checked(flag) => flag.to_string(),
            FieldValue::Choice(None) => String::new(),
            FieldValue::Choice(Some(choice)) => self
                .selected_label
                .clone()
                .or_else(|| {
                    self.choices
                        .iter()
                        .find(|option| &option.value == choice)
                        .map(|option| option.label.clone())
                })
                .unwrap_or_else(|| choice.clone()),
            FieldValue::Multi(values) => format!("[{}]", values.join(", ")),
        }
    }

    fn write_value(&mut self, value: FieldValue) -> Result<bool, FormError> {
        if !value.accepts(self.kind) {
            return Err(FormError::ValueMismatch {
                field: self.id.clone(),
                message: format!("value {value:?} does not fit a {} field", self.kind.label()),
            });
        }
        let value = match value {
            FieldValue::Text(text) => match &self.mask {
                Some(mask) => FieldValue::Text(mask.apply(&text)),
                None => FieldValue::Text(text),
            },
            FieldValue::Choice(Some(choice)) if !self.choices.is_empty() => {
                if !choice.is_empty() && !self.choices.iter().any(|option| option.value == choice)
                {
                    return Err(FormError::ValueMismatch {
                        field: self.id.clone(),
                        message: format!("'{choice}' is not one of the offered options"),
                    });
                }
                FieldValue::Choice(Some(choice))
            }
            FieldValue::Multi(values) if !self.choices.is_empty() => {
                if let Some(unknown) = values
                    .iter()
                    .find(|value| !self.choices.iter().any(|option| &option.value == *value))
                {
                    return Err(FormError::ValueMismatch {
                        field: self.id.clone(),
                        message: format!("'{unknown}' is not one of the offered options"),
                    });
                }
                FieldValue::Multi(values)
            }
            other => other,
        };
        if self.state.value == value {
            return Ok(false);
        }
        if self.state.value.scalar() != value.scalar() {
            self.selected_label = None;
        }
        self.state.value = value;
        Ok(true)
    }
}
