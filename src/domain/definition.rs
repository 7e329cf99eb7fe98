use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declarative description of one form page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Submission target; only recorded, the payload is posted by the host.
    #[serde(default)]
    pub action: Option<String>,
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub dependencies: Vec<DependencyDefinition>,
    #[serde(default)]
    pub visibility: Vec<VisibilityDefinition>,
    #[serde(default)]
    pub sections: Vec<SectionDefinition>,
    /// JSON Schema checked against the submitted payload after the
    /// required-field gate passes.
    #[serde(default)]
    pub payload_schema: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Checkbox,
    Radio,
    Select,
    MultiSelect,
    /// Remote search-as-you-type single selection.
    Lookup,
    Hidden,
}

impl FieldKind {
    pub fn is_choice(self) -> bool {
        matches!(self, FieldKind::Radio | FieldKind::Select | FieldKind::Lookup)
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio => "radio",
            FieldKind::Select => "select",
            FieldKind::MultiSelect => "multi_select",
            FieldKind::Lookup => "lookup",
            FieldKind::Hidden => "hidden",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaskSpec {
    Phone,
    Cpf,
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDefinition {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub mask: Option<MaskSpec>,
    /// Endpoint queried by lookup fields.
    #[serde(default)]
    pub autocomplete_url: Option<String>,
    #[serde(default)]
    pub lookup: Option<LookupSettings>,
    #[serde(default)]
    pub initial: Option<Value>,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: None,
            kind,
            required: false,
            disabled: false,
            placeholder: None,
            options: Vec::new(),
            mask: None,
            autocomplete_url: None,
            lookup: None,
            initial: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<ChoiceOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_mask(mut self, mask: MaskSpec) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_autocomplete(mut self, url: impl Into<String>) -> Self {
        self.autocomplete_url = Some(url.into());
        self
    }

    pub fn with_initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LookupSettings {
    #[serde(default = "default_page_size")]
    pub limit: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub min_input: usize,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            limit: default_page_size(),
            delay_ms: default_delay_ms(),
            min_input: 0,
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_delay_ms() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DependencyDefinition {
    pub child: String,
    pub parent: String,
    /// Query key that carries the parent's value on every child lookup.
    pub filter_key: String,
    #[serde(default)]
    pub placeholder_enabled: Option<String>,
    #[serde(default)]
    pub placeholder_disabled: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum PredicateSpec {
    Checked,
    Unchecked,
    Filled,
    OneOf { values: Vec<String> },
    NoneOf { values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VisibilityDefinition {
    pub driver: String,
    pub predicate: PredicateSpec,
    #[serde(default)]
    pub block: Option<String>,
    pub targets: Vec<TargetDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TargetDefinition {
    pub field: String,
    #[serde(default)]
    pub required_when_shown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SectionDefinition {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Hidden field that records the open state (`on` or empty).
    #[serde(default)]
    pub marker: Option<String>,
    pub fields: Vec<String>,
}
