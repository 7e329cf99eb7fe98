mod definition;
mod parser;
pub mod preset;

pub use definition::{
    ChoiceOption, DependencyDefinition, FieldDefinition, FieldKind, FormDefinition,
    LookupSettings, MaskSpec, PredicateSpec, SectionDefinition, TargetDefinition,
    VisibilityDefinition,
};
pub use parser::{definition_schema, load_form_definition, parse_form_definition};
