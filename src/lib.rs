#![deny(rust_2018_idioms)]

pub mod app;
pub mod chart;
pub mod domain;
pub mod form;
pub mod io;
pub mod lookup;
#[cfg(feature = "tui")]
pub mod presentation;

pub use app::{FormPage, PageOptions, SubmitOutcome, ValidationReport};
pub use domain::{FormDefinition, definition_schema, load_form_definition, parse_form_definition};
pub use io::{DocumentFormat, parse_document_str, read_document, serialize_value};

pub mod prelude {
    pub use super::app::{FormPage, PageOptions, SubmitOutcome, ValidationReport};
    pub use super::chart::{DataIslands, Palette, build_dashboard};
    pub use super::domain::{FieldKind, FormDefinition, preset};
    pub use super::form::{FieldId, FieldValue, FormCommand, FormError};
    pub use super::lookup::{LookupError, LookupItem, LookupOutcome, LookupTransport};
}
