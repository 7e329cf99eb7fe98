pub mod controller;
mod options;
mod page;
mod status;
mod validation;

pub use options::{DEFAULT_SCROLL_MARGIN, PageOptions};
pub use page::{FormPage, ScrollRequest, SubmitOutcome};
pub use status::{READY_STATUS, StatusLine};
pub use validation::{REQUIRED_MESSAGE, ValidationReport, validate, validate_payload};
