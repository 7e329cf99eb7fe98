use crate::lookup::LookupItem;

use super::field::{FieldId, FieldValue};

#[derive(Debug, Clone)]
pub enum FormCommand {
    SetValue { field: FieldId, value: FieldValue },
    Clear { field: FieldId },
    /// Pick one of the options returned by the last lookup.
    SelectOption { field: FieldId, item: LookupItem },
    ToggleSection { section: String },
}
