use std::borrow::Cow;

use crate::lookup::{KeyChain, LookupMessages};

use super::validation::REQUIRED_MESSAGE;

/// Offset kept above the first invalid field when scrolling it into view.
pub const DEFAULT_SCROLL_MARGIN: u16 = 120;

#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Editing a field drops its error annotation immediately instead of
    /// waiting for the next submit.
    pub clear_errors_on_edit: bool,
    pub required_message: Cow<'static, str>,
    pub lookup_messages: LookupMessages,
    pub keys: KeyChain,
    /// Reject rules that reference undeclared fields instead of skipping them.
    pub strict: bool,
    pub scroll_margin: u16,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            clear_errors_on_edit: false,
            required_message: Cow::Borrowed(REQUIRED_MESSAGE),
            lookup_messages: LookupMessages::default(),
            keys: KeyChain::default(),
            strict: false,
            scroll_margin: DEFAULT_SCROLL_MARGIN,
        }
    }
}

impl PageOptions {
    pub fn with_clear_errors_on_edit(mut self, enabled: bool) -> Self {
        self.clear_errors_on_edit = enabled;
        self
    }

    pub fn with_required_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.required_message = message.into();
        self
    }

    pub fn with_lookup_messages(mut self, messages: LookupMessages) -> Self {
        self.lookup_messages = messages;
        self
    }

    pub fn with_keys(mut self, keys: KeyChain) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_scroll_margin(mut self, margin: u16) -> Self {
        self.scroll_margin = margin;
        self
    }
}
