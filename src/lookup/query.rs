use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::domain::LookupSettings;

/// Characters left as-is in query components.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub term: String,
    pub page: u32,
    pub limit: u32,
    /// Filters contributed by a parent field, appended after the paging keys.
    pub extra: Vec<(String, String)>,
}

impl LookupQuery {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            page: 1,
            limit: LookupSettings::default().limit,
            extra: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("term".to_string(), self.term.clone()),
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        params.extend(self.extra.iter().cloned());
        params
    }
}

/// Per-field search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEndpoint {
    pub url: String,
    pub settings: LookupSettings,
}

impl LookupEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            settings: LookupSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: LookupSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn request_url(&self, query: &LookupQuery) -> String {
        let encoded = query
            .params()
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, QUERY_COMPONENT),
                    utf8_percent_encode(value, QUERY_COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}{encoded}", self.url)
    }
}
