mod error;
mod messages;
mod normalize;
mod query;
mod tracker;
mod transport;

pub use error::LookupError;
pub use messages::LookupMessages;
pub use normalize::{ID_KEYS, KeyChain, LABEL_KEYS, LookupItem, LookupPage, normalize_response};
pub use query::{LookupEndpoint, LookupQuery};
pub use tracker::{LookupTicket, LookupTracker};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::LookupTransport;

/// Remote lookup adapter: builds the request for an endpoint, performs it
/// through a transport and normalizes the body.
#[derive(Debug, Clone)]
pub struct LookupAdapter {
    pub endpoint: LookupEndpoint,
    pub keys: KeyChain,
}

impl LookupAdapter {
    pub fn new(endpoint: LookupEndpoint) -> Self {
        Self {
            endpoint,
            keys: KeyChain::default(),
        }
    }

    pub fn with_keys(mut self, keys: KeyChain) -> Self {
        self.keys = keys;
        self
    }

    pub fn query(
        &self,
        transport: &dyn LookupTransport,
        query: &LookupQuery,
    ) -> Result<LookupPage, LookupError> {
        let body = transport.fetch(&self.endpoint.request_url(query))?;
        self.keys.normalize(&body)
    }
}

/// A lookup that has been issued and awaits its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub ticket: LookupTicket,
    pub url: String,
    pub query: LookupQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Applied { results: usize, has_more: bool },
    /// The response arrived after a newer request or a parent change.
    Discarded,
    /// No request was made (parent unset, field disabled or no endpoint).
    Skipped,
    Failed(LookupError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn adapter_fetches_and_normalizes() {
        let seen = RefCell::new(Vec::new());
        let transport = |url: &str| -> Result<serde_json::Value, LookupError> {
            seen.borrow_mut().push(url.to_string());
            Ok(json!({"results": [{"id": 3, "nome": "Cardiologia"}], "pagination": {"more": false}}))
        };
        let adapter = LookupAdapter::new(LookupEndpoint::new("/api/esp/"));
        let page = adapter
            .query(&transport, &LookupQuery::new("card"))
            .unwrap();
        assert_eq!(page.results, vec![LookupItem::new("3", "Cardiologia")]);
        assert_eq!(seen.borrow().as_slice(), ["/api/esp/?term=card&page=1&limit=10"]);
    }

    #[test]
    fn adapter_surfaces_transport_failure() {
        let transport =
            |_: &str| -> Result<serde_json::Value, LookupError> { Err(LookupError::Status(503)) };
        let adapter = LookupAdapter::new(LookupEndpoint::new("/api/esp/"));
        let err = adapter
            .query(&transport, &LookupQuery::new("x"))
            .unwrap_err();
        assert_eq!(err, LookupError::Status(503));
    }
}
