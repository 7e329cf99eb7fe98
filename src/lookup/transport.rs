use serde_json::Value;

use super::error::LookupError;

/// Performs the HTTP GET for a fully built lookup URL.
pub trait LookupTransport {
    fn fetch(&self, url: &str) -> Result<Value, LookupError>;
}

impl<F> LookupTransport for F
where
    F: Fn(&str) -> Result<Value, LookupError>,
{
    fn fetch(&self, url: &str) -> Result<Value, LookupError> {
        self(url)
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use reqwest::blocking::Client;
    use serde_json::Value;

    use super::{LookupError, LookupTransport};

    /// Blocking transport; relative endpoint URLs are joined onto `base_url`.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: Client,
        base_url: Option<String>,
    }

    impl HttpTransport {
        pub fn new() -> Self {
            Self {
                client: Client::new(),
                base_url: None,
            }
        }

        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = Some(base_url.into());
            self
        }

        fn absolute(&self, url: &str) -> String {
            match &self.base_url {
                Some(base) if url.starts_with('/') => {
                    format!("{}{url}", base.trim_end_matches('/'))
                }
                _ => url.to_string(),
            }
        }
    }

    impl Default for HttpTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LookupTransport for HttpTransport {
        fn fetch(&self, url: &str) -> Result<Value, LookupError> {
            let url = self.absolute(url);
            tracing::debug!(%url, "issuing lookup request");
            let response = self
                .client
                .get(&url)
                .header("accept", "application/json")
                .send()
                .map_err(|err| LookupError::Transport(err.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(LookupError::Status(status.as_u16()));
            }
            response
                .json::<Value>()
                .map_err(|err| LookupError::Decode(err.to_string()))
        }
    }
}
