/// Failure of one remote lookup. Never retried here; the owning widget
/// shows its "failed to load" state instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    Transport(String),
    Status(u16),
    Decode(String),
    /// The body was neither a list nor an envelope with `results`.
    Shape(String),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupError::Transport(message) => write!(f, "lookup transport failed: {message}"),
            LookupError::Status(code) => write!(f, "lookup endpoint answered with status {code}"),
            LookupError::Decode(message) => write!(f, "lookup response is not JSON: {message}"),
            LookupError::Shape(message) => write!(f, "unexpected lookup response: {message}"),
        }
    }
}

impl std::error::Error for LookupError {}
