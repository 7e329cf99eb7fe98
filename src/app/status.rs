#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    message: String,
}

pub const READY_STATUS: &str = "Pronto.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }

    pub fn ready(&mut self) {
        self.message = READY_STATUS.to_string();
    }

    pub fn value_updated(&mut self, label: &str) {
        self.message = format!("{label} atualizado");
    }

    pub fn searching(&mut self, label: &str, searching: &str) {
        self.message = format!("{label}: {searching}");
    }

    pub fn lookup_failed(&mut self, label: &str, error_loading: &str) {
        self.message = format!("{label}: {error_loading}");
    }

    pub fn validation_passed(&mut self) {
        self.message = "Formulário válido".to_string();
    }

    pub fn issues_remaining(&mut self, count: usize) {
        self.message = format!("{count} campo(s) com problema");
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
