use crate::domain::MaskSpec;

pub const PHONE_PATTERN: &str = "(00) 9 0000-0000";
pub const CPF_PATTERN: &str = "000.000.000-00";

/// Digit mask for text inputs.
///
/// Pattern tokens: `0` is a required digit slot, `9` an optional digit slot
/// (filled only when the input also covers every required slot), anything
/// else is a literal. Literals are written only while digits remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pattern: String,
}

impl Mask {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn phone() -> Self {
        Self::new(PHONE_PATTERN)
    }

    pub fn cpf() -> Self {
        Self::new(CPF_PATTERN)
    }

    pub fn from_spec(spec: &MaskSpec) -> Self {
        match spec {
            MaskSpec::Phone => Self::phone(),
            MaskSpec::Cpf => Self::cpf(),
            MaskSpec::Pattern(pattern) => Self::new(pattern.clone()),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn apply(&self, raw: &str) -> String {
        let digits = digits_of(raw);
        let required = self.pattern.chars().filter(|token| *token == '0').count();
        let mut optional_budget = digits.len().saturating_sub(required);
        let mut remaining = digits.chars().peekable();
        let mut out = String::with_capacity(self.pattern.len());
        let mut skipped_optional = false;

        for token in self.pattern.chars() {
            if remaining.peek().is_none() {
                break;
            }
            match token {
                '0' => {
                    if let Some(digit) = remaining.next() {
                        out.push(digit);
                    }
                    skipped_optional = false;
                }
                '9' => {
                    if optional_budget > 0 {
                        optional_budget -= 1;
                        if let Some(digit) = remaining.next() {
                            out.push(digit);
                        }
                    } else {
                        skipped_optional = true;
                    }
                }
                literal => {
                    // A skipped optional slot must not leave a doubled separator.
                    if !(skipped_optional && out.ends_with(literal)) {
                        out.push(literal);
                    }
                    skipped_optional = false;
                }
            }
        }
        out
    }

    pub fn unmask(&self, text: &str) -> String {
        digits_of(text)
    }
}

fn digits_of(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}
