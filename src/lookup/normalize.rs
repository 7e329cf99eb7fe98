use serde::Serialize;
use serde_json::Value;

use super::error::LookupError;

/// Keys tried, in order, for a record's identifier. Older endpoints expose
/// `codigo`, `cod_especialidade` or `matricula` instead of `id`.
pub const ID_KEYS: [&str; 4] = ["id", "codigo", "cod_especialidade", "matricula"];
/// Keys tried, in order, for a record's display label. `label` is only a
/// last resort for endpoints that expose none of the usual keys.
pub const LABEL_KEYS: [&str; 4] = ["text", "nome", "nome_especialidade", "label"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupItem {
    pub id: String,
    pub label: String,
}

impl LookupItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LookupPage {
    pub results: Vec<LookupItem>,
    pub has_more: bool,
}

/// Ordered fallback lists used to map heterogeneous records onto
/// `LookupItem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChain {
    pub id_keys: Vec<String>,
    pub label_keys: Vec<String>,
}

impl Default for KeyChain {
    fn default() -> Self {
        Self {
            id_keys: ID_KEYS.iter().map(|key| key.to_string()).collect(),
            label_keys: LABEL_KEYS.iter().map(|key| key.to_string()).collect(),
        }
    }
}

impl KeyChain {
    /// Accepts a bare list of records, an envelope
    /// `{results: [...], pagination: {more}}`, or `null` (no results).
    pub fn normalize(&self, body: &Value) -> Result<LookupPage, LookupError> {
        let (records, has_more) = match body {
            Value::Null => return Ok(LookupPage::default()),
            Value::Array(records) => (records, false),
            Value::Object(envelope) => match envelope.get("results") {
                Some(Value::Array(records)) => (records, more_flag(envelope.get("pagination"))),
                Some(Value::Null) | None => {
                    return Err(LookupError::Shape(
                        "object without a `results` list".to_string(),
                    ));
                }
                Some(other) => {
                    return Err(LookupError::Shape(format!(
                        "`results` must be a list, found {other}"
                    )));
                }
            },
            other => {
                return Err(LookupError::Shape(format!(
                    "expected a list of records, found {other}"
                )));
            }
        };

        let results = records
            .iter()
            .filter_map(|record| match record {
                Value::Object(_) => Some(LookupItem {
                    id: first_present(record, &self.id_keys),
                    label: first_present(record, &self.label_keys),
                }),
                other => {
                    tracing::debug!(record = %other, "skipping non-object lookup record");
                    None
                }
            })
            .collect();

        Ok(LookupPage { results, has_more })
    }
}

pub fn normalize_response(body: &Value) -> Result<LookupPage, LookupError> {
    KeyChain::default().normalize(body)
}

/// First non-null value under `keys`, stringified; empty when none match.
fn first_present(record: &Value, keys: &[String]) -> String {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find(|value| !value.is_null())
        .map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn more_flag(pagination: Option<&Value>) -> bool {
    match pagination.and_then(|value| value.get("more")) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(num)) => num.as_f64().is_some_and(|value| value != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_plain_list_with_legacy_keys() {
        let body = json!([
            {"cod_especialidade": 12, "nome_especialidade": "Ortopedia"},
            {"codigo": "A1", "nome": "Artroscopia"},
            {"matricula": 990, "text": "Dra. Ana"}
        ]);
        let page = normalize_response(&body).unwrap();
        assert_eq!(
            page.results,
            vec![
                LookupItem::new("12", "Ortopedia"),
                LookupItem::new("A1", "Artroscopia"),
                LookupItem::new("990", "Dra. Ana"),
            ]
        );
        assert!(!page.has_more);
    }

    #[test]
    fn envelope_reports_more_pages() {
        let body = json!({
            "results": [{"id": 1, "text": "Um"}],
            "pagination": {"more": true}
        });
        let page = normalize_response(&body).unwrap();
        assert_eq!(page.results, vec![LookupItem::new("1", "Um")]);
        assert!(page.has_more);
    }

    #[test]
    fn null_values_fall_through_the_chain() {
        let body = json!([{"id": null, "codigo": 5, "nome": "Cinco"}]);
        let page = normalize_response(&body).unwrap();
        assert_eq!(page.results[0].id, "5");
    }

    #[test]
    fn text_wins_over_label() {
        let page = normalize_response(&json!([
            {"id": 1, "label": "Rótulo", "text": "Texto"},
            {"id": 2, "label": "Só rótulo"}
        ]))
        .unwrap();
        assert_eq!(
            page.results,
            vec![LookupItem::new("1", "Texto"), LookupItem::new("2", "Só rótulo")]
        );
    }

    #[test]
    fn missing_keys_become_empty_strings() {
        let page = normalize_response(&json!([{"outro": 1}])).unwrap();
        assert_eq!(page.results, vec![LookupItem::new("", "")]);
    }

    #[test]
    fn rejects_unrecognized_shapes() {
        assert!(matches!(
            normalize_response(&json!({"items": []})),
            Err(LookupError::Shape(_))
        ));
        assert!(matches!(
            normalize_response(&json!("erro")),
            Err(LookupError::Shape(_))
        ));
        assert_eq!(normalize_response(&Value::Null).unwrap(), LookupPage::default());
    }

    #[test]
    fn custom_chain_overrides_defaults() {
        let chain = KeyChain {
            id_keys: vec!["cns".into()],
            label_keys: vec!["nome_paciente".into()],
        };
        let page = chain
            .normalize(&json!([{"cns": "700", "nome_paciente": "Maria", "id": 1}]))
            .unwrap();
        assert_eq!(page.results, vec![LookupItem::new("700", "Maria")]);
    }
}
