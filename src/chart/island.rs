use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").expect("invalid script tag pattern")
});

static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bid\s*=\s*["']([^"']+)["']"#).expect("invalid id attribute pattern")
});

static JSON_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\btype\s*=\s*["']application/json["']"#).expect("invalid type pattern")
});

/// JSON payloads embedded in a rendered page, keyed by element id.
///
/// Lookups never fail: an island that is absent, empty, `null` or
/// malformed reads as "no data".
#[derive(Debug, Clone, Default)]
pub struct DataIslands {
    islands: IndexMap<String, Value>,
    /// Element ids present on the page; `None` when built from a plain map,
    /// in which case every canvas counts as present.
    elements: Option<HashSet<String>>,
}

impl DataIslands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract every `<script type="application/json" id="…">` payload and
    /// remember all element ids so canvases can be checked.
    pub fn from_html(html: &str) -> Self {
        let mut islands = IndexMap::new();
        for captures in SCRIPT_TAG.captures_iter(html) {
            let attrs = captures.get(1).map_or("", |m| m.as_str());
            if !JSON_TYPE.is_match(attrs) {
                continue;
            }
            let Some(id) = ID_ATTR.captures(attrs).and_then(|c| c.get(1)) else {
                continue;
            };
            let body = captures.get(2).map_or("", |m| m.as_str()).trim();
            if body.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(body) {
                Ok(value) => {
                    islands.insert(id.as_str().to_string(), value);
                }
                Err(err) => {
                    tracing::warn!(island = id.as_str(), error = %err, "malformed data island ignored");
                }
            }
        }
        let elements = ID_ATTR
            .captures_iter(html)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();
        Self {
            islands,
            elements: Some(elements),
        }
    }

    /// Islands given directly as a JSON object of `id -> payload`.
    pub fn from_value(value: &Value) -> Self {
        let islands = match value {
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            other => {
                tracing::warn!(found = %other, "data islands must be a JSON object");
                IndexMap::new()
            }
        };
        Self {
            islands,
            elements: None,
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.islands.insert(id.into(), value);
    }

    pub fn with_elements<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements
            .as_ref()
            .is_none_or(|elements| elements.contains(id))
    }

    pub fn get_json(&self, id: &str) -> Option<&Value> {
        self.islands.get(id).filter(|value| !value.is_null())
    }

    /// Island as a list of labels; scalars are stringified.
    pub fn strings(&self, id: &str) -> Vec<String> {
        match self.get_json(id) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(other) => {
                tracing::warn!(island = id, found = %other, "expected a list of labels");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Island as a list of numbers; entries that are not numeric read as 0.
    pub fn numbers(&self, id: &str) -> Vec<f64> {
        match self.get_json(id) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Number(num) => num.as_f64().unwrap_or_default(),
                    Value::String(text) => text.trim().parse().unwrap_or_default(),
                    _ => 0.0,
                })
                .collect(),
            Some(other) => {
                tracing::warn!(island = id, found = %other, "expected a list of numbers");
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}
