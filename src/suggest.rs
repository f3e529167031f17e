use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::Error;

/// Externally supplied paragraph index to style name hints, e.g. from a
/// language model pass over the document outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleSuggestions {
    by_index: HashMap<usize, String>,
}

fn normalize_style_name(name: &str) -> String {
    let name = name.trim().trim_matches(|c| c == '"' || c == '\'' || c == '“' || c == '”');
    match name {
        "标题一" => "标题1".to_string(),
        "标题二" => "标题2".to_string(),
        other => other.to_string(),
    }
}

fn index_of(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl StyleSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, paragraph_index: usize, style_name: impl Into<String>) {
        self.by_index.insert(paragraph_index, style_name.into());
    }

    pub fn get(&self, paragraph_index: usize) -> Option<&str> {
        self.by_index.get(&paragraph_index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// Parse `index,style` lines. Markdown code fences are ignored and lines
    /// that do not fit the format are skipped with a warning.
    pub fn parse_lines(text: &str) -> Self {
        let mut suggestions = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("```") {
                continue;
            }
            let Some((index, style)) = line.split_once([',', '，']) else {
                log::warn!("skipping suggestion line without a comma: {line:?}");
                continue;
            };
            let Ok(index) = index.trim().parse::<usize>() else {
                log::warn!("skipping suggestion line with a bad index: {line:?}");
                continue;
            };
            let style = normalize_style_name(style);
            if style.is_empty() {
                log::warn!("skipping suggestion line without a style: {line:?}");
                continue;
            }
            suggestions.insert(index, style);
        }
        suggestions
    }

    /// Accepts `{"3": "正文"}` or `[{"paragraph_index": 3, "style": "正文"}]`.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let mut suggestions = Self::new();
        match value {
            Value::Object(map) => {
                for (key, style) in map {
                    let (Some(index), Some(style)) = (key.trim().parse::<usize>().ok(), style.as_str()) else {
                        log::warn!("skipping suggestion entry {key:?}: {style}");
                        continue;
                    };
                    suggestions.insert(index, normalize_style_name(style));
                }
            }
            Value::Array(items) => {
                for item in items {
                    let index = item.get("paragraph_index").and_then(index_of);
                    let style = item.get("style").and_then(Value::as_str);
                    let (Some(index), Some(style)) = (index, style) else {
                        log::warn!("skipping suggestion entry {item}");
                        continue;
                    };
                    suggestions.insert(index, normalize_style_name(style));
                }
            }
            _ => {
                return Err(Error::InvalidSuggestions(
                    "expected an object or a list".into(),
                ));
            }
        }
        Ok(suggestions)
    }

    /// Load a suggestion file: JSON when it parses as such, otherwise the
    /// line format.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content) {
            Ok(value) => Self::from_json(&value),
            Err(_) => Ok(Self::parse_lines(&content)),
        }
    }
}
