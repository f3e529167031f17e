use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::FormatValue;
use crate::units::{self, Quantity, Unit};

/// Generic body style every fallback resolves to.
pub const BODY_STYLE: &str = "正文";

const STYLES_KEYS: &[&str] = &["样式", "styles"];
const FONT_KEYS: &[&str] = &["字体", "font"];
const PARAGRAPH_KEYS: &[&str] = &["段落", "paragraph"];
const OUTLINE_KEYS: &[&str] = &["大纲级别", "outline_level"];
const ALIGNMENT_KEYS: &[&str] = &["对齐", "alignment"];
const VALUE_KEYS: &[&str] = &["值", "value"];
const UNIT_KEYS: &[&str] = &["单位", "unit"];
const FONT_SIZE_KEYS: &[&str] = &["大小", "size"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleRule {
    /// Run-level expectations, in declaration order.
    pub font: Vec<(String, FormatValue)>,
    /// Paragraph-level expectations, in declaration order.
    pub paragraph: Vec<(String, FormatValue)>,
    pub outline_level: Option<u8>,
    pub alignment: Option<String>,
}

impl StyleRule {
    /// The rule's own font size in points, if it declares a convertible one.
    pub fn declared_font_size(&self) -> Option<f64> {
        let (_, value) = self
            .font
            .iter()
            .find(|(key, _)| FONT_SIZE_KEYS.contains(&key.as_str()))?;
        let q = units::parse_value(value)?;
        units::convert(q.value, q.unit, Unit::Pt, None).ok().flatten()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyleTemplate {
    name: String,
    styles: Vec<(String, StyleRule)>,
    index: HashMap<String, usize>,
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn text_value(s: &str) -> FormatValue {
    match units::parse(s) {
        Some((value, Some(unit))) => FormatValue::Quantity(Quantity::new(value, unit)),
        Some((value, None)) => FormatValue::Number(value),
        None => FormatValue::Text(s.to_string()),
    }
}

/// Normalize one template value into the comparator's tagged form.
pub fn format_value_from_json(value: &Value) -> FormatValue {
    match value {
        Value::Null => FormatValue::Null,
        Value::Bool(b) => FormatValue::Bool(*b),
        Value::Number(n) => n.as_f64().map_or(FormatValue::Null, FormatValue::Number),
        Value::String(s) => text_value(s),
        Value::Object(obj) => {
            let Some(number) = field(obj, VALUE_KEYS).and_then(number_of) else {
                return FormatValue::Text(value.to_string());
            };
            match field(obj, UNIT_KEYS) {
                None | Some(Value::Null) => FormatValue::Number(number),
                Some(Value::String(label)) => match Unit::from_label(label) {
                    Some(unit) => FormatValue::Quantity(Quantity::new(number, unit)),
                    None => FormatValue::Text(format!("{number} {label}")),
                },
                Some(_) => FormatValue::Text(value.to_string()),
            }
        }
        Value::Array(_) => FormatValue::Text(value.to_string()),
    }
}

fn property_section(
    style_name: &str,
    obj: &Map<String, Value>,
    keys: &[&str],
) -> Result<Option<Vec<(String, FormatValue)>>, Error> {
    match field(obj, keys) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(section)) => Ok(Some(
            section
                .iter()
                .map(|(k, v)| (k.clone(), format_value_from_json(v)))
                .collect(),
        )),
        Some(_) => Err(Error::InvalidTemplate(format!(
            "style '{style_name}': '{}' must be an object",
            keys[0]
        ))),
    }
}

fn parse_rule(style_name: &str, value: &Value) -> Result<(StyleRule, bool), Error> {
    let Value::Object(obj) = value else {
        return Err(Error::InvalidTemplate(format!("style '{style_name}' is not an object")));
    };
    let font = property_section(style_name, obj, FONT_KEYS)?;
    let has_font = font.is_some();
    let paragraph = property_section(style_name, obj, PARAGRAPH_KEYS)?;
    let outline_level = field(obj, OUTLINE_KEYS)
        .and_then(number_of)
        .filter(|n| n.fract() == 0.0 && (0.0..=255.0).contains(n))
        .map(|n| n as u8);
    let alignment = field(obj, ALIGNMENT_KEYS)
        .and_then(Value::as_str)
        .map(str::to_string);
    let rule = StyleRule {
        font: font.unwrap_or_default(),
        paragraph: paragraph.unwrap_or_default(),
        outline_level,
        alignment,
    };
    Ok((rule, has_font))
}

impl StyleTemplate {
    /// Validate the template's shape and normalize every expected value.
    /// Any structural problem is fatal for the whole comparison.
    pub fn from_json(root: &Value) -> Result<Self, Error> {
        let Value::Object(root_obj) = root else {
            return Err(Error::InvalidTemplate("template root must be an object".into()));
        };
        let Some(Value::Object(styles_obj)) = field(root_obj, STYLES_KEYS) else {
            return Err(Error::InvalidTemplate("missing '样式' (styles) table".into()));
        };
        let name = root_obj
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("未命名模板")
            .to_string();

        let mut styles = Vec::with_capacity(styles_obj.len());
        let mut index = HashMap::with_capacity(styles_obj.len());
        let mut any_font = false;
        for (style_name, value) in styles_obj {
            let (rule, has_font) = parse_rule(style_name, value)?;
            any_font |= has_font;
            index.insert(style_name.clone(), styles.len());
            styles.push((style_name.clone(), rule));
        }
        if !any_font {
            return Err(Error::InvalidTemplate("no style declares a '字体' (font) section".into()));
        }
        log::debug!("loaded template '{name}' with {} styles", styles.len());
        Ok(StyleTemplate { name, styles, index })
    }

    pub fn from_json_str(content: &str) -> Result<Self, Error> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_json(&value)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, style_name: &str) -> Option<&StyleRule> {
        self.index.get(style_name).map(|&i| &self.styles[i].1)
    }

    /// Like `get`, but also hands back the template's own copy of the name.
    pub fn entry(&self, style_name: &str) -> Option<(&str, &StyleRule)> {
        self.index.get(style_name).map(|&i| {
            let (name, rule) = &self.styles[i];
            (name.as_str(), rule)
        })
    }

    pub fn contains(&self, style_name: &str) -> bool {
        self.index.contains_key(style_name)
    }

    /// Style names in the order the template declares them.
    pub fn style_names(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(|(name, _)| name.as_str())
    }
}
