use std::fmt;

use serde::Serialize;

use crate::units::Quantity;

/// Outline level Word reports for ordinary body text.
pub const BODY_TEXT_OUTLINE_LEVEL: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineSpacingRule {
    Single,
    OneAndHalf,
    Double,
    AtLeast,
    Exactly,
    Multiple,
}

impl LineSpacingRule {
    /// Rules whose value is an absolute height in points rather than a ratio.
    pub fn is_absolute(self) -> bool {
        matches!(self, LineSpacingRule::AtLeast | LineSpacingRule::Exactly)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentType {
    FrontMatter,
    #[default]
    BodyMatter,
    BackMatter,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListInfo {
    pub num_id: String,
    pub level: u8,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunRecord {
    pub text: String,
    pub font_name: Option<String>,
    pub font_ascii_name: Option<String>,
    pub font_eastasia_name: Option<String>,
    pub size: Option<f64>, // points
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline_type: Option<String>,
    pub color_hex: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphRecord {
    pub index: usize,
    pub text: String,
    pub style_name: Option<String>,
    pub outline_level: Option<u8>,
    pub alignment: Option<String>,
    pub left_indent: Option<f64>,
    pub right_indent: Option<f64>,
    pub first_line_indent: Option<f64>,
    pub space_before: Option<f64>,
    pub space_after: Option<f64>,
    pub line_spacing_rule: Option<LineSpacingRule>,
    pub line_spacing_value: Option<f64>,
    pub segment_type: SegmentType,
    pub list: Option<ListInfo>,
    pub runs: Vec<RunRecord>,
    pub extraction_error: Option<String>,
}

impl ParagraphRecord {
    /// Size of the first run that carries one; used as the reference size for
    /// character-based indents.
    pub fn actual_font_size(&self) -> Option<f64> {
        self.runs.iter().find_map(|r| r.size)
    }
}

/// A formatting value as seen by the comparator, on either the template or
/// the document side.
#[derive(Clone, Debug, PartialEq)]
pub enum FormatValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Quantity(Quantity),
}

impl FormatValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FormatValue::Null)
    }

    pub fn truthy(&self) -> bool {
        match self {
            FormatValue::Null => false,
            FormatValue::Bool(b) => *b,
            FormatValue::Number(n) => *n != 0.0,
            FormatValue::Text(s) => !s.is_empty(),
            FormatValue::Quantity(q) => q.value != 0.0,
        }
    }
}

impl From<Option<f64>> for FormatValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(FormatValue::Null, FormatValue::Number)
    }
}

impl From<Option<bool>> for FormatValue {
    fn from(v: Option<bool>) -> Self {
        v.map_or(FormatValue::Null, FormatValue::Bool)
    }
}

impl From<Option<&str>> for FormatValue {
    fn from(v: Option<&str>) -> Self {
        v.map_or(FormatValue::Null, |s| FormatValue::Text(s.to_string()))
    }
}

impl fmt::Display for FormatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatValue::Null => write!(f, "未定义/默认"),
            FormatValue::Bool(true) => write!(f, "是"),
            FormatValue::Bool(false) => write!(f, "否"),
            FormatValue::Number(n) => write!(f, "{n}"),
            FormatValue::Text(s) => write!(f, "{s}"),
            FormatValue::Quantity(q) => write!(f, "{q}"),
        }
    }
}

/// Which resolution tier chose a paragraph's template style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MappingMethod {
    #[serde(rename = "P1")]
    Explicit,
    #[serde(rename = "P-LLM")]
    Suggested,
    #[serde(rename = "P2")]
    OutlineHeading,
    #[serde(rename = "P3-FigCaption")]
    FigureCaption,
    #[serde(rename = "P3-TabCaption")]
    TableCaption,
    #[serde(rename = "P3-Formula")]
    Formula,
    #[serde(rename = "P3-Body")]
    Body,
    #[serde(rename = "P5-FallbackToBody")]
    FallbackToBody,
    #[serde(rename = "P5")]
    Unresolved,
}

impl MappingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            MappingMethod::Explicit => "P1",
            MappingMethod::Suggested => "P-LLM",
            MappingMethod::OutlineHeading => "P2",
            MappingMethod::FigureCaption => "P3-FigCaption",
            MappingMethod::TableCaption => "P3-TabCaption",
            MappingMethod::Formula => "P3-Formula",
            MappingMethod::Body => "P3-Body",
            MappingMethod::FallbackToBody => "P5-FallbackToBody",
            MappingMethod::Unresolved => "P5",
        }
    }
}

impl fmt::Display for MappingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn one_based<S: serde::Serializer>(index: &usize, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(*index as u64 + 1)
}

/// One reported deviation. `paragraph_index` is 0-based in memory and
/// serialized 1-based for readers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DifferenceRecord {
    #[serde(serialize_with = "one_based")]
    pub paragraph_index: usize,
    pub paragraph_text_preview: String,
    pub property: String,
    pub expected_value: String,
    pub actual_value: String,
    pub target_style_name: String,
    pub mapping_method: MappingMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_detail: Option<String>,
}

impl DifferenceRecord {
    pub fn paragraph_number(&self) -> usize {
        self.paragraph_index + 1
    }
}
