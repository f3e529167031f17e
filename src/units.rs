use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::FormatValue;

pub const CM_TO_PT: f64 = 28.3464567;
pub const INCH_TO_PT: f64 = 72.0;
pub const TWIPS_PER_PT: f64 = 20.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Pt,
    Cm,
    Inch,
    Char,
    Multiple,
    Line,
    Twips,
}

impl Unit {
    /// Accepts the English and Chinese spellings used by templates.
    pub fn from_label(label: &str) -> Option<Unit> {
        match label.trim().to_lowercase().as_str() {
            "pt" | "磅" => Some(Unit::Pt),
            "cm" | "厘米" => Some(Unit::Cm),
            "inch" | "in" | "英寸" => Some(Unit::Inch),
            "char" | "字符" => Some(Unit::Char),
            "multiple" | "倍" => Some(Unit::Multiple),
            "line" | "行" => Some(Unit::Line),
            "twip" | "twips" | "缇" => Some(Unit::Twips),
            _ => None,
        }
    }

    /// Key used for tolerance lookups (`<property>.<unit>`).
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Pt => "pt",
            Unit::Cm => "cm",
            Unit::Inch => "inch",
            Unit::Char => "char",
            Unit::Multiple => "multiple",
            Unit::Line => "line",
            Unit::Twips => "twips",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Unit::Pt => "磅",
            Unit::Cm => "厘米",
            Unit::Inch => "英寸",
            Unit::Char => "字符",
            Unit::Multiple => "倍",
            Unit::Line => "行",
            Unit::Twips => "缇",
        }
    }

    /// Multiples of the line height, as opposed to absolute lengths.
    pub fn is_relative(self) -> bool {
        matches!(self, Unit::Multiple | Unit::Line)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// A number with an optional unit. `unit: None` means the value is already in
/// whatever unit the comparison targets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: Option<Unit>,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit: Some(unit) }
    }

    pub fn bare(value: f64) -> Self {
        Quantity { value, unit: None }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{} {unit}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnitConversionError {
    MissingFontSize(Unit),
    NonPositiveFontSize(f64),
}

impl fmt::Display for UnitConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitConversionError::MissingFontSize(unit) => {
                write!(f, "a reference font size is required to convert '{}'", unit.as_str())
            }
            UnitConversionError::NonPositiveFontSize(size) => {
                write!(f, "reference font size must be positive, got {size}")
            }
        }
    }
}

impl std::error::Error for UnitConversionError {}

fn value_unit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*([a-zA-Z\p{Han}]+)?\s*$")
            .expect("value/unit regex")
    })
}

/// Split `"12pt"`, `"1.5 倍"`, `"-2"` into number and unit. Fails on text that
/// is not a number or carries an unknown unit.
pub fn parse(text: &str) -> Option<(f64, Option<Unit>)> {
    let caps = value_unit_regex().captures(text)?;
    let value = caps.get(1)?.as_str().parse::<f64>().ok()?;
    match caps.get(2) {
        Some(label) => Unit::from_label(label.as_str()).map(|unit| (value, Some(unit))),
        None => Some((value, None)),
    }
}

/// Numeric view of any format value, if it has one.
pub fn parse_value(value: &FormatValue) -> Option<Quantity> {
    match value {
        FormatValue::Number(n) => Some(Quantity::bare(*n)),
        FormatValue::Quantity(q) => Some(*q),
        FormatValue::Text(s) => parse(s).map(|(value, unit)| Quantity { value, unit }),
        FormatValue::Null | FormatValue::Bool(_) => None,
    }
}

fn require_font_size(unit: Unit, font_size: Option<f64>) -> Result<f64, UnitConversionError> {
    let size = font_size.ok_or(UnitConversionError::MissingFontSize(unit))?;
    if size <= 0.0 {
        return Err(UnitConversionError::NonPositiveFontSize(size));
    }
    Ok(size)
}

fn to_pt(value: f64, from: Option<Unit>, font_size: Option<f64>) -> Result<Option<f64>, UnitConversionError> {
    match from {
        None | Some(Unit::Pt) => Ok(Some(value)),
        Some(Unit::Cm) => Ok(Some(value * CM_TO_PT)),
        Some(Unit::Inch) => Ok(Some(value * INCH_TO_PT)),
        Some(Unit::Twips) => Ok(Some(value / TWIPS_PER_PT)),
        Some(Unit::Char) => Ok(Some(value * require_font_size(Unit::Char, font_size)?)),
        // Line-height multiples only become lengths relative to a font size.
        Some(Unit::Multiple | Unit::Line) => Ok(font_size
            .filter(|size| *size > 0.0)
            .map(|size| value * size)),
    }
}

/// Convert `value` between units. `Ok(None)` means the conversion is not
/// meaningful (absolute to relative, or relative to points without a font
/// size); `Err` means a character-based conversion lacked a usable font size.
pub fn convert(
    value: f64,
    from: Option<Unit>,
    to: Unit,
    reference_font_size: Option<f64>,
) -> Result<Option<f64>, UnitConversionError> {
    match to {
        Unit::Pt => to_pt(value, from, reference_font_size),
        Unit::Multiple | Unit::Line => Ok(match from {
            None | Some(Unit::Multiple | Unit::Line) => Some(value),
            Some(_) => None,
        }),
        Unit::Twips => Ok(to_pt(value, from, reference_font_size)
            .ok()
            .flatten()
            .map(|pt| (pt * TWIPS_PER_PT).round())),
        Unit::Cm => Ok(to_pt(value, from, reference_font_size)?.map(|pt| pt / CM_TO_PT)),
        Unit::Inch => Ok(to_pt(value, from, reference_font_size)?.map(|pt| pt / INCH_TO_PT)),
        Unit::Char => {
            let size = require_font_size(Unit::Char, reference_font_size)?;
            Ok(to_pt(value, from, reference_font_size)?.map(|pt| pt / size))
        }
    }
}

/// Render `value` the way the report shows measurements, e.g. `12.00 磅`.
pub fn format_measure(value: f64, unit: Unit) -> String {
    format!("{value:.2} {unit}")
}
