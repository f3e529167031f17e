use crate::model::{FormatValue, LineSpacingRule};
use crate::tolerance::ToleranceConfig;
use crate::units::{self, Quantity, Unit, format_measure};

/// Below this many points an actual measurement counts as zero / not set.
const ZERO_EPSILON_PT: f64 = 0.01;

const CONVERSION_FAILED: &str = "转换失败";
const NOT_SET: &str = "未设置";

/// Facts about the document side that change how a value is read.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActualContext {
    pub line_spacing_rule: Option<LineSpacingRule>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub is_match: bool,
    pub expected: String,
    pub actual: String,
}

impl Comparison {
    fn new(is_match: bool, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Comparison { is_match, expected: expected.into(), actual: actual.into() }
    }
}

fn is_line_spacing(key: &str) -> bool {
    key.contains("行间距") || key.contains("line_spacing")
}

fn is_space_before_after(key: &str) -> bool {
    ["段前", "段后", "space_before", "space_after"]
        .iter()
        .any(|suffix| key.ends_with(suffix))
}

fn is_first_line_indent(key: &str) -> bool {
    key.contains("首行缩进") || key.contains("first_line_indent")
}

fn is_underline(key: &str) -> bool {
    key.contains("下划线") || key.contains("underline")
}

fn is_color(key: &str) -> bool {
    key.contains("颜色") || key.to_lowercase().contains("color")
}

fn is_outline_level(key: &str) -> bool {
    key.contains("大纲级别") || key.contains("outline_level")
}

fn expects_zero_lines(expected: &FormatValue) -> bool {
    matches!(
        expected,
        FormatValue::Quantity(Quantity { value, unit: Some(Unit::Line) }) if *value == 0.0
    )
}

fn is_numeric_pair(expected: &FormatValue, actual: &FormatValue) -> bool {
    match expected {
        FormatValue::Quantity(_) => true,
        FormatValue::Number(_) => !matches!(actual, FormatValue::Bool(_)),
        _ => false,
    }
}

fn normalize_color(s: &str) -> String {
    s.trim().trim_start_matches('#').to_uppercase()
}

fn convert_or_none(q: Quantity, to: Unit, font_size: Option<f64>) -> Option<f64> {
    match units::convert(q.value, q.unit, to, font_size) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("cannot convert {q} to {}: {e}", to.as_str());
            None
        }
    }
}

/// Decides whether a document value satisfies a template value.
pub struct ValueComparator<'a> {
    tolerance: &'a ToleranceConfig,
}

impl<'a> ValueComparator<'a> {
    pub fn new(tolerance: &'a ToleranceConfig) -> Self {
        ValueComparator { tolerance }
    }

    /// Compare one property. Never fails: conversion problems are reported as
    /// mismatches with a readable rendering of both sides.
    pub fn compare(
        &self,
        expected: &FormatValue,
        actual: &FormatValue,
        property_key: &str,
        reference_font_size: Option<f64>,
        context: Option<&ActualContext>,
    ) -> Comparison {
        // Word never stores "0 lines"; a zero-point spacing is the same thing.
        if is_space_before_after(property_key)
            && expects_zero_lines(expected)
            && let FormatValue::Number(a) = actual
            && a.abs() < ZERO_EPSILON_PT
        {
            return Comparison::new(true, "0 行", format_measure(*a, Unit::Pt));
        }

        match (expected.is_null(), actual.is_null()) {
            (true, true) => return Comparison::new(true, expected.to_string(), actual.to_string()),
            (true, false) | (false, true) => {
                return Comparison::new(false, expected.to_string(), actual.to_string());
            }
            (false, false) => {}
        }

        if is_outline_level(property_key) {
            return Comparison::new(expected == actual, expected.to_string(), actual.to_string());
        }
        if is_numeric_pair(expected, actual) {
            return self.compare_numeric(expected, actual, property_key, reference_font_size, context);
        }
        if matches!(expected, FormatValue::Bool(_)) || matches!(actual, FormatValue::Bool(_)) {
            return compare_boolean(expected, actual, property_key);
        }
        if matches!(expected, FormatValue::Text(_)) || matches!(actual, FormatValue::Text(_)) {
            return compare_text(expected, actual, property_key);
        }
        Comparison::new(expected == actual, expected.to_string(), actual.to_string())
    }

    /// Unit in which a bare line-spacing number from the document is expressed.
    fn line_spacing_unit(&self, value: f64, context: Option<&ActualContext>) -> Unit {
        match context.and_then(|c| c.line_spacing_rule) {
            Some(rule) if rule.is_absolute() => Unit::Pt,
            Some(_) => Unit::Multiple,
            None if value < self.tolerance.line_spacing_ratio_threshold => Unit::Multiple,
            None => Unit::Pt,
        }
    }

    fn compare_numeric(
        &self,
        expected: &FormatValue,
        actual: &FormatValue,
        property_key: &str,
        font_size: Option<f64>,
        context: Option<&ActualContext>,
    ) -> Comparison {
        let Some(expected_q) = units::parse_value(expected) else {
            return Comparison::new(false, expected.to_string(), actual.to_string());
        };
        let Some(mut actual_q) = units::parse_value(actual) else {
            return Comparison::new(false, expected.to_string(), actual.to_string());
        };

        let line_spacing = is_line_spacing(property_key);
        if line_spacing && actual_q.unit.is_none() {
            actual_q.unit = Some(self.line_spacing_unit(actual_q.value, context));
        }

        let target = match expected_q.unit {
            Some(Unit::Multiple) => Unit::Multiple,
            Some(Unit::Line) if line_spacing => Unit::Multiple,
            Some(_) => Unit::Pt,
            None if line_spacing => actual_q.unit.filter(|u| u.is_relative()).map_or(Unit::Pt, |_| Unit::Multiple),
            None => Unit::Pt,
        };

        let converted_expected = convert_or_none(expected_q, target, font_size);
        let converted_actual = convert_or_none(actual_q, target, font_size);

        let mut expected_text = converted_expected
            .map_or_else(|| CONVERSION_FAILED.to_string(), |v| format_measure(v, target));
        let mut actual_text = converted_actual
            .map_or_else(|| CONVERSION_FAILED.to_string(), |v| format_measure(v, target));

        let is_match = match (converted_expected, converted_actual) {
            (Some(e), Some(a)) => (e - a).abs() <= self.tolerance.tolerance(property_key, target),
            _ => false,
        };

        if is_first_line_indent(property_key) {
            if converted_actual.is_some_and(|a| a.abs() < ZERO_EPSILON_PT) {
                actual_text = NOT_SET.to_string();
            }
            if expected_q.unit == Some(Unit::Char) {
                let basis = match font_size {
                    Some(size) => format!("(基于字号 {size:.2} 磅)"),
                    None => "(基于字号)".to_string(),
                };
                expected_text = format!("{} 字符 (约 {expected_text}) {basis}", expected_q.value);
                if actual_text != NOT_SET
                    && let Some(a) = converted_actual
                    && let Some(chars) = convert_or_none(Quantity::new(a, Unit::Pt), Unit::Char, font_size)
                {
                    actual_text = format!("{actual_text} (约 {chars:.1} 字符)");
                }
            }
        }

        Comparison::new(is_match, expected_text, actual_text)
    }
}

fn compare_boolean(expected: &FormatValue, actual: &FormatValue, property_key: &str) -> Comparison {
    let expected_b = expected.truthy();
    let actual_b = match actual {
        FormatValue::Text(s) if is_underline(property_key) => !s.trim().eq_ignore_ascii_case("none"),
        other => other.truthy(),
    };
    Comparison::new(
        expected_b == actual_b,
        FormatValue::Bool(expected_b).to_string(),
        FormatValue::Bool(actual_b).to_string(),
    )
}

fn compare_text(expected: &FormatValue, actual: &FormatValue, property_key: &str) -> Comparison {
    let expected_s = expected.to_string();
    let actual_s = actual.to_string();
    let is_match = if is_color(property_key) {
        normalize_color(&expected_s) == normalize_color(&actual_s)
    } else {
        expected_s == actual_s
    };
    Comparison::new(is_match, expected_s, actual_s)
}
