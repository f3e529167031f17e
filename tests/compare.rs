use std::collections::HashMap;

use docxside_check::FormatValue;
use docxside_check::compare::{ActualContext, Comparison, ValueComparator};
use docxside_check::model::LineSpacingRule;
use docxside_check::tolerance::ToleranceConfig;
use docxside_check::units::{Quantity, Unit};

fn pt(v: f64) -> FormatValue {
    FormatValue::Quantity(Quantity::new(v, Unit::Pt))
}

fn compare(expected: &FormatValue, actual: &FormatValue, key: &str) -> Comparison {
    let tolerance = ToleranceConfig::default();
    ValueComparator::new(&tolerance).compare(expected, actual, key, None, None)
}

#[test]
fn point_tolerance_boundary() {
    let within = compare(&pt(12.0), &FormatValue::Number(12.09), "字体.大小");
    assert!(within.is_match);
    let outside = compare(&pt(12.0), &FormatValue::Number(12.11), "字体.大小");
    assert!(!outside.is_match);
    assert_eq!(outside.expected, "12.00 磅");
    assert_eq!(outside.actual, "12.11 磅");
}

#[test]
fn zero_line_spacing_matches_zero_points() {
    let zero_lines = FormatValue::Quantity(Quantity::new(0.0, Unit::Line));
    let matched = compare(&zero_lines, &FormatValue::Number(0.0), "段落.段前");
    assert!(matched.is_match);
    assert_eq!(matched.expected, "0 行");
    assert_eq!(matched.actual, "0.00 磅");

    let half_point = compare(&zero_lines, &FormatValue::Number(0.5), "段落.段后");
    assert!(!half_point.is_match);
}

#[test]
fn null_handling() {
    let both = compare(&FormatValue::Null, &FormatValue::Null, "字体.名称");
    assert!(both.is_match);
    let missing = compare(&FormatValue::Text("宋体".into()), &FormatValue::Null, "字体.名称");
    assert!(!missing.is_match);
    assert_eq!(missing.expected, "宋体");
    assert_eq!(missing.actual, "未定义/默认");
}

#[test]
fn booleans_render_in_chinese() {
    let result = compare(&FormatValue::Bool(false), &FormatValue::Bool(true), "字体.粗体");
    assert!(!result.is_match);
    assert_eq!(result.expected, "否");
    assert_eq!(result.actual, "是");
}

#[test]
fn underline_names_count_as_underlined() {
    let none = compare(&FormatValue::Bool(false), &FormatValue::Text("none".into()), "字体.下划线");
    assert!(none.is_match);
    let single = compare(&FormatValue::Bool(false), &FormatValue::Text("single".into()), "字体.下划线");
    assert!(!single.is_match);
}

#[test]
fn colors_ignore_case_and_hash() {
    let result = compare(
        &FormatValue::Text("#ff0000".into()),
        &FormatValue::Text("FF0000".into()),
        "字体.颜色",
    );
    assert!(result.is_match);
    let other = compare(&FormatValue::Text("宋体".into()), &FormatValue::Text("黑体".into()), "字体.名称");
    assert!(!other.is_match);
}

#[test]
fn outline_levels_compare_exactly() {
    let same = compare(&FormatValue::Number(1.0), &FormatValue::Number(1.0), "段落.大纲级别");
    assert!(same.is_match);
    let different = compare(&FormatValue::Number(1.0), &FormatValue::Number(2.0), "段落.大纲级别");
    assert!(!different.is_match);
    assert_eq!(different.expected, "1");
    assert_eq!(different.actual, "2");
}

#[test]
fn line_spacing_follows_the_paragraph_rule() {
    let tolerance = ToleranceConfig::default();
    let comparator = ValueComparator::new(&tolerance);
    let multiple = ActualContext { line_spacing_rule: Some(LineSpacingRule::Multiple) };
    let exactly = ActualContext { line_spacing_rule: Some(LineSpacingRule::Exactly) };

    let ratio = FormatValue::Quantity(Quantity::new(1.5, Unit::Multiple));
    let result = comparator.compare(&ratio, &FormatValue::Number(1.5), "段落.行间距", Some(12.0), Some(&multiple));
    assert!(result.is_match);
    assert_eq!(result.expected, "1.50 倍");

    let fixed = comparator.compare(&pt(20.0), &FormatValue::Number(20.0), "段落.行间距", Some(12.0), Some(&exactly));
    assert!(fixed.is_match);

    // a fixed height cannot be expressed as a ratio
    let mixed = comparator.compare(&ratio, &FormatValue::Number(18.0), "段落.行间距", Some(12.0), Some(&exactly));
    assert!(!mixed.is_match);
    assert_eq!(mixed.actual, "转换失败");
}

#[test]
fn plain_line_spacing_numbers_use_the_ratio_threshold() {
    let tolerance = ToleranceConfig::default();
    let comparator = ValueComparator::new(&tolerance);
    let small = comparator.compare(&FormatValue::Number(1.5), &FormatValue::Number(1.52), "段落.行间距", None, None);
    assert!(small.is_match);
    assert_eq!(small.actual, "1.52 倍");
    let large = comparator.compare(&FormatValue::Number(20.0), &FormatValue::Number(20.0), "段落.行间距", None, None);
    assert!(large.is_match);
    assert_eq!(large.actual, "20.00 磅");
}

#[test]
fn character_indent_renders_with_its_basis() {
    let tolerance = ToleranceConfig::default();
    let comparator = ValueComparator::new(&tolerance);
    let two_chars = FormatValue::Quantity(Quantity::new(2.0, Unit::Char));

    let ok = comparator.compare(&two_chars, &FormatValue::Number(24.0), "段落.首行缩进", Some(12.0), None);
    assert!(ok.is_match);
    assert_eq!(ok.expected, "2 字符 (约 24.00 磅) (基于字号 12.00 磅)");
    assert_eq!(ok.actual, "24.00 磅 (约 2.0 字符)");

    let unset = comparator.compare(&two_chars, &FormatValue::Number(0.0), "段落.首行缩进", Some(12.0), None);
    assert!(!unset.is_match);
    assert_eq!(unset.actual, "未设置");
}

#[test]
fn character_indent_without_font_size_fails_conversion() {
    let two_chars = FormatValue::Quantity(Quantity::new(2.0, Unit::Char));
    let result = compare(&two_chars, &FormatValue::Number(24.0), "段落.首行缩进");
    assert!(!result.is_match);
    assert!(result.expected.contains("转换失败"));
}

#[test]
fn specific_tolerance_overrides_the_unit_default() {
    let tolerance = ToleranceConfig {
        specific_tolerances: HashMap::from([("段落.段前.pt".to_string(), 1.0)]),
        ..ToleranceConfig::default()
    };
    let comparator = ValueComparator::new(&tolerance);
    let loose = comparator.compare(&pt(6.0), &FormatValue::Number(6.8), "段落.段前", None, None);
    assert!(loose.is_match);
    let strict = comparator.compare(&pt(6.0), &FormatValue::Number(6.8), "段落.段后", None, None);
    assert!(!strict.is_match);
}

#[test]
fn tolerance_file_falls_back_to_defaults() {
    let parsed = ToleranceConfig::from_json_str(r#"{"pt_tolerance": 0.5}"#).unwrap();
    assert_eq!(parsed.pt_tolerance, 0.5);
    assert_eq!(parsed.multiple_tolerance, 0.05);

    let missing = ToleranceConfig::load(std::path::Path::new("/nonexistent/tolerance.json"));
    assert_eq!(missing, ToleranceConfig::default());
}
