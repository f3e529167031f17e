use docxside_check::FormatValue;
use docxside_check::units::{self, Quantity, Unit, UnitConversionError};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn parses_numbers_with_and_without_units() {
    assert_eq!(units::parse("12pt"), Some((12.0, Some(Unit::Pt))));
    assert_eq!(units::parse(" 1.5 倍 "), Some((1.5, Some(Unit::Multiple))));
    assert_eq!(units::parse("2 字符"), Some((2.0, Some(Unit::Char))));
    assert_eq!(units::parse("-0.5cm"), Some((-0.5, Some(Unit::Cm))));
    assert_eq!(units::parse("10.5"), Some((10.5, None)));
    assert_eq!(units::parse("3 PT"), Some((3.0, Some(Unit::Pt))));
}

#[test]
fn rejects_unknown_units_and_text() {
    assert_eq!(units::parse("12 furlongs"), None);
    assert_eq!(units::parse("center"), None);
    assert_eq!(units::parse(""), None);
}

#[test]
fn parse_value_handles_every_variant() {
    assert_eq!(units::parse_value(&FormatValue::Number(3.0)), Some(Quantity::bare(3.0)));
    assert_eq!(
        units::parse_value(&FormatValue::Text("1 行".into())),
        Some(Quantity::new(1.0, Unit::Line))
    );
    assert_eq!(units::parse_value(&FormatValue::Bool(true)), None);
    assert_eq!(units::parse_value(&FormatValue::Null), None);
}

#[test]
fn converts_absolute_units_to_points() {
    let cm = units::convert(1.0, Some(Unit::Cm), Unit::Pt, None).unwrap();
    assert!(close(cm.unwrap(), 28.3464567));
    assert_eq!(units::convert(1.0, Some(Unit::Inch), Unit::Pt, None), Ok(Some(72.0)));
    assert_eq!(units::convert(240.0, Some(Unit::Twips), Unit::Pt, None), Ok(Some(12.0)));
    assert_eq!(units::convert(7.0, None, Unit::Pt, None), Ok(Some(7.0)));
}

#[test]
fn characters_need_a_positive_font_size() {
    assert_eq!(units::convert(2.0, Some(Unit::Char), Unit::Pt, Some(12.0)), Ok(Some(24.0)));
    assert_eq!(
        units::convert(2.0, Some(Unit::Char), Unit::Pt, None),
        Err(UnitConversionError::MissingFontSize(Unit::Char))
    );
    assert_eq!(
        units::convert(2.0, Some(Unit::Char), Unit::Pt, Some(0.0)),
        Err(UnitConversionError::NonPositiveFontSize(0.0))
    );
}

#[test]
fn relative_units_only_become_points_with_a_font_size() {
    assert_eq!(units::convert(1.5, Some(Unit::Multiple), Unit::Pt, None), Ok(None));
    assert_eq!(units::convert(1.5, Some(Unit::Multiple), Unit::Pt, Some(12.0)), Ok(Some(18.0)));
    assert_eq!(units::convert(1.0, Some(Unit::Line), Unit::Pt, Some(10.5)), Ok(Some(10.5)));
}

#[test]
fn absolute_units_have_no_multiple() {
    assert_eq!(units::convert(12.0, Some(Unit::Pt), Unit::Multiple, None), Ok(None));
    assert_eq!(units::convert(1.5, Some(Unit::Line), Unit::Multiple, None), Ok(Some(1.5)));
    assert_eq!(units::convert(1.5, None, Unit::Multiple, None), Ok(Some(1.5)));
}

#[test]
fn twips_conversion_rounds_and_swallows_failures() {
    assert_eq!(units::convert(12.03, Some(Unit::Pt), Unit::Twips, None), Ok(Some(241.0)));
    assert_eq!(units::convert(2.0, Some(Unit::Char), Unit::Twips, None), Ok(None));
}

#[test]
fn converts_points_back_for_display() {
    let chars = units::convert(24.0, Some(Unit::Pt), Unit::Char, Some(12.0)).unwrap();
    assert_eq!(chars, Some(2.0));
    let inch = units::convert(36.0, Some(Unit::Pt), Unit::Inch, None).unwrap();
    assert_eq!(inch, Some(0.5));
}

#[test]
fn measurements_render_with_two_decimals() {
    assert_eq!(units::format_measure(12.0, Unit::Pt), "12.00 磅");
    assert_eq!(units::format_measure(1.5, Unit::Multiple), "1.50 倍");
}
