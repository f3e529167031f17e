mod common;

use std::io::{Cursor, Write};

use serde_json::json;
use zip::write::SimpleFileOptions;

use common::{STYLES, build_docx};
use docxside_check::docx;
use docxside_check::model::{BODY_TEXT_OUTLINE_LEVEL, LineSpacingRule, ParagraphRecord};
use docxside_check::{StyleTemplate, ToleranceConfig, compare_document};

fn read(document_body: &str, styles: Option<&str>, numbering: Option<&str>) -> Vec<ParagraphRecord> {
    docx::parse_reader(Cursor::new(build_docx(document_body, styles, numbering))).unwrap()
}

#[test]
fn paragraphs_inherit_style_formatting() {
    let body = r#"
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>第一章 绪论</w:t></w:r></w:p>
<w:p><w:r><w:t>正文段落</w:t></w:r></w:p>
"#;
    let paragraphs = read(body, Some(STYLES), None);
    assert_eq!(paragraphs.len(), 2);

    let heading = &paragraphs[0];
    assert_eq!(heading.style_name.as_deref(), Some("标题 1"));
    assert_eq!(heading.outline_level, Some(1));
    assert_eq!(heading.alignment.as_deref(), Some("center"));
    assert_eq!(heading.line_spacing_rule, Some(LineSpacingRule::OneAndHalf));
    let run = &heading.runs[0];
    assert_eq!(run.size, Some(16.0));
    assert_eq!(run.bold, Some(true));
    assert_eq!(run.font_eastasia_name.as_deref(), Some("黑体"));
    assert_eq!(run.font_ascii_name.as_deref(), Some("Times New Roman"));
    assert_eq!(run.font_name.as_deref(), Some("黑体"));

    let normal = &paragraphs[1];
    assert_eq!(normal.index, 1);
    assert_eq!(normal.style_name.as_deref(), Some("正文"));
    assert_eq!(normal.outline_level, Some(BODY_TEXT_OUTLINE_LEVEL));
    assert_eq!(normal.line_spacing_value, Some(1.5));
    assert_eq!(normal.runs[0].size, Some(12.0));
    assert_eq!(normal.runs[0].bold, None);
}

#[test]
fn direct_formatting_overrides_styles() {
    let body = r#"
<w:p>
  <w:pPr>
    <w:ind w:left="420" w:firstLineChars="200"/>
    <w:spacing w:before="120" w:after="0" w:line="400" w:lineRule="exact"/>
    <w:jc w:val="both"/>
  </w:pPr>
  <w:r><w:rPr><w:b w:val="0"/><w:u w:val="dotDash"/><w:color w:val="ff0000"/></w:rPr><w:t>Hello</w:t></w:r>
  <w:r><w:rPr><w:rStyle w:val="Emphasis"/></w:rPr><w:t xml:space="preserve"> world</w:t><w:tab/></w:r>
</w:p>
"#;
    let paragraphs = read(body, Some(STYLES), None);
    let p = &paragraphs[0];
    assert_eq!(p.text, "Hello world ");
    assert_eq!(p.left_indent, Some(21.0));
    // two characters at the paragraph's 12pt size
    assert_eq!(p.first_line_indent, Some(24.0));
    assert_eq!(p.space_before, Some(6.0));
    assert_eq!(p.space_after, Some(0.0));
    assert_eq!(p.line_spacing_rule, Some(LineSpacingRule::Exactly));
    assert_eq!(p.line_spacing_value, Some(20.0));
    assert_eq!(p.alignment.as_deref(), Some("justify"));

    let first = &p.runs[0];
    assert_eq!(first.bold, Some(false));
    assert_eq!(first.underline_type.as_deref(), Some("dot_dash"));
    assert_eq!(first.color_hex.as_deref(), Some("#FF0000"));
    assert_eq!(first.font_name.as_deref(), Some("Times New Roman"));
    assert_eq!(p.runs[1].italic, Some(true));
}

#[test]
fn hanging_indent_is_negative() {
    let body = r#"<w:p><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#;
    let p = &read(body, None, None)[0];
    assert_eq!(p.first_line_indent, Some(-18.0));
}

#[test]
fn unset_spacing_reads_as_word_defaults() {
    let p = &read("<w:p><w:r><w:t>x</w:t></w:r></w:p>", None, None)[0];
    assert_eq!(p.left_indent, Some(0.0));
    assert_eq!(p.right_indent, Some(0.0));
    assert_eq!(p.first_line_indent, Some(0.0));
    assert_eq!(p.space_before, Some(0.0));
    assert_eq!(p.space_after, Some(0.0));
    assert_eq!(p.line_spacing_rule, Some(LineSpacingRule::Single));
    assert_eq!(p.line_spacing_value, Some(1.0));
    assert_eq!(p.extraction_error, None);
}

#[test]
fn conforming_paragraph_without_explicit_spacing_has_no_differences() {
    let body = r#"<w:p><w:pPr><w:ind w:firstLineChars="200"/></w:pPr><w:r><w:t>正文段落</w:t></w:r></w:p>"#;
    let paragraphs = read(body, Some(STYLES), None);
    let template = StyleTemplate::from_json(&json!({
        "样式": {
            "正文": {
                "字体": { "大小": "12pt" },
                "段落": { "段前": "0 行", "段后": "0 行", "左缩进": "0 字符", "首行缩进": "2 字符" }
            }
        }
    }))
    .unwrap();

    let records = compare_document(&paragraphs, &template, &ToleranceConfig::default(), None);
    assert!(records.is_empty(), "{records:#?}");
}

#[test]
fn table_cells_and_hyperlinks_are_read_in_order() {
    let body = r#"
<w:p><w:r><w:t>before</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p><w:hyperlink><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>
"#;
    let texts: Vec<String> = read(body, None, None).into_iter().map(|p| p.text).collect();
    assert_eq!(texts, ["before", "cell", "link"]);
}

#[test]
fn malformed_attributes_are_recorded() {
    let body = r#"<w:p><w:pPr><w:ind w:left="abc"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#;
    let p = &read(body, None, None)[0];
    assert_eq!(p.left_indent, Some(0.0));
    let error = p.extraction_error.as_deref().unwrap();
    assert!(error.contains("abc"), "{error}");
}

#[test]
fn list_labels_count_per_level() {
    let numbering = r#"
<w:abstractNum w:abstractNumId="0">
  <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl>
  <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1.%2"/></w:lvl>
</w:abstractNum>
<w:num w:numId="5"><w:abstractNumId w:val="0"/></w:num>
"#;
    let item = |ilvl: u8, text: &str| {
        format!(r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{ilvl}"/><w:numId w:val="5"/></w:numPr></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#)
    };
    let body = [item(0, "a"), item(1, "b"), item(1, "c"), item(0, "d"), item(1, "e")].concat();
    let labels: Vec<String> = read(&body, None, Some(numbering))
        .into_iter()
        .map(|p| p.list.map(|l| l.label).unwrap_or_default())
        .collect();
    assert_eq!(labels, ["1.", "1.1", "1.2", "2.", "2.1"]);
}

#[test]
fn missing_document_part_is_an_error() {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/styles.xml", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"<w:styles/>").unwrap();
    let bytes = zip.finish().unwrap().into_inner();
    assert!(docx::parse_reader(Cursor::new(bytes)).is_err());
}

#[test]
fn not_a_zip_is_an_error() {
    assert!(docx::parse_reader(Cursor::new(b"plain text".to_vec())).is_err());
}
