use crate::compare::{ActualContext, ValueComparator};
use crate::model::{DifferenceRecord, FormatValue, MappingMethod, ParagraphRecord, RunRecord, SegmentType};
use crate::resolve::{Resolution, resolve};
use crate::suggest::StyleSuggestions;
use crate::template::{BODY_STYLE, StyleTemplate};
use crate::text::normalize;
use crate::tolerance::ToleranceConfig;

const PREVIEW_CHARS: usize = 30;
const RUN_LABEL_CHARS: usize = 15;
const MAX_LISTED_RUNS: usize = 3;

const DEFAULT_UNDERLINE: &str = "none";
const DEFAULT_COLOR: &str = "#000000";

/// Normalized opening of a paragraph, as shown in reports.
pub fn preview(text: &str) -> String {
    normalize(text).chars().take(PREVIEW_CHARS).collect()
}

fn paragraph_value(p: &ParagraphRecord, key: &str) -> Option<FormatValue> {
    let value: FormatValue = match key {
        "对齐方式" | "alignment" => p.alignment.as_deref().into(),
        "左缩进" | "left_indent" => p.left_indent.into(),
        "右缩进" | "right_indent" => p.right_indent.into(),
        "首行缩进" | "first_line_indent" => p.first_line_indent.into(),
        "段前" | "space_before" => p.space_before.into(),
        "段后" | "space_after" => p.space_after.into(),
        "行间距" | "line_spacing" => p.line_spacing_value.into(),
        "大纲级别" | "outline_level" => p.outline_level.map(f64::from).into(),
        _ => return None,
    };
    Some(value)
}

/// Run attribute for a template key, with unset attributes replaced by what
/// Word renders when nothing is specified.
fn run_value(run: &RunRecord, key: &str) -> Option<FormatValue> {
    let value: FormatValue = match key {
        "名称" | "name" => run.font_name.as_deref().into(),
        "大小" | "size" => run.size.into(),
        "粗体" | "bold" => FormatValue::Bool(run.bold.unwrap_or(false)),
        "斜体" | "italic" => FormatValue::Bool(run.italic.unwrap_or(false)),
        "下划线" | "underline" => {
            FormatValue::Text(run.underline_type.clone().unwrap_or_else(|| DEFAULT_UNDERLINE.into()))
        }
        "颜色" | "color" => {
            FormatValue::Text(run.color_hex.clone().unwrap_or_else(|| DEFAULT_COLOR.into()))
        }
        "中文字体" | "eastasia_font" => run.font_eastasia_name.as_deref().into(),
        "西文字体" | "ascii_font" => run.font_ascii_name.as_deref().into(),
        _ => return None,
    };
    Some(value)
}

fn run_label(run: &RunRecord, position: usize) -> String {
    let text = run.text.trim();
    if text.is_empty() {
        format!("片段 {position}")
    } else {
        let head: String = text.chars().take(RUN_LABEL_CHARS).collect();
        format!("“{head}” (片段 {position})")
    }
}

/// Describe which runs share one deviating value.
fn location_detail(runs: &[RunRecord], members: &[usize]) -> String {
    if members.len() == runs.len() {
        if runs.len() > 1 {
            return "段落内所有文本片段".to_string();
        }
        return run_label(&runs[members[0]], members[0] + 1);
    }
    let listed: Vec<String> = members
        .iter()
        .take(MAX_LISTED_RUNS)
        .map(|&i| run_label(&runs[i], i + 1))
        .collect();
    let mut detail = format!("文本: {}", listed.join(", "));
    if members.len() > MAX_LISTED_RUNS {
        detail.push_str(&format!(" 等 {} 处", members.len() - MAX_LISTED_RUNS));
    }
    detail
}

/// Reason a paragraph cannot be checked, if any.
fn malformed_reason(p: &ParagraphRecord) -> Option<String> {
    if let Some(reason) = &p.extraction_error {
        return Some(reason.clone());
    }
    let measures = [
        ("left_indent", p.left_indent),
        ("right_indent", p.right_indent),
        ("first_line_indent", p.first_line_indent),
        ("space_before", p.space_before),
        ("space_after", p.space_after),
        ("line_spacing", p.line_spacing_value),
    ];
    if let Some((name, value)) = measures
        .iter()
        .find_map(|(name, v)| v.filter(|v| !v.is_finite()).map(|v| (name, v)))
    {
        return Some(format!("{name} is not a finite number ({value})"));
    }
    p.runs
        .iter()
        .enumerate()
        .find_map(|(i, r)| r.size.filter(|s| !s.is_finite()).map(|s| format!("run {} size is not a finite number ({s})", i + 1)))
}

struct Aggregator<'a> {
    comparator: ValueComparator<'a>,
    template: &'a StyleTemplate,
    suggestions: Option<&'a StyleSuggestions>,
    out: Vec<DifferenceRecord>,
}

impl<'a> Aggregator<'a> {
    fn push(
        &mut self,
        p: &ParagraphRecord,
        property: String,
        expected: String,
        actual: String,
        target: &str,
        method: MappingMethod,
    ) -> &mut DifferenceRecord {
        self.out.push(DifferenceRecord {
            paragraph_index: p.index,
            paragraph_text_preview: preview(&p.text),
            property,
            expected_value: expected,
            actual_value: actual,
            target_style_name: target.to_string(),
            mapping_method: method,
            location_detail: None,
        });
        let last = self.out.len() - 1;
        &mut self.out[last]
    }

    fn paragraph(&mut self, p: &ParagraphRecord) {
        if let Some(reason) = malformed_reason(p) {
            log::warn!("paragraph {} could not be checked: {reason}", p.index + 1);
            self.push(
                p,
                "段落处理".into(),
                "[Error]".into(),
                format!("[Error] {reason}"),
                "N/A",
                MappingMethod::Unresolved,
            );
            return;
        }

        let Some(resolution) = resolve(p, self.template, self.suggestions) else {
            let style = p.style_name.as_deref().unwrap_or("无");
            let level = p.outline_level.map_or_else(|| "无".to_string(), |l| l.to_string());
            self.push(
                p,
                "整体样式".into(),
                "未找到匹配模板样式".into(),
                format!("文档样式: {style}, 大纲级别: {level}"),
                "N/A",
                MappingMethod::Unresolved,
            );
            return;
        };

        self.paragraph_properties(p, &resolution);
        self.run_properties(p, &resolution);
    }

    fn paragraph_properties(&mut self, p: &ParagraphRecord, resolution: &Resolution<'_>) {
        let font_size = p.actual_font_size().or_else(|| resolution.rule.declared_font_size());
        for (key, expected) in &resolution.rule.paragraph {
            let Some(actual) = paragraph_value(p, key) else {
                log::debug!("skipping unknown paragraph property '{key}'");
                continue;
            };
            let property = format!("段落.{key}");
            let context = ActualContext { line_spacing_rule: p.line_spacing_rule };
            let result = self.comparator.compare(expected, &actual, &property, font_size, Some(&context));
            if !result.is_match {
                self.push(
                    p,
                    property,
                    result.expected,
                    result.actual,
                    resolution.style_name,
                    resolution.method,
                );
            }
        }
    }

    fn run_properties(&mut self, p: &ParagraphRecord, resolution: &Resolution<'_>) {
        if p.runs.is_empty() {
            return;
        }
        for (key, expected) in &resolution.rule.font {
            let property = format!("字体.{key}");
            // (rendered actual, rendered expected, run indices), first-seen order
            let mut groups: Vec<(String, String, Vec<usize>)> = Vec::new();
            for (i, run) in p.runs.iter().enumerate() {
                let Some(actual) = run_value(run, key) else {
                    log::debug!("skipping unknown font property '{key}'");
                    break;
                };
                let result = self.comparator.compare(expected, &actual, &property, None, None);
                if result.is_match {
                    continue;
                }
                match groups.iter().position(|(actual, _, _)| *actual == result.actual) {
                    Some(g) => groups[g].2.push(i),
                    None => groups.push((result.actual, result.expected, vec![i])),
                }
            }
            for (actual, expected, members) in groups {
                let detail = location_detail(&p.runs, &members);
                self.push(
                    p,
                    property.clone(),
                    expected,
                    actual,
                    resolution.style_name,
                    resolution.method,
                )
                .location_detail = Some(detail);
            }
        }
    }
}

/// Check every body paragraph against `template` and collect the deviations
/// in paragraph order. Paragraph-level properties come before run-level ones,
/// each in the template's declaration order.
///
/// If segmentation left no body paragraphs, the whole document is checked.
pub fn compare_document(
    paragraphs: &[ParagraphRecord],
    template: &StyleTemplate,
    tolerance: &ToleranceConfig,
    suggestions: Option<&StyleSuggestions>,
) -> Vec<DifferenceRecord> {
    let body: Vec<&ParagraphRecord> = paragraphs
        .iter()
        .filter(|p| p.segment_type == SegmentType::BodyMatter)
        .collect();
    let selected = if body.is_empty() && !paragraphs.is_empty() {
        log::warn!("no body paragraphs found, checking all {} paragraphs", paragraphs.len());
        paragraphs.iter().collect()
    } else {
        body
    };
    if !template.contains(BODY_STYLE) {
        log::debug!("template '{}' has no '{BODY_STYLE}' style, unmatched paragraphs stay unresolved", template.name());
    }

    let mut aggregator = Aggregator {
        comparator: ValueComparator::new(tolerance),
        template,
        suggestions,
        out: Vec::new(),
    };
    for p in selected {
        aggregator.paragraph(p);
    }
    log::debug!("{} differences found", aggregator.out.len());
    aggregator.out
}
