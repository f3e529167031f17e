use std::sync::OnceLock;

use regex::Regex;

use crate::model::{BODY_TEXT_OUTLINE_LEVEL, MappingMethod, ParagraphRecord};
use crate::suggest::StyleSuggestions;
use crate::template::{BODY_STYLE, StyleRule, StyleTemplate};

pub const FIGURE_CAPTION_STYLE: &str = "图题";
pub const TABLE_CAPTION_STYLE: &str = "表题";
pub const FORMULA_STYLE: &str = "公式";

const CHINESE_NUMERALS: [&str; 8] = ["一", "二", "三", "四", "五", "六", "七", "八"];

/// The template style a paragraph is checked against, and how it was chosen.
#[derive(Clone, Copy, Debug)]
pub struct Resolution<'a> {
    pub rule: &'a StyleRule,
    pub style_name: &'a str,
    pub method: MappingMethod,
}

struct Inputs<'a> {
    paragraph: &'a ParagraphRecord,
    template: &'a StyleTemplate,
    suggestions: Option<&'a StyleSuggestions>,
}

type Tier = for<'a> fn(&Inputs<'a>) -> Option<Resolution<'a>>;

/// Tried in order; the first tier that picks a style wins.
const TIERS: &[(&str, Tier)] = &[
    ("explicit style", explicit_style),
    ("suggested style", suggested_style),
    ("outline heading", outline_heading),
    ("body content", body_content),
    ("body fallback", body_fallback),
];

fn figure_caption_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:图|Figure|Fig\.?)\s*\d+(?:[-.]\d+)*").expect("figure caption regex")
    })
}

fn table_caption_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:表|Table)\s*\d+(?:[-.]\d+)*").expect("table caption regex"))
}

fn formula_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[(（]\s*\d+(?:[-.]\d+)*\s*[)）]\s*$").expect("formula number regex")
    })
}

fn lookup<'a>(template: &'a StyleTemplate, name: &str, method: MappingMethod) -> Option<Resolution<'a>> {
    let (style_name, rule) = template.entry(name)?;
    Some(Resolution { rule, style_name, method })
}

fn explicit_style<'a>(inputs: &Inputs<'a>) -> Option<Resolution<'a>> {
    let name = inputs.paragraph.style_name.as_deref()?.trim();
    if name.is_empty() {
        return None;
    }
    lookup(inputs.template, name, MappingMethod::Explicit)
}

fn suggested_style<'a>(inputs: &Inputs<'a>) -> Option<Resolution<'a>> {
    let name = inputs.suggestions?.get(inputs.paragraph.index)?;
    let resolution = lookup(inputs.template, name, MappingMethod::Suggested);
    if resolution.is_none() {
        log::warn!(
            "paragraph {}: suggested style '{name}' is not in the template, ignoring",
            inputs.paragraph.index + 1
        );
    }
    resolution
}

fn outline_heading<'a>(inputs: &Inputs<'a>) -> Option<Resolution<'a>> {
    let level = inputs.paragraph.outline_level?;
    if !(1..=8).contains(&level) {
        return None;
    }
    let arabic = format!("标题{level}");
    let chinese = format!("标题{}", CHINESE_NUMERALS[usize::from(level) - 1]);
    [arabic, chinese]
        .iter()
        .find_map(|name| lookup(inputs.template, name, MappingMethod::OutlineHeading))
}

fn body_content<'a>(inputs: &Inputs<'a>) -> Option<Resolution<'a>> {
    if inputs.paragraph.outline_level != Some(BODY_TEXT_OUTLINE_LEVEL) {
        return None;
    }
    let text = inputs.paragraph.text.as_str();
    let caption = if figure_caption_regex().is_match(text) {
        Some((FIGURE_CAPTION_STYLE, MappingMethod::FigureCaption))
    } else if table_caption_regex().is_match(text) {
        Some((TABLE_CAPTION_STYLE, MappingMethod::TableCaption))
    } else if formula_number_regex().is_match(text) {
        Some((FORMULA_STYLE, MappingMethod::Formula))
    } else {
        None
    };
    caption
        .and_then(|(name, method)| lookup(inputs.template, name, method))
        .or_else(|| lookup(inputs.template, BODY_STYLE, MappingMethod::Body))
}

fn body_fallback<'a>(inputs: &Inputs<'a>) -> Option<Resolution<'a>> {
    lookup(inputs.template, BODY_STYLE, MappingMethod::FallbackToBody)
}

/// Pick the template style for `paragraph`. `None` means no tier matched and
/// the template has no body style to fall back on.
pub fn resolve<'a>(
    paragraph: &'a ParagraphRecord,
    template: &'a StyleTemplate,
    suggestions: Option<&'a StyleSuggestions>,
) -> Option<Resolution<'a>> {
    let inputs = Inputs { paragraph, template, suggestions };
    TIERS.iter().find_map(|(tier, f)| {
        let resolution = f(&inputs)?;
        log::debug!(
            "paragraph {} -> '{}' via {tier} ({})",
            paragraph.index + 1,
            resolution.style_name,
            resolution.method
        );
        Some(resolution)
    })
}
