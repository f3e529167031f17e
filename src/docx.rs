use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use crate::error::Error;
use crate::model::{BODY_TEXT_OUTLINE_LEVEL, LineSpacingRule, ListInfo, ParagraphRecord, RunRecord};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// Word's size when neither the document defaults nor any style set one.
const WORD_DEFAULT_FONT_SIZE: f64 = 10.0;
const MAX_STYLE_DEPTH: usize = 16;
const LINE_UNITS_PER_SINGLE: f64 = 240.0;
/// What Word lays out when neither a style nor the paragraph sets spacing.
const WORD_DEFAULT_LINE_SPACING: (LineSpacingRule, f64) = (LineSpacingRule::Single, 1.0);

fn twips_to_pts(twips: f64) -> f64 {
    twips / 20.0
}

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

/// Numeric attribute. A present but unparsable value is recorded in `errors`
/// rather than silently treated as absent.
fn number_attr(node: roxmltree::Node, attr: &str, errors: &mut Vec<String>) -> Option<f64> {
    let raw = node.attribute((WML_NS, attr))?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            errors.push(format!("w:{}/@w:{attr} has malformed value '{raw}'", node.tag_name().name()));
            None
        }
    }
}

fn twips_attr(node: roxmltree::Node, attr: &str, errors: &mut Vec<String>) -> Option<f64> {
    number_attr(node, attr, errors).map(twips_to_pts)
}

fn dml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(DML_NS))
}

fn typeface<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<&'a str> {
    dml(node, name)
        .and_then(|n| n.attribute("typeface"))
        .filter(|tf| !tf.is_empty())
}

/// East Asian typeface of a theme font collection: `a:ea`, or the
/// Simplified Chinese script override when `a:ea` is empty.
fn east_asian_typeface<'a>(node: roxmltree::Node<'a, 'a>) -> Option<&'a str> {
    typeface(node, "ea").or_else(|| {
        node.children()
            .find(|n| {
                n.tag_name().name() == "font"
                    && n.tag_name().namespace() == Some(DML_NS)
                    && n.attribute("script") == Some("Hans")
            })
            .and_then(|n| n.attribute("typeface"))
            .filter(|tf| !tf.is_empty())
    })
}

fn read_part<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> Option<String> {
    let mut file = zip.by_name(name).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    Some(content)
}

struct ThemeFonts {
    major: String,
    minor: String,
    major_east_asia: Option<String>,
    minor_east_asia: Option<String>,
}

fn parse_theme<R: Read + Seek>(zip: &mut ZipArchive<R>) -> ThemeFonts {
    let mut theme = ThemeFonts {
        major: String::from("Calibri Light"),
        minor: String::from("Calibri"),
        major_east_asia: None,
        minor_east_asia: None,
    };

    let names: Vec<String> = zip.file_names().map(|s| s.to_string()).collect();
    let Some(theme_name) = names.iter().find(|n| n.starts_with("word/theme/") && n.ends_with(".xml")) else {
        return theme;
    };
    let Some(xml_content) = read_part(zip, theme_name) else {
        return theme;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        log::warn!("{theme_name} is not well-formed XML, using default theme fonts");
        return theme;
    };

    for node in xml.descendants() {
        if node.tag_name().namespace() != Some(DML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "majorFont" => {
                if let Some(tf) = typeface(node, "latin") {
                    theme.major = tf.to_string();
                }
                theme.major_east_asia = east_asian_typeface(node).map(str::to_string);
            }
            "minorFont" => {
                if let Some(tf) = typeface(node, "latin") {
                    theme.minor = tf.to_string();
                }
                theme.minor_east_asia = east_asian_typeface(node).map(str::to_string);
            }
            _ => {}
        }
    }
    theme
}

#[derive(Clone, Copy, Debug)]
enum FirstLineIndent {
    Points(f64),
    /// Character units; negative for a hanging indent.
    Chars(f64),
}

#[derive(Clone, Debug, Default)]
struct ParagraphProps {
    alignment: Option<String>,
    left_indent: Option<f64>,
    right_indent: Option<f64>,
    first_line: Option<FirstLineIndent>,
    space_before: Option<f64>,
    space_after: Option<f64>,
    line_spacing: Option<(LineSpacingRule, f64)>,
    outline_level: Option<u8>,
    numbering: Option<(String, u8)>,
}

impl ParagraphProps {
    /// Overlay `over` on top of `self`; properties `over` sets win.
    fn apply(&mut self, over: &ParagraphProps) {
        self.alignment = over.alignment.clone().or(self.alignment.take());
        self.left_indent = over.left_indent.or(self.left_indent);
        self.right_indent = over.right_indent.or(self.right_indent);
        self.first_line = over.first_line.or(self.first_line);
        self.space_before = over.space_before.or(self.space_before);
        self.space_after = over.space_after.or(self.space_after);
        self.line_spacing = over.line_spacing.or(self.line_spacing);
        self.outline_level = over.outline_level.or(self.outline_level);
        self.numbering = over.numbering.clone().or(self.numbering.take());
    }
}

#[derive(Clone, Debug, Default)]
struct RunProps {
    size: Option<f64>,
    bold: Option<bool>,
    italic: Option<bool>,
    underline: Option<String>,
    color: Option<String>,
    ascii_font: Option<String>,
    east_asia_font: Option<String>,
}

impl RunProps {
    fn apply(&mut self, over: &RunProps) {
        self.size = over.size.or(self.size);
        self.bold = over.bold.or(self.bold);
        self.italic = over.italic.or(self.italic);
        self.underline = over.underline.clone().or(self.underline.take());
        self.color = over.color.clone().or(self.color.take());
        self.ascii_font = over.ascii_font.clone().or(self.ascii_font.take());
        self.east_asia_font = over.east_asia_font.clone().or(self.east_asia_font.take());
    }

    fn into_run(self, text: String) -> RunRecord {
        let font_name = if is_primarily_east_asian(&text) {
            self.east_asia_font.clone().or_else(|| self.ascii_font.clone())
        } else {
            self.ascii_font.clone().or_else(|| self.east_asia_font.clone())
        };
        RunRecord {
            text,
            font_name,
            font_ascii_name: self.ascii_font,
            font_eastasia_name: self.east_asia_font,
            size: self.size,
            bold: self.bold,
            italic: self.italic,
            underline_type: self.underline,
            color_hex: self.color,
        }
    }
}

fn is_east_asian(c: char) -> bool {
    matches!(
        c as u32,
        0x3000..=0x303F | 0x3040..=0x30FF | 0x3400..=0x4DBF | 0x4E00..=0x9FFF
            | 0xAC00..=0xD7AF | 0xF900..=0xFAFF | 0xFF00..=0xFFEF
    )
}

fn is_primarily_east_asian(text: &str) -> bool {
    let (total, east_asian) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(t, e), c| (t + 1, e + usize::from(is_east_asian(c))));
    total > 0 && east_asian * 10 > total * 3
}

fn parse_alignment(val: &str) -> String {
    match val {
        "left" | "start" => "left",
        "center" => "center",
        "right" | "end" => "right",
        "both" => "justify",
        "distribute" => "distribute",
        other => other,
    }
    .to_string()
}

fn parse_line_spacing(spacing: roxmltree::Node, errors: &mut Vec<String>) -> Option<(LineSpacingRule, f64)> {
    let line = number_attr(spacing, "line", errors)?;
    match spacing.attribute((WML_NS, "lineRule")) {
        Some("exact") => Some((LineSpacingRule::Exactly, twips_to_pts(line))),
        Some("atLeast") => Some((LineSpacingRule::AtLeast, twips_to_pts(line))),
        _ => {
            let ratio = line / LINE_UNITS_PER_SINGLE;
            let rule = match line as i64 {
                240 => LineSpacingRule::Single,
                360 => LineSpacingRule::OneAndHalf,
                480 => LineSpacingRule::Double,
                _ => LineSpacingRule::Multiple,
            };
            Some((rule, ratio))
        }
    }
}

fn parse_first_line(ind: roxmltree::Node, errors: &mut Vec<String>) -> Option<FirstLineIndent> {
    if let Some(v) = number_attr(ind, "hangingChars", errors) {
        return Some(FirstLineIndent::Chars(-v / 100.0));
    }
    if let Some(v) = twips_attr(ind, "hanging", errors) {
        return Some(FirstLineIndent::Points(-v));
    }
    if let Some(v) = number_attr(ind, "firstLineChars", errors) {
        return Some(FirstLineIndent::Chars(v / 100.0));
    }
    twips_attr(ind, "firstLine", errors).map(FirstLineIndent::Points)
}

fn parse_ppr(ppr: roxmltree::Node, errors: &mut Vec<String>) -> ParagraphProps {
    let mut props = ParagraphProps {
        alignment: wml_attr(ppr, "jc").map(parse_alignment),
        ..ParagraphProps::default()
    };

    if let Some(ind) = wml(ppr, "ind") {
        props.left_indent = twips_attr(ind, "left", errors).or_else(|| twips_attr(ind, "start", errors));
        props.right_indent = twips_attr(ind, "right", errors).or_else(|| twips_attr(ind, "end", errors));
        props.first_line = parse_first_line(ind, errors);
    }
    if let Some(spacing) = wml(ppr, "spacing") {
        props.space_before = twips_attr(spacing, "before", errors);
        props.space_after = twips_attr(spacing, "after", errors);
        props.line_spacing = parse_line_spacing(spacing, errors);
    }
    if let Some(lvl) = wml(ppr, "outlineLvl").and_then(|n| number_attr(n, "val", errors)) {
        // w:val is 0-based; 9 means body text
        props.outline_level = Some(if (0.0..9.0).contains(&lvl) {
            lvl as u8 + 1
        } else {
            BODY_TEXT_OUTLINE_LEVEL
        });
    }
    if let Some(num_pr) = wml(ppr, "numPr")
        && let Some(num_id) = wml_attr(num_pr, "numId")
    {
        let ilvl = wml_attr(num_pr, "ilvl")
            .and_then(|v| v.parse::<u8>().ok())
            .unwrap_or(0);
        props.numbering = Some((num_id.to_string(), ilvl));
    }
    props
}

fn toggle(rpr: roxmltree::Node, name: &str) -> Option<bool> {
    let node = wml(rpr, name)?;
    Some(!matches!(node.attribute((WML_NS, "val")), Some("0" | "false" | "off")))
}

/// `dotDash` -> `dot_dash`
fn underline_name(val: &str) -> String {
    let mut out = String::with_capacity(val.len() + 4);
    for c in val.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_color(val: &str, errors: &mut Vec<String>) -> Option<String> {
    if val == "auto" {
        return None;
    }
    if val.len() == 6 && val.chars().all(|c| c.is_ascii_hexdigit()) {
        return Some(format!("#{}", val.to_ascii_uppercase()));
    }
    errors.push(format!("w:color/@w:val has malformed value '{val}'"));
    None
}

fn theme_font(theme_ref: Option<&str>, theme: &ThemeFonts) -> Option<String> {
    match theme_ref? {
        "majorHAnsi" | "majorAscii" | "majorBidi" => Some(theme.major.clone()),
        "minorHAnsi" | "minorAscii" | "minorBidi" => Some(theme.minor.clone()),
        "majorEastAsia" => theme.major_east_asia.clone(),
        "minorEastAsia" => theme.minor_east_asia.clone(),
        _ => None,
    }
}

fn parse_rpr(rpr: roxmltree::Node, theme: &ThemeFonts, errors: &mut Vec<String>) -> RunProps {
    let mut props = RunProps {
        size: wml(rpr, "sz")
            .and_then(|n| number_attr(n, "val", errors))
            .map(|half_points| half_points / 2.0),
        bold: toggle(rpr, "b"),
        italic: toggle(rpr, "i"),
        underline: wml_attr(rpr, "u").map(underline_name),
        color: wml_attr(rpr, "color").and_then(|v| parse_color(v, errors)),
        ..RunProps::default()
    };
    if let Some(rfonts) = wml(rpr, "rFonts") {
        props.ascii_font = rfonts
            .attribute((WML_NS, "ascii"))
            .or_else(|| rfonts.attribute((WML_NS, "hAnsi")))
            .map(str::to_string)
            .or_else(|| theme_font(rfonts.attribute((WML_NS, "asciiTheme")), theme));
        props.east_asia_font = rfonts
            .attribute((WML_NS, "eastAsia"))
            .map(str::to_string)
            .or_else(|| theme_font(rfonts.attribute((WML_NS, "eastAsiaTheme")), theme));
    }
    props
}

/// Name shown to users for a style, with English built-in names replaced by
/// the ones a Chinese Word installation displays.
fn display_name(raw: &str) -> String {
    let raw = raw.trim();
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "normal" => "正文".to_string(),
        "caption" => "题注".to_string(),
        "title" => "标题".to_string(),
        _ => match lower.strip_prefix("heading ") {
            Some(n) if n.parse::<u8>().is_ok() => format!("标题 {n}"),
            _ => raw.to_string(),
        },
    }
}

struct StyleDef {
    name: String,
    based_on: Option<String>,
    ppr: ParagraphProps,
    rpr: RunProps,
}

struct StylesInfo {
    default_ppr: ParagraphProps,
    default_rpr: RunProps,
    styles: HashMap<String, StyleDef>,
    default_paragraph_style: Option<String>,
}

impl StylesInfo {
    /// `id` and its `basedOn` ancestors, outermost ancestor first.
    fn chain(&self, id: &str) -> Vec<&StyleDef> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(id) = current {
            if chain.len() >= MAX_STYLE_DEPTH || !seen.insert(id) {
                log::warn!("style '{id}' has a cyclic or too deep basedOn chain");
                break;
            }
            let Some(style) = self.styles.get(id) else { break };
            chain.push(style);
            current = style.based_on.as_deref();
        }
        chain.reverse();
        chain
    }

    fn paragraph_props(&self, style_id: Option<&str>) -> (ParagraphProps, RunProps) {
        let mut ppr = self.default_ppr.clone();
        let mut rpr = self.default_rpr.clone();
        for style in style_id.map(|id| self.chain(id)).unwrap_or_default() {
            ppr.apply(&style.ppr);
            rpr.apply(&style.rpr);
        }
        (ppr, rpr)
    }

    fn character_props(&self, style_id: &str) -> RunProps {
        let mut rpr = RunProps::default();
        for style in self.chain(style_id) {
            rpr.apply(&style.rpr);
        }
        rpr
    }
}

fn parse_styles<R: Read + Seek>(zip: &mut ZipArchive<R>, theme: &ThemeFonts) -> StylesInfo {
    let mut info = StylesInfo {
        default_ppr: ParagraphProps::default(),
        default_rpr: RunProps {
            size: Some(WORD_DEFAULT_FONT_SIZE),
            ascii_font: Some(theme.minor.clone()),
            east_asia_font: theme.minor_east_asia.clone(),
            ..RunProps::default()
        },
        styles: HashMap::new(),
        default_paragraph_style: None,
    };

    let Some(xml_content) = read_part(zip, "word/styles.xml") else {
        return info;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        log::warn!("word/styles.xml is not well-formed XML, ignoring styles");
        return info;
    };
    let root = xml.root_element();
    let mut errors = Vec::new();

    if let Some(doc_defaults) = wml(root, "docDefaults") {
        if let Some(rpr) = wml(doc_defaults, "rPrDefault").and_then(|n| wml(n, "rPr")) {
            info.default_rpr.apply(&parse_rpr(rpr, theme, &mut errors));
        }
        if let Some(ppr) = wml(doc_defaults, "pPrDefault").and_then(|n| wml(n, "pPr")) {
            info.default_ppr.apply(&parse_ppr(ppr, &mut errors));
        }
    }

    for style_node in root.children().filter(|n| is_wml(*n, "style")) {
        let style_type = style_node.attribute((WML_NS, "type"));
        if !matches!(style_type, Some("paragraph" | "character")) {
            continue;
        }
        let Some(style_id) = style_node.attribute((WML_NS, "styleId")) else {
            continue;
        };
        if style_type == Some("paragraph")
            && matches!(style_node.attribute((WML_NS, "default")), Some("1" | "true"))
        {
            info.default_paragraph_style = Some(style_id.to_string());
        }
        let name = display_name(wml_attr(style_node, "name").unwrap_or(style_id));
        let based_on = wml_attr(style_node, "basedOn").map(str::to_string);
        let ppr = wml(style_node, "pPr")
            .map(|n| parse_ppr(n, &mut errors))
            .unwrap_or_default();
        let rpr = wml(style_node, "rPr")
            .map(|n| parse_rpr(n, theme, &mut errors))
            .unwrap_or_default();
        info.styles.insert(style_id.to_string(), StyleDef { name, based_on, ppr, rpr });
    }

    for e in errors {
        log::warn!("word/styles.xml: {e}");
    }
    info
}

struct LevelDef {
    num_fmt: String,
    lvl_text: String,
    start: u32,
}

struct NumberingInfo {
    abstract_nums: HashMap<String, HashMap<u8, LevelDef>>,
    num_to_abstract: HashMap<String, String>,
}

fn parse_numbering<R: Read + Seek>(zip: &mut ZipArchive<R>) -> NumberingInfo {
    let mut numbering = NumberingInfo {
        abstract_nums: HashMap::new(),
        num_to_abstract: HashMap::new(),
    };
    let Some(xml_content) = read_part(zip, "word/numbering.xml") else {
        return numbering;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        log::warn!("word/numbering.xml is not well-formed XML, ignoring list numbering");
        return numbering;
    };

    for node in xml.root_element().children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "abstractNum" => {
                let Some(abs_id) = node.attribute((WML_NS, "abstractNumId")) else {
                    continue;
                };
                let mut levels = HashMap::new();
                for lvl in node.children().filter(|n| is_wml(*n, "lvl")) {
                    let Some(ilvl) = lvl
                        .attribute((WML_NS, "ilvl"))
                        .and_then(|v| v.parse::<u8>().ok())
                    else {
                        continue;
                    };
                    let num_fmt = wml_attr(lvl, "numFmt").unwrap_or("decimal").to_string();
                    let lvl_text = wml_attr(lvl, "lvlText").unwrap_or("").to_string();
                    let start = wml_attr(lvl, "start")
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(1);
                    levels.insert(ilvl, LevelDef { num_fmt, lvl_text, start });
                }
                numbering.abstract_nums.insert(abs_id.to_string(), levels);
            }
            "num" => {
                let Some(num_id) = node.attribute((WML_NS, "numId")) else {
                    continue;
                };
                let Some(abs_id) = wml_attr(node, "abstractNumId") else {
                    continue;
                };
                numbering.num_to_abstract.insert(num_id.to_string(), abs_id.to_string());
            }
            _ => {}
        }
    }
    numbering
}

/// Current counter per list and level. A level restarts once a shallower
/// level of the same list advances.
type ListCounters = HashMap<String, [Option<u32>; 9]>;

fn parse_list_info(
    numbering: &NumberingInfo,
    num_id: &str,
    ilvl: u8,
    counters: &mut ListCounters,
) -> Option<ListInfo> {
    if num_id == "0" || ilvl > 8 {
        return None;
    }
    let levels = numbering
        .num_to_abstract
        .get(num_id)
        .and_then(|abs_id| numbering.abstract_nums.get(abs_id))?;
    let def = levels.get(&ilvl)?;

    let slots = counters.entry(num_id.to_string()).or_insert([None; 9]);
    let level = usize::from(ilvl);
    slots[level] = Some(slots[level].map_or(def.start, |n| n + 1));
    for deeper in &mut slots[level + 1..] {
        *deeper = None;
    }

    let label = if def.num_fmt == "bullet" {
        "\u{2022}".to_string()
    } else {
        let mut label = def.lvl_text.clone();
        for (i, slot) in slots.iter().enumerate().take(level + 1) {
            let value = slot.or_else(|| levels.get(&(i as u8)).map(|d| d.start)).unwrap_or(1);
            label = label.replace(&format!("%{}", i + 1), &value.to_string());
        }
        label
    };
    Some(ListInfo { num_id: num_id.to_string(), level: ilvl, label })
}

/// Paragraphs in document order, including those nested in tables and
/// content controls.
fn collect_paragraphs<'a>(parent: roxmltree::Node<'a, 'a>, out: &mut Vec<roxmltree::Node<'a, 'a>>) {
    for node in parent.children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "p" => out.push(node),
            "tbl" | "tr" | "tc" | "sdt" | "sdtContent" | "customXml" => collect_paragraphs(node, out),
            _ => {}
        }
    }
}

/// Runs of a paragraph, looking through hyperlinks and tracked insertions.
fn collect_runs<'a>(parent: roxmltree::Node<'a, 'a>, out: &mut Vec<roxmltree::Node<'a, 'a>>) {
    for node in parent.children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "r" => out.push(node),
            "hyperlink" | "ins" | "smartTag" | "fldSimple" | "sdt" | "sdtContent" => collect_runs(node, out),
            _ => {}
        }
    }
}

fn run_text(run_node: roxmltree::Node) -> String {
    let mut text = String::new();
    for n in run_node.children().filter(|n| n.tag_name().namespace() == Some(WML_NS)) {
        match n.tag_name().name() {
            "t" => text.push_str(n.text().unwrap_or("")),
            "tab" => text.push(' '),
            "noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

struct Context<'s> {
    theme: &'s ThemeFonts,
    styles: &'s StylesInfo,
    numbering: &'s NumberingInfo,
}

fn read_paragraph(
    node: roxmltree::Node,
    index: usize,
    ctx: &Context,
    counters: &mut ListCounters,
) -> ParagraphRecord {
    let mut errors = Vec::new();
    let ppr = wml(node, "pPr");

    let style_id = ppr
        .and_then(|ppr| wml_attr(ppr, "pStyle"))
        .or(ctx.styles.default_paragraph_style.as_deref());
    let style_name = style_id.map(|id| {
        ctx.styles
            .styles
            .get(id)
            .map_or_else(|| id.to_string(), |s| s.name.clone())
    });

    let (mut props, style_rpr) = ctx.styles.paragraph_props(style_id);
    if let Some(ppr) = ppr {
        props.apply(&parse_ppr(ppr, &mut errors));
    }

    let mut run_nodes = Vec::new();
    collect_runs(node, &mut run_nodes);
    let mut runs = Vec::new();
    for run_node in run_nodes {
        let text = run_text(run_node);
        if text.is_empty() {
            continue;
        }
        let mut run_props = style_rpr.clone();
        let rpr = wml(run_node, "rPr");
        if let Some(char_style) = rpr.and_then(|n| wml_attr(n, "rStyle")) {
            run_props.apply(&ctx.styles.character_props(char_style));
        }
        if let Some(rpr) = rpr {
            run_props.apply(&parse_rpr(rpr, ctx.theme, &mut errors));
        }
        runs.push(run_props.into_run(text));
    }

    let font_size = runs
        .iter()
        .find_map(|r| r.size)
        .or(style_rpr.size)
        .unwrap_or(WORD_DEFAULT_FONT_SIZE);
    let first_line_indent = match props.first_line {
        Some(FirstLineIndent::Points(pt)) => pt,
        Some(FirstLineIndent::Chars(chars)) => chars * font_size,
        None => 0.0,
    };
    let (line_spacing_rule, line_spacing_value) = props.line_spacing.unwrap_or(WORD_DEFAULT_LINE_SPACING);

    let list = props
        .numbering
        .as_ref()
        .and_then(|(num_id, ilvl)| parse_list_info(ctx.numbering, num_id, *ilvl, counters));

    let extraction_error = if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    };

    ParagraphRecord {
        index,
        text: runs.iter().map(|r| r.text.as_str()).collect(),
        style_name,
        outline_level: Some(props.outline_level.unwrap_or(BODY_TEXT_OUTLINE_LEVEL)),
        alignment: props.alignment,
        // unset measures are reported as the zero Word actually applies
        left_indent: Some(props.left_indent.unwrap_or(0.0)),
        right_indent: Some(props.right_indent.unwrap_or(0.0)),
        first_line_indent: Some(first_line_indent),
        space_before: Some(props.space_before.unwrap_or(0.0)),
        space_after: Some(props.space_after.unwrap_or(0.0)),
        line_spacing_rule: Some(line_spacing_rule),
        line_spacing_value: Some(line_spacing_value),
        list,
        runs,
        extraction_error,
        ..ParagraphRecord::default()
    }
}

/// Read every paragraph of a DOCX file, with effective formatting resolved
/// through the style hierarchy.
pub fn parse(path: &Path) -> Result<Vec<ParagraphRecord>, Error> {
    let file = std::fs::File::open(path)?;
    parse_reader(file)
}

pub fn parse_reader<R: Read + Seek>(reader: R) -> Result<Vec<ParagraphRecord>, Error> {
    let mut zip = ZipArchive::new(reader)?;

    let theme = parse_theme(&mut zip);
    let styles = parse_styles(&mut zip, &theme);
    let numbering = parse_numbering(&mut zip);

    let mut xml_content = String::new();
    zip.by_name("word/document.xml")?
        .read_to_string(&mut xml_content)?;

    let xml = roxmltree::Document::parse(&xml_content)?;
    let body = wml(xml.root_element(), "body")
        .ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut nodes = Vec::new();
    collect_paragraphs(body, &mut nodes);

    let ctx = Context { theme: &theme, styles: &styles, numbering: &numbering };
    let mut counters = ListCounters::new();
    let paragraphs: Vec<ParagraphRecord> = nodes
        .into_iter()
        .enumerate()
        .map(|(index, node)| read_paragraph(node, index, &ctx, &mut counters))
        .collect();
    log::debug!("read {} paragraphs", paragraphs.len());
    Ok(paragraphs)
}
