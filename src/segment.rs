use regex::Regex;

use crate::model::{ParagraphRecord, SegmentType};
use crate::text::normalize;

/// Where the body of a thesis-like document starts and ends.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationOptions {
    /// Title of the first body chapter, matched case-insensitively with an
    /// optional `第N章`, `N.`, `N、` or `N ` prefix.
    pub first_chapter_title: String,
    /// Paragraphs whose whole text equals one of these, ignoring spaces and
    /// case, start the back matter.
    pub back_markers: Vec<String>,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        SegmentationOptions {
            first_chapter_title: "绪论".to_string(),
            back_markers: ["参考文献", "致谢", "附录"].map(String::from).to_vec(),
        }
    }
}

const NUMERALS: &str = r"[0-9一二三四五六七八九十百千万亿零〇]+";

fn chapter_title_regex(title: &str) -> Option<Regex> {
    let core = regex::escape(&normalize(title)).replace(' ', r"\s*");
    let pattern = format!(
        r"(?i)^\s*(?:第\s*{NUMERALS}\s*[章节篇部]|{NUMERALS}\s*[.\s、])?\s*{core}\s*$"
    );
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("cannot build chapter title pattern for {title:?}: {e}");
            None
        }
    }
}

fn compact_lowercase(text: &str) -> String {
    normalize(text).split_whitespace().collect::<String>().to_lowercase()
}

/// Label every paragraph as front, body or back matter.
///
/// The body starts at the first paragraph naming the first chapter; if none
/// does, the whole document up to the first back marker is body.
pub fn assign_segments(paragraphs: &mut [ParagraphRecord], options: &SegmentationOptions) {
    let title = chapter_title_regex(&options.first_chapter_title);
    let body_start = title
        .as_ref()
        .and_then(|re| paragraphs.iter().position(|p| re.is_match(&normalize(&p.text))))
        .unwrap_or_else(|| {
            log::debug!("first chapter '{}' not found, body starts at the top", options.first_chapter_title);
            0
        });

    let markers: Vec<String> = options.back_markers.iter().map(|m| compact_lowercase(m)).collect();
    let back_start = paragraphs
        .iter()
        .skip(body_start)
        .position(|p| markers.contains(&compact_lowercase(&p.text)))
        .map_or(paragraphs.len(), |offset| body_start + offset);

    for (i, p) in paragraphs.iter_mut().enumerate() {
        p.segment_type = if i < body_start {
            SegmentType::FrontMatter
        } else if i < back_start {
            SegmentType::BodyMatter
        } else {
            SegmentType::BackMatter
        };
    }
    log::debug!(
        "segments: front 0..{body_start}, body {body_start}..{back_start}, back {back_start}..{}",
        paragraphs.len()
    );
}
