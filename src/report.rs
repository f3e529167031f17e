use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Error;
use crate::model::DifferenceRecord;

const PROPERTY_SEPARATOR: &str = "---------------";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_differences: usize,
    pub differences_by_property: BTreeMap<String, usize>,
    /// Target style, then property, to count.
    pub differences_by_style: BTreeMap<String, BTreeMap<String, usize>>,
}

impl Summary {
    pub fn from_differences(differences: &[DifferenceRecord]) -> Self {
        let mut summary = Summary { total_differences: differences.len(), ..Summary::default() };
        for d in differences {
            *summary.differences_by_property.entry(d.property.clone()).or_default() += 1;
            *summary
                .differences_by_style
                .entry(d.target_style_name.clone())
                .or_default()
                .entry(d.property.clone())
                .or_default() += 1;
        }
        summary
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub template_name: String,
    pub summary: Summary,
    pub details: Vec<DifferenceRecord>,
}

impl Report {
    pub fn new(template_name: impl Into<String>, details: Vec<DifferenceRecord>) -> Self {
        Report {
            template_name: template_name.into(),
            summary: Summary::from_differences(&details),
            details,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.details.is_empty()
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable listing, one block per paragraph. Within a block each
    /// property shows its expectation once, followed by every deviating
    /// actual value.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let mut rest = self.details.as_slice();
        while let Some(first) = rest.first() {
            let len = rest
                .iter()
                .position(|d| d.paragraph_index != first.paragraph_index)
                .unwrap_or(rest.len());
            let (block, tail) = rest.split_at(len);
            rest = tail;

            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "[格式问题 - 段落 {}]", first.paragraph_number());

            let mut properties: Vec<&str> = Vec::new();
            for d in block {
                if !properties.contains(&d.property.as_str()) {
                    properties.push(&d.property);
                }
            }
            for (i, property) in properties.iter().enumerate() {
                if i > 0 {
                    let _ = writeln!(out, "{PROPERTY_SEPARATOR}");
                }
                let mut entries = block.iter().filter(|d| d.property == *property).peekable();
                let _ = writeln!(out, "属性: {property}");
                if let Some(d) = entries.peek() {
                    let _ = writeln!(out, "  预期: {}", d.expected_value);
                }
                for d in entries {
                    match &d.location_detail {
                        Some(location) => {
                            let _ = writeln!(out, "  实际: {} ({location})", d.actual_value);
                        }
                        None => {
                            let _ = writeln!(out, "  实际: {}", d.actual_value);
                        }
                    }
                }
            }
        }
        out
    }
}
