pub mod compare;
pub mod diff;
pub mod docx;
mod error;
pub mod model;
pub mod report;
pub mod resolve;
pub mod segment;
pub mod store;
pub mod suggest;
pub mod template;
pub mod text;
pub mod tolerance;
pub mod units;

pub use diff::compare_document;
pub use error::Error;
pub use model::{DifferenceRecord, FormatValue, MappingMethod, ParagraphRecord, RunRecord};
pub use report::Report;
pub use segment::SegmentationOptions;
pub use suggest::StyleSuggestions;
pub use template::StyleTemplate;
pub use tolerance::ToleranceConfig;

use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    pub tolerance: ToleranceConfig,
    pub suggestions: Option<StyleSuggestions>,
    pub segmentation: SegmentationOptions,
}

/// Read a DOCX file, locate its body and report every formatting deviation
/// from `template`.
pub fn check_docx(input: &Path, template: &StyleTemplate, options: &CheckOptions) -> Result<Report, Error> {
    let mut paragraphs = docx::parse(input)?;
    segment::assign_segments(&mut paragraphs, &options.segmentation);
    let differences = compare_document(
        &paragraphs,
        template,
        &options.tolerance,
        options.suggestions.as_ref(),
    );
    Ok(Report::new(template.name(), differences))
}
