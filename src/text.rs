use unicode_normalization::UnicodeNormalization;

/// NFKC-folded text with runs of whitespace collapsed to one space and the
/// ends trimmed. Full-width digits and punctuation (`１．`) come out as ASCII.
pub fn normalize(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

