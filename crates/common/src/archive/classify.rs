//! Bundle filename classification
//!
//! No structured manifest accompanies a bundle, so a file's role is read
//! from its name. A name that merely mentions "summary" therefore lands in
//! the summary bucket; that is the documented behavior, not an accident.

/// Role a bundle file plays within an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleKind {
    Summary,
    /// Topic PDF with the tag derived from the filename.
    Topic(String),
}

impl BundleKind {
    pub fn is_summary(&self) -> bool {
        matches!(self, BundleKind::Summary)
    }
}

/// Classify a bundle file by its name.
///
/// Lowercased names containing "summary" or "bundle", or ending in
/// "-summary.pdf", are summaries; everything else is a topic PDF whose tag
/// is the lowercased name with the ".pdf" suffix stripped.
pub fn classify_bundle_file(name: &str) -> BundleKind {
    let lower = name.to_lowercase();
    if lower.contains("summary") || lower.contains("bundle") || lower.ends_with("-summary.pdf") {
        BundleKind::Summary
    } else {
        let topic = lower.strip_suffix(".pdf").unwrap_or(&lower).to_string();
        BundleKind::Topic(topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_names() {
        assert_eq!(classify_bundle_file("summary.pdf"), BundleKind::Summary);
        assert_eq!(classify_bundle_file("economy-summary.pdf"), BundleKind::Summary);
        assert_eq!(classify_bundle_file("daily-bundle.pdf"), BundleKind::Summary);
        assert_eq!(classify_bundle_file("SUMMARY.PDF"), BundleKind::Summary);
    }

    #[test]
    fn test_topic_names_derive_tag() {
        assert_eq!(
            classify_bundle_file("polity-governance.pdf"),
            BundleKind::Topic("polity-governance".into())
        );
        assert_eq!(
            classify_bundle_file("Economy.pdf"),
            BundleKind::Topic("economy".into())
        );
    }

    #[test]
    fn test_non_pdf_topic_keeps_full_name() {
        assert_eq!(
            classify_bundle_file("economy"),
            BundleKind::Topic("economy".into())
        );
    }
}
