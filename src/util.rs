use crate::epub::DocumentKind;

/// Format a byte count as a human-readable size string.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Coarse asset category used by `asset list --type`.
pub fn asset_type(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Image => "image",
        DocumentKind::StyleSheet => "css",
        DocumentKind::Section => "section",
        _ => "other",
    }
}
