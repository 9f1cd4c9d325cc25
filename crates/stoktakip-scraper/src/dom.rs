//! Small shared helpers over `scraper` element trees.

use scraper::ElementRef;

/// Concatenated, trimmed text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// Parses a quantity cell. The storefront renders plain digit runs
/// ("229917"); anything else — dashes, localized words, empty cells — is
/// treated as no quantity rather than zero.
pub(crate) fn parse_quantity(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quantity_accepts_digit_runs() {
        assert_eq!(parse_quantity("83"), Some(83));
        assert_eq!(parse_quantity("  229917 "), Some(229_917));
    }

    #[test]
    fn parse_quantity_rejects_non_numeric_cells() {
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("-"), None);
        assert_eq!(parse_quantity("12 adet"), None);
        assert_eq!(parse_quantity("1.200"), None);
    }
}
