//! Input validation helpers
//!
//! Normalization applied to operator-entered text before it reaches the
//! store. Whitespace-only input is treated as absent.

/// Maximum borrower name length accepted from the reservation sheet.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum note length accepted from the annotate sheet.
pub const MAX_NOTE_LEN: usize = 500;

/// Trim a borrower name; `None` when nothing remains.
pub fn normalized_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_NAME_LEN {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trim an optional phone number; whitespace-only input collapses to `None`.
pub fn normalized_phone(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_name() {
        assert_eq!(normalized_name("  Mario Rossi "), Some("Mario Rossi".into()));
        assert_eq!(normalized_name("   "), None);
        assert_eq!(normalized_name(""), None);
        assert_eq!(normalized_name(&"x".repeat(MAX_NAME_LEN + 1)), None);
    }

    #[test]
    fn test_normalized_phone() {
        assert_eq!(
            normalized_phone(Some(" 333 1234567 ")),
            Some("333 1234567".into())
        );
        assert_eq!(normalized_phone(Some("   ")), None);
        assert_eq!(normalized_phone(None), None);
    }
}
