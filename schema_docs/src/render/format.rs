//! Display formatting helpers
//!
//! Pure functions mapping raw catalog values into the strings used by the
//! rendered documents.

/// Character limit applied to long definition texts in markdown sections
pub const TRUNCATE_LIMIT: usize = 100;

/// Rewrite verbose SQL type names into compact display forms.
/// Unmapped type names are returned unchanged.
pub fn normalize_type(
    raw: &str,
    max_length: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> String {
    match raw {
        "character varying" => match max_length {
            Some(n) => format!("varchar({})", n),
            None => "varchar".to_string(),
        },
        "timestamp without time zone" => "timestamp".to_string(),
        "numeric" => match (precision, scale) {
            (Some(p), Some(s)) if s > 0 => format!("numeric({},{})", p, s),
            (Some(p), _) => format!("numeric({})", p),
            _ => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// Render a boolean as the affirmative/negative token pair used in the documents
pub fn boolean_glyph(value: bool) -> &'static str {
    if value {
        "✅ OUI"
    } else {
        "❌ NON"
    }
}

/// Truncate to `max_length` characters, marking the cut with an ellipsis.
/// Counts characters, not bytes.
pub fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let head: String = text.chars().take(max_length).collect();
    format!("{}...", head)
}
