/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Integer field, or `None` if it is not a plain (optionally signed) integer.
pub fn parse_int(raw: &str) -> Option<i64> {
    clean_str(raw).trim().parse().ok()
}

/// Decimal field that may use a comma as the decimal separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    clean_str(raw).trim().replace(',', ".").parse().ok()
}
