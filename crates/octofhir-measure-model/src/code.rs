//! Clinical code normalization

/// Normalize a diagnosis, procedure or lab code for comparison
///
/// Codes are trimmed, upper-cased and stripped of dots, so `z90.49`
/// and `Z9049` compare equal. Returns `None` for blank input.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if code.is_empty() { None } else { Some(code) }
}
