/// Header normalization.
///
/// Turns a free-form column header such as `"PE Code"` or `" Performance
/// Expectation (PE) "` into a lowercase, underscore-delimited token
/// (`pe_code`, `performance_expectation_pe`). Normalization is idempotent.

/// Normalize a raw header.
///
/// Lowercases the input, replaces every maximal run of characters outside
/// `[a-z0-9]` with a single underscore, and trims underscores at both ends.
///
/// ```
/// use ngss_toolkit::normalize_header;
///
/// assert_eq!(normalize_header("PE Code"), "pe_code");
/// assert_eq!(normalize_header("__Cross-cutting  Concepts!"), "cross_cutting_concepts");
/// assert_eq!(normalize_header(""), "");
/// ```
pub fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for ch in raw.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    out
}
