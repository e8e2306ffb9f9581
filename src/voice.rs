//! Voice identifier normalization.
//!
//! The service addresses voice profiles by their style file name (`M1.json`),
//! while callers use the short label (`M1`).

/// Suffix the service expects on every voice identifier.
pub const VOICE_SUFFIX: &str = ".json";

/// Canonicalize a voice label. Pure, total and idempotent.
///
/// ```rust
/// use supertonic_client::voice::normalize;
///
/// assert_eq!(normalize(Some("F1")).as_deref(), Some("F1.json"));
/// assert_eq!(normalize(Some("F1.json")).as_deref(), Some("F1.json"));
/// assert_eq!(normalize(None), None);
/// ```
pub fn normalize(label: Option<&str>) -> Option<String> {
    label.map(normalize_label)
}

pub fn normalize_label(label: &str) -> String {
    if label.ends_with(VOICE_SUFFIX) {
        label.to_string()
    } else {
        format!("{}{}", label, VOICE_SUFFIX)
    }
}

/// Short label for display (`M1.json` -> `M1`).
pub fn display_label(identifier: &str) -> &str {
    identifier.strip_suffix(VOICE_SUFFIX).unwrap_or(identifier)
}
