/// Normalize a key for indexing: lowercase, keeping only ASCII letters and
/// digits
///
/// `"Carothers, John Henry, House"` becomes `"carothersjohnhenryhouse"`.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
