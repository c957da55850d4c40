use ammonia;

/// Clean HTML content using the ammonia library.
///
/// This employs a whitelist-based sanitization strategy: it preserves safe
/// tags (like <b>, <p>) while stripping dangerous tags (like <script>,
/// <iframe>) and malicious attributes (like onclick).
///
/// Rich question stems arrive from the editor as HTML and are stored
/// verbatim, so this runs on every create/update as a fail-safe against
/// stored XSS reaching other staff clients.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
