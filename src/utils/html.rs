//! Minimal HTML escaping for text spliced into chat markup.

/// Escape the five characters that can break out of element text or a
/// double/single quoted attribute value.
///
/// `&` is replaced first so the entities produced for the other four
/// characters are never escaped a second time.
pub fn escape(text: &str) -> String {
    // Fast path, most chat lines contain none of these
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return text.to_string();
    }

    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
