/// Lowercases and collapses every run of non-alphanumeric characters into a
/// single space, trimming the ends. Matching happens on this form only.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_space = true;
        }
    }
    out
}

const UNSAFE_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '&'];

/// Strips filesystem-unsafe characters, turns spaces into underscores and
/// caps the result at 50 characters. Output paths only, never matching.
pub fn clean_filename(text: &str) -> String {
    text.chars()
        .filter(|c| !UNSAFE_FILENAME_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .take(50)
        .collect()
}

/// Cuts over-long label text down to `max_length` characters, ellipsis included.
pub fn truncate_text(text: &str, max_length: usize) -> String {
    let count = text.chars().count();
    if count > max_length {
        let keep = max_length.saturating_sub(3);
        let mut out: String = text.chars().take(keep).collect();
        out.push_str("...");
        out
    } else {
        text.to_string()
    }
}
