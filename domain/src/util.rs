//! Shared utility functions.

/// Truncate a string to at most `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Compact one-line preview of a JSON value for log lines.
///
/// Appends `…` when the rendering was cut.
pub fn json_preview(value: &serde_json::Value, max_bytes: usize) -> String {
    let rendered = value.to_string();
    let cut = truncate_str(&rendered, max_bytes);
    if cut.len() < rendered.len() {
        format!("{}…", cut)
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn truncate_multibyte_boundary() {
        let s = "あのね"; // 3 bytes per char
        assert_eq!(truncate_str(s, 4), "あ");
        assert_eq!(truncate_str(s, 6), "あの");
    }

    #[test]
    fn preview_short_value_untouched() {
        let value = serde_json::json!({"timezone": "America/Los_Angeles"});
        assert_eq!(json_preview(&value, 100), value.to_string());
    }

    #[test]
    fn preview_long_value_marked() {
        let value = serde_json::json!({"q": "x".repeat(50)});
        let preview = json_preview(&value, 10);
        assert!(preview.ends_with('…'));
        assert_eq!(preview.chars().count(), 11);
    }
}
