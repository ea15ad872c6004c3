//! Bullet cleanup for worker-produced text before it is reused as a label.

const BULLET_MARKERS: &[char] = &['-', '•'];

/// Trims `text` and strips one leading bullet marker (`-` or `•`) when it is
/// followed by whitespace or stands alone.
///
/// `"- Foo"` → `"Foo"`, `"• Bar "` → `"Bar"`, `"-5 degrees"` is left alone.
pub fn sanitize(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();

    if let Some(first) = chars.next() {
        let rest = chars.as_str();
        if BULLET_MARKERS.contains(&first) && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            return rest.trim().to_string();
        }
    }

    trimmed.to_string()
}

/// `sanitize(text)`, or `placeholder()` when nothing is left.
pub fn sanitize_or(text: &str, placeholder: impl FnOnce() -> String) -> String {
    let clean = sanitize(text);
    if clean.is_empty() {
        placeholder()
    } else {
        clean
    }
}
