//! Output clipping before the follow-up request.
//!
//! Hard cut at a character count. No attempt is made to land on a line or
//! word boundary.

/// Return the first `max_chars` characters of `text`, or `text` unchanged
/// if it is not longer than that.
pub fn truncate_output(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
