//! Content classification heuristics

use super::ContentKind;

/// Map raw clipboard text to a [`ContentKind`]
///
/// Rules are checked in order and the first match wins, so code snippets that
/// also contain `/` or happen to be short never end up as paths or text.
pub fn classify(content: &str) -> ContentKind {
    if content.starts_with("http://") || content.starts_with("https://") {
        ContentKind::Url
    } else if content.contains("import ") || content.contains("func ") || content.contains('{') {
        ContentKind::Code
    } else if content.contains('/')
        && content.contains('.')
        && !content.chars().any(char::is_whitespace)
    {
        ContentKind::Path
    } else if content.chars().count() < 20 && !content.contains('\n') {
        ContentKind::Text
    } else {
        ContentKind::Document
    }
}
