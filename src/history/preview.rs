//! Markup previews for history entries

use super::{ClipboardEntry, ContentKind};
use crate::config::PreviewConfig;

const ELLIPSIS: char = '…';
const IMAGE_DATA_PREFIX: &str = "data:image/";

/// Render a kind-specific preview safe to drop into the overlay markup
pub fn preview(entry: &ClipboardEntry, config: &PreviewConfig) -> String {
    let content = entry.content.as_str();

    match entry.kind {
        ContentKind::Url => format!(
            "<a href='{content}' target='_blank' \
             style='color:#8b5cf6;text-decoration:underline;'>{content}</a>"
        ),
        ContentKind::Code => {
            format!(
                "<pre style='background:rgba(99,102,241,0.08);padding:8px 12px;\
                 border-radius:8px;font-size:12px;overflow-x:auto;'>{}</pre>",
                escape_truncated(content, config.code_limit)
            )
        }
        ContentKind::Path => format!("<span style='color:#34C759;'>{content}</span>"),
        ContentKind::Text | ContentKind::Document if content.starts_with(IMAGE_DATA_PREFIX) => {
            format!(
                "<img src='{content}' style='max-width:60px;max-height:40px;\
                 border-radius:6px;box-shadow:0 2px 8px rgba(0,0,0,0.12);' />"
            )
        }
        ContentKind::Text | ContentKind::Document => {
            let (head, truncated) = truncate_chars(content, config.text_limit);
            if truncated {
                format!("<span>{head}{ELLIPSIS}</span>")
            } else {
                format!("<span>{head}</span>")
            }
        }
    }
}

/// Split `s` after `limit` characters; the flag reports whether anything was cut
fn truncate_chars(s: &str, limit: usize) -> (&str, bool) {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => (&s[..idx], true),
        None => (s, false),
    }
}

/// Escape `<`/`>` and keep at most `limit` characters of the escaped text
///
/// Entities are kept whole: one that would cross the limit is dropped.
fn escape_truncated(s: &str, limit: usize) -> String {
    let mut out = String::with_capacity(s.len().min(limit));
    let mut used = 0;

    for c in s.chars() {
        let entity = match c {
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            _ => None,
        };
        let width = entity.map_or(1, str::len);
        if used + width > limit {
            break;
        }
        match entity {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
        used += width;
    }
    out
}
