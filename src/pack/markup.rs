//! Markup minification: well-formedness check, minify, line wrapping.
//!
//! The minifier itself is lenient, so malformed input is rejected up front
//! instead of ending up as silently broken output in firmware.

use super::error::{PackError, Result};
use super::minify::minify_html;
use crate::utils::html::{has_optional_end_tag, is_raw_text_element, is_void_element};

/// Check, minify and wrap markup to at most `max_line_length` columns.
///
/// A limit of `0` disables wrapping.
pub fn minify(html: &str, max_line_length: usize) -> Result<String> {
    check(html)?;
    let minified = minify_html(html);
    Ok(wrap_lines(&minified, max_line_length))
}

// ============================================================================
// Well-formedness
// ============================================================================

/// Reject unterminated tags/comments and unbalanced elements.
///
/// End tags that HTML allows to be omitted (`</p>`, `</li>`, ...) are not
/// required, everything else must be closed in order.
pub fn check(html: &str) -> Result<()> {
    let lower = html.to_ascii_lowercase();
    let mut stack: Vec<String> = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        let rest = &html[start..];

        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or_else(|| malformed(html, start, "unterminated comment"))?;
            pos = start + end + 3;
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest
                .find('>')
                .ok_or_else(|| malformed(html, start, "unterminated declaration"))?;
            pos = start + end + 1;
            continue;
        }

        let closing = rest.starts_with("</");
        let name_start = if closing { 2 } else { 1 };
        let name: String = rest[name_start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();

        // A bare `<` in text (`a < b`)
        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            pos = start + 1;
            continue;
        }

        let end = tag_end(rest, name_start + name.len())
            .ok_or_else(|| malformed(html, start, format!("unterminated <{name}> tag")))?;
        let self_closing = rest[..end].ends_with('/');
        pos = start + end + 1;

        if closing {
            close(&mut stack, &name).map_err(|message| malformed(html, start, message))?;
        } else if is_void_element(&name) || self_closing {
            continue;
        } else if is_raw_text_element(&name) {
            let needle = format!("</{name}");
            let close_at = lower[pos..]
                .find(&needle)
                .ok_or_else(|| malformed(html, start, format!("unclosed <{name}>")))?;
            // The end tag itself is handled by the next iteration.
            pos += close_at;
            stack.push(name);
        } else {
            stack.push(name);
        }
    }

    if let Some(open) = stack.iter().rev().find(|tag| !has_optional_end_tag(tag)) {
        return Err(PackError::Markup {
            line: html.matches('\n').count() + 1,
            message: format!("unclosed <{open}> at end of document"),
        });
    }
    Ok(())
}

/// Index of the `>` ending the tag that starts at `tag[0]`, honoring quotes.
fn tag_end(tag: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, c) in tag[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(from + idx),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

/// Pop `name` from the open element stack.
fn close(stack: &mut Vec<String>, name: &str) -> std::result::Result<(), String> {
    let Some(idx) = stack.iter().rposition(|tag| tag == name) else {
        return Err(format!("unexpected </{name}>"));
    };
    if let Some(open) = stack[idx + 1..]
        .iter()
        .find(|tag| !has_optional_end_tag(tag))
    {
        return Err(format!("</{name}> found while <{open}> is still open"));
    }
    stack.truncate(idx);
    Ok(())
}

fn malformed(html: &str, at: usize, message: impl Into<String>) -> PackError {
    PackError::Markup {
        line: html[..at].matches('\n').count() + 1,
        message: message.into(),
    }
}

// ============================================================================
// Line wrapping
// ============================================================================

/// Break lines longer than `max` between adjacent tags (`>` directly
/// followed by `<`), never inside a tag, a comment or a raw-text element.
///
/// Lines without a break opportunity stay long.
pub fn wrap_lines(html: &str, max: usize) -> String {
    if max == 0 {
        return html.to_string();
    }

    let units = break_points(html)
        .into_iter()
        .chain([html.len()])
        .scan(0, |start, end| {
            let unit = &html[*start..end];
            *start = end;
            Some(unit)
        });

    let mut out = String::with_capacity(html.len() + html.len() / max);
    let mut line_len = 0;
    for unit in units {
        let head = unit.split('\n').next().unwrap_or_default().chars().count();
        if line_len > 0 && line_len + head > max {
            out.push('\n');
            line_len = 0;
        }
        out.push_str(unit);
        match unit.rfind('\n') {
            Some(nl) => line_len = unit[nl + 1..].chars().count(),
            None => line_len += unit.chars().count(),
        }
    }
    out
}

/// Offsets of every `<` that directly follows the `>` closing a tag.
fn break_points(html: &str) -> Vec<usize> {
    let lower = html.to_ascii_lowercase();
    let bytes = html.as_bytes();
    let mut points = Vec::new();
    let mut raw: Option<&'static str> = None;
    let mut after_tag = false;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' || !starts_tag(&bytes[i + 1..]) {
            after_tag = false;
            i += 1;
            continue;
        }
        if let Some(tag) = raw {
            if lower[i..].starts_with("</") && lower[i + 2..].starts_with(tag) {
                raw = None;
            } else {
                i += 1;
                continue;
            }
        } else {
            if after_tag {
                points.push(i);
            }
            if lower[i..].starts_with("<!--") {
                i = lower[i..].find("-->").map_or(bytes.len(), |end| i + end + 3);
                after_tag = true;
                continue;
            }
            raw = raw_element_at(&lower[i + 1..]);
        }

        let Some(end) = tag_end(html, i + 1) else {
            break;
        };
        i = end + 1;
        after_tag = true;
    }
    points
}

/// `<` followed by a name, an end tag or a declaration.
fn starts_tag(rest: &[u8]) -> bool {
    rest.first()
        .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

/// Raw-text element opened by the tag whose name starts `s`.
fn raw_element_at(s: &str) -> Option<&'static str> {
    ["script", "style", "pre", "textarea"].into_iter().find(|tag| {
        s.starts_with(tag)
            && s[tag.len()..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
    })
}
