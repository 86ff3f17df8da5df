//! HTML utility functions.
//!
//! Provides the small amount of HTML knowledge the packer needs:
//! - `is_void_element()` - Self-closing elements (br, img, etc.)
//! - `is_raw_text_element()` - Raw text elements (script, style, ...)
//! - `has_optional_end_tag()` - Elements whose end tag may be omitted
//! - `parse_attributes()` / `render_attributes()` - attribute string round trip

/// Check if an HTML tag is a void element (self-closing).
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Check if tag content is raw text (never parsed as markup).
///
/// `pre` and `textarea` are included because their whitespace is significant,
/// so nothing may be inserted into them either.
#[inline]
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "pre" | "textarea")
}

/// Check if an element's end tag may be omitted in valid HTML.
#[inline]
pub fn has_optional_end_tag(tag: &str) -> bool {
    matches!(
        tag,
        "html"
            | "head"
            | "body"
            | "p"
            | "li"
            | "dt"
            | "dd"
            | "option"
            | "optgroup"
            | "thead"
            | "tbody"
            | "tfoot"
            | "tr"
            | "td"
            | "th"
            | "colgroup"
            | "rt"
            | "rp"
    )
}

/// Parse HTML-style attributes from a string.
///
/// Input: `rel="stylesheet" href='style.css' disabled`
/// Output: `vec![("rel", "stylesheet"), ("href", "style.css"), ("disabled", "")]`
///
/// Names are kept as written; a trailing `/` of a self-closing tag is ignored.
pub fn parse_attributes(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() || c == '/' {
            continue;
        }

        let mut name = String::new();
        name.push(c);
        while let Some(&next) = chars.peek() {
            if next == '=' || next == '/' || next.is_whitespace() {
                break;
            }
            name.push(next);
            chars.next();
        }

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek() == Some(&'=') {
            chars.next();

            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }

            let value = match chars.peek() {
                Some(&quote) if quote == '"' || quote == '\'' => {
                    chars.next();
                    let mut val = String::new();
                    for c in chars.by_ref() {
                        if c == quote {
                            break;
                        }
                        val.push(c);
                    }
                    val
                }
                _ => {
                    let mut val = String::new();
                    while let Some(&c) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        val.push(c);
                        chars.next();
                    }
                    val
                }
            };

            attrs.push((name, value));
        } else {
            // Boolean attribute
            attrs.push((name, String::new()));
        }
    }

    attrs
}

/// Render attributes back to a string with a leading space per attribute.
///
/// Boolean attributes (empty value) are rendered bare.
pub fn render_attributes(attrs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        if !value.is_empty() {
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
    }
    out
}

/// Look up an attribute value by case-insensitive name.
pub fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes_mixed_quotes() {
        let attrs = parse_attributes(r#"rel="stylesheet" href='style.css' disabled"#);
        assert_eq!(
            attrs,
            vec![
                ("rel".to_string(), "stylesheet".to_string()),
                ("href".to_string(), "style.css".to_string()),
                ("disabled".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_parse_attributes_self_closing_and_unquoted() {
        let attrs = parse_attributes("src=favicon.ico alt=icon /");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attr(&attrs, "SRC"), Some("favicon.ico"));
        assert_eq!(attr(&attrs, "alt"), Some("icon"));
    }

    #[test]
    fn test_render_attributes_round_trip() {
        let attrs = parse_attributes(r#"type="module" defer"#);
        assert_eq!(render_attributes(&attrs), r#" type="module" defer"#);
    }

    #[test]
    fn test_element_classes() {
        assert!(is_void_element("img"));
        assert!(!is_void_element("div"));
        assert!(is_raw_text_element("script"));
        assert!(has_optional_end_tag("li"));
        assert!(!has_optional_end_tag("div"));
    }
}
