//! Filter dispatch.

use super::error::{PackError, Result};
use super::markup;
use super::minify::{minify_css, minify_js};
use super::spec::Filter;
use super::text;
use crate::log;

/// Tunables for the named filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    /// Line limit for `markup-minify` (0 = unlimited)
    pub max_line_length: usize,
    /// Line limit for `markup-minify-ui` (0 = unlimited)
    pub ui_max_line_length: usize,
    /// Fail the asset on an unknown filter name instead of passing through
    pub strict: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            max_line_length: 80,
            ui_max_line_length: 500,
            strict: false,
        }
    }
}

/// Apply `filter` to `text`.
///
/// An unknown filter passes the text through with a warning unless
/// `options.strict` is set.
pub fn apply(text: &str, filter: Option<&Filter>, options: &FilterOptions) -> Result<String> {
    let Some(filter) = filter else {
        return Ok(text.to_string());
    };
    match filter {
        Filter::StyleMinify => on_source_text(text, minify_css),
        Filter::ScriptMinify => on_source_text(text, minify_js),
        Filter::MarkupMinify => {
            on_source_text(text, |s| markup::minify(s, options.max_line_length))
        }
        Filter::MarkupMinifyUi => {
            on_source_text(text, |s| markup::minify(s, options.ui_max_line_length))
        }
        Filter::Unknown(name) if options.strict => Err(PackError::UnknownFilter(name.clone())),
        Filter::Unknown(_) => {
            log!("warn"; "unknown filter `{}`, content left unfiltered", filter);
            Ok(text.to_string())
        }
    }
}

/// Run a minifier on the source as it was written.
///
/// `text` holds one char per source byte. Minifiers emit UTF-8 (decoded
/// entities and escapes included), so a UTF-8 source is handed over as such
/// and the result mapped back to one char per byte. Sources that are not
/// UTF-8 are minified as they are.
fn on_source_text(text: &str, minify: impl FnOnce(&str) -> Result<String>) -> Result<String> {
    let bytes = text::encode(text);
    match std::str::from_utf8(&bytes) {
        Ok(source) => Ok(text::decode(minify(source)?.as_bytes())),
        Err(_) => minify(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_is_identity() {
        let text = "  body { color: red }  ";
        assert_eq!(apply(text, None, &FilterOptions::default()).unwrap(), text);
    }

    #[test]
    fn test_unknown_filter_passes_through() {
        let filter = Filter::Unknown("brotli".into());
        let text = "<p>  keep   me </p>";
        assert_eq!(
            apply(text, Some(&filter), &FilterOptions::default()).unwrap(),
            text
        );
    }

    #[test]
    fn test_unknown_filter_strict() {
        let filter = Filter::Unknown("brotli".into());
        let options = FilterOptions {
            strict: true,
            ..FilterOptions::default()
        };
        assert!(matches!(
            apply("x", Some(&filter), &options),
            Err(PackError::UnknownFilter(name)) if name == "brotli"
        ));
    }

    #[test]
    fn test_markup_minify_keeps_output_utf8() {
        let source = text::decode("<p>Grün&nbsp;x &copy; &#9881;</p>".as_bytes());
        let out = apply(&source, Some(&Filter::MarkupMinify), &FilterOptions::default()).unwrap();

        let bytes = text::encode(&out);
        let html = std::str::from_utf8(&bytes).unwrap();
        assert!(html.contains("Grün\u{a0}x"));
        assert!(html.contains('©'));
        assert!(html.contains('⚙'));
    }

    #[test]
    fn test_markup_minify_single_byte_source() {
        let source = text::decode(b"<p>Gr\xfcn&nbsp;</p>");
        let out = apply(&source, Some(&Filter::MarkupMinify), &FilterOptions::default()).unwrap();

        let bytes = text::encode(&out);
        assert!(bytes.windows(5).any(|w| w == b"Gr\xfcn\xa0"));
    }

    #[test]
    fn test_style_minify_keeps_utf8_content() {
        let source = text::decode("a::after{content: 'Grün' }".as_bytes());
        let out = apply(&source, Some(&Filter::StyleMinify), &FilterOptions::default()).unwrap();
        assert!(std::str::from_utf8(&text::encode(&out)).unwrap().contains("Grün"));
    }

    #[test]
    fn test_markup_line_limits() {
        let html = "<div><p>one</p><p>two</p><p>three</p><p>four</p></div>";
        let narrow = FilterOptions {
            max_line_length: 16,
            ..FilterOptions::default()
        };
        let out = apply(html, Some(&Filter::MarkupMinify), &narrow).unwrap();
        assert!(out.lines().count() > 1);

        let ui = apply(html, Some(&Filter::MarkupMinifyUi), &narrow).unwrap();
        assert_eq!(ui.lines().count(), 1);
    }
}
