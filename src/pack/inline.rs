//! Document inliner.
//!
//! Turns an HTML document into one self-contained file:
//! - `<link rel="stylesheet" href>` -> `<style>` (with `url(...)` as data URIs)
//! - `<script src></script>` -> inline `<script>`
//! - `<img src>` and `<link rel="icon" href>` -> `data:` URIs
//!
//! Only markup is scanned: script and style bodies, including the ones
//! inlined here, are copied as they are.
//!
//! Remote references are kept. A local reference that does not resolve is an
//! error: a half-inlined UI is worse than no build.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::{Captures, Regex};

use super::error::{PackError, Result};
use crate::debug;
use crate::utils::html::{attr, parse_attributes, render_attributes};
use crate::utils::mime;

static LINK_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<link\b([^>]*)>").unwrap());
static RAW_TEXT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style)\b([^>]*)>").unwrap());
static IMG_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<img\b([^>]*)>").unwrap());
static CSS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).unwrap());
static SCRIPT_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</script").unwrap());

/// Read `path` and inline every local resource it references.
pub fn inline_document(path: &Path) -> Result<String> {
    let html = fs::read_to_string(path).map_err(|e| PackError::Read(path.to_path_buf(), e))?;
    Inliner::new(path).inline(&html)
}

/// Resolves references relative to the document that contains them.
struct Inliner<'a> {
    document: &'a Path,
    base: PathBuf,
}

impl<'a> Inliner<'a> {
    fn new(document: &'a Path) -> Self {
        let base = document
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self { document, base }
    }

    fn inline(&self, html: &str) -> Result<String> {
        let lower = html.to_ascii_lowercase();
        let mut out = String::with_capacity(html.len());
        let mut pos = 0;

        while let Some(caps) = RAW_TEXT_OPEN.captures_at(html, pos) {
            let (Some(open), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            out.push_str(&self.inline_markup(&html[pos..open.start()])?);

            // The end tag goes back through `inline_markup` with what follows.
            let needle = format!("</{}", name.as_str().to_ascii_lowercase());
            let close = lower[open.end()..]
                .find(&needle)
                .map_or(html.len(), |i| open.end() + i);
            let body = &html[open.end()..close];

            let inlined = if needle == "</script" && body.trim().is_empty() {
                self.inline_script(&caps[2])?
            } else {
                None
            };
            match inlined {
                Some(script) => out.push_str(&script),
                None => out.push_str(&html[open.start()..close]),
            }
            pos = close;
        }
        out.push_str(&self.inline_markup(&html[pos..])?);
        Ok(out)
    }

    /// Images first, so stylesheets inlined by the link pass are not rescanned.
    fn inline_markup(&self, markup: &str) -> Result<String> {
        let markup = replace_tags(markup, &IMG_TAG, |caps| self.inline_img(&caps[1]))?;
        replace_tags(&markup, &LINK_TAG, |caps| self.inline_link(&caps[1]))
    }

    fn inline_link(&self, raw_attrs: &str) -> Result<Option<String>> {
        let mut attrs = parse_attributes(raw_attrs);
        let rel = attr(&attrs, "rel").unwrap_or_default().to_ascii_lowercase();
        let Some(href) = attr(&attrs, "href").filter(|href| is_local(href)) else {
            return Ok(None);
        };
        let href = href.to_string();

        if rel.split_whitespace().any(|r| r == "stylesheet") {
            let path = self.resolve(&href)?;
            let css = read_text(&path)?;
            let css = self.inline_css_urls(&css, &path)?;
            debug!("inline"; "stylesheet {}", href);
            return Ok(Some(format!("<style>{css}</style>")));
        }
        if rel.split_whitespace().any(|r| r == "icon") {
            let uri = self.data_uri(&href)?;
            set_attr(&mut attrs, "href", uri);
            return Ok(Some(format!("<link{}>", render_attributes(&attrs))));
        }
        Ok(None)
    }

    /// Opening tag plus the script body; the end tag is left where it was.
    fn inline_script(&self, raw_attrs: &str) -> Result<Option<String>> {
        let attrs = parse_attributes(raw_attrs);
        let Some(src) = attr(&attrs, "src").filter(|src| is_local(src)) else {
            return Ok(None);
        };
        let path = self.resolve(src)?;
        let js = read_text(&path)?;
        let js = SCRIPT_END.replace_all(&js, r"<\/script");
        debug!("inline"; "script {}", src);

        let kept: Vec<_> = attrs
            .iter()
            .filter(|(name, _)| {
                !matches!(name.to_ascii_lowercase().as_str(), "src" | "defer" | "async")
            })
            .cloned()
            .collect();
        Ok(Some(format!("<script{}>{}", render_attributes(&kept), js)))
    }

    fn inline_img(&self, raw_attrs: &str) -> Result<Option<String>> {
        let mut attrs = parse_attributes(raw_attrs);
        let Some(src) = attr(&attrs, "src").filter(|src| is_local(src)) else {
            return Ok(None);
        };
        let uri = self.data_uri(src)?;
        set_attr(&mut attrs, "src", uri);
        Ok(Some(format!("<img{}>", render_attributes(&attrs))))
    }

    /// Replace local `url(...)` references in a stylesheet read from `css_path`.
    fn inline_css_urls(&self, css: &str, css_path: &Path) -> Result<String> {
        let base = css_path.parent().unwrap_or(&self.base);
        replace_tags(css, &CSS_URL, |caps| {
            let reference = caps[1].trim();
            if !is_local(reference) || reference.starts_with('#') {
                return Ok(None);
            }
            let path = self.resolve_from(base, reference)?;
            Ok(Some(format!("url(\"{}\")", encode_data_uri(&path)?)))
        })
    }

    fn data_uri(&self, reference: &str) -> Result<String> {
        let path = self.resolve(reference)?;
        encode_data_uri(&path)
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        self.resolve_from(&self.base, reference)
    }

    fn resolve_from(&self, base: &Path, reference: &str) -> Result<PathBuf> {
        let clean = reference
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches("./");
        let path = base.join(clean);
        if path.is_file() {
            Ok(path)
        } else {
            Err(PackError::MissingResource {
                reference: reference.to_string(),
                document: self.document.to_path_buf(),
            })
        }
    }
}

/// Rebuild `text` replacing every match of `re` for which `f` returns a value.
fn replace_tags(
    text: &str,
    re: &Regex,
    mut f: impl FnMut(&Captures) -> Result<Option<String>>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        match f(&caps)? {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// References that point into the source tree.
fn is_local(reference: &str) -> bool {
    let lower = reference.trim().to_ascii_lowercase();
    !(lower.is_empty()
        || lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("//")
        || lower.starts_with("data:")
        || lower.starts_with("javascript:"))
}

fn set_attr(attrs: &mut [(String, String)], name: &str, value: String) {
    if let Some(slot) = attrs.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        slot.1 = value;
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PackError::Read(path.to_path_buf(), e))
}

fn encode_data_uri(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| PackError::Read(path.to_path_buf(), e))?;
    Ok(format!(
        "data:{};base64,{}",
        mime::from_path(path),
        STANDARD.encode(bytes)
    ))
}
