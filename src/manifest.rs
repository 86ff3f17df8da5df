//! Built-in output set: which sources end up in which header.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::pack::AssetSpec;

/// Raw string delimiters used for every HTML page.
const RAW_OPEN: &str = "=====(";
const RAW_CLOSE: &str = ")=====";

/// Preprocessor token guarding DMX pages.
pub const DMX_GUARD: &str = "WLED_ENABLE_DMX";

static STYLESHEET_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<link rel="?stylesheet"?[^>]*>"#).unwrap());
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style>.*</style>").unwrap());
static DMX_MENU: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<form action="?/settings/dmx"?>.*?</form>"#).unwrap());
static MSG_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h2>.*</body>").unwrap());
static FM_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)function FM\(\) ?\{").unwrap());

/// The gzipped UI document.
#[derive(Debug, Clone)]
pub struct DocumentTarget {
    /// Source document, relative to the source directory
    pub file: PathBuf,
    /// Symbol suffix: `PAGE_<page>`, `PAGE_<page>_L`
    pub page: String,
    /// Header file, relative to the output directory
    pub output: PathBuf,
}

/// One chunk header and the assets it contains, in output order.
#[derive(Debug, Clone)]
pub struct Batch {
    pub output: PathBuf,
    pub specs: Vec<AssetSpec>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub document: DocumentTarget,
    pub batches: Vec<Batch>,
}

/// The firmware's web UI.
pub fn firmware() -> Manifest {
    Manifest {
        document: DocumentTarget {
            file: "index.htm".into(),
            page: "index".into(),
            output: "html_ui.h".into(),
        },
        batches: vec![
            Batch {
                output: "html_settings.h".into(),
                specs: settings_specs(),
            },
            Batch {
                output: "html_other.h".into(),
                specs: other_specs(),
            },
        ],
    }
}

fn page(file: &str, name: &str) -> AssetSpec {
    AssetSpec::plaintext(file, name)
        .wrap(RAW_OPEN, RAW_CLOSE)
        .filter("html-minify")
}

fn settings_specs() -> Vec<AssetSpec> {
    vec![
        AssetSpec::plaintext("style.css", "PAGE_settingsCss")
            .wrap("=====(<style>", "</style>)=====")
            .filter("css-minify")
            .mangle(escape_percent),
        page("settings.htm", "PAGE_settings").mangle(settings_menu),
        page("settings_wifi.htm", "PAGE_settings_wifi").mangle(settings_page),
        page("settings_leds.htm", "PAGE_settings_leds").mangle(settings_page),
        page("settings_dmx.htm", "PAGE_settings_dmx")
            .mangle(settings_page)
            .guard(DMX_GUARD),
        page("settings_ui.htm", "PAGE_settings_ui").mangle(settings_page),
        page("settings_sync.htm", "PAGE_settings_sync").mangle(settings_page),
        page("settings_time.htm", "PAGE_settings_time").mangle(settings_page),
        page("settings_sec.htm", "PAGE_settings_sec").mangle(settings_page),
        page("settings_um.htm", "PAGE_settings_um").mangle(settings_page),
    ]
}

fn other_specs() -> Vec<AssetSpec> {
    vec![
        page("msg.htm", "PAGE_msg").mangle(message_page),
        page("dmxmap.htm", "PAGE_dmxmap")
            .mangle(dmx_map)
            .guard(DMX_GUARD),
        page("update.htm", "PAGE_update"),
        page("welcome.htm", "PAGE_welcome"),
        page("liveview.htm", "PAGE_liveview"),
        page("404.htm", "PAGE_404"),
        page("usermod.htm", "PAGE_usermod"),
        AssetSpec::binary("favicon.ico", "favicon"),
    ]
}

// ============================================================================
// Mangles
// ============================================================================

/// `%` starts a template token at runtime, so literal ones are doubled.
pub fn escape_percent(text: &str) -> String {
    text.replace('%', "%%")
}

/// Settings pages get their stylesheet and values from the server:
/// the stylesheet link is dropped and the inline style block becomes
/// `%CSS%%SCRIPT%`.
pub fn settings_page(text: &str) -> String {
    let text = STYLESHEET_LINK.replace_all(text, "");
    STYLE_BLOCK
        .replace_all(&text, "%CSS%%SCRIPT%")
        .into_owned()
}

/// Settings menu: like any settings page, with the DMX entry supplied at runtime.
pub fn settings_menu(text: &str) -> String {
    let text = settings_page(text);
    DMX_MENU.replace_all(&text, "%DMXMENU%").into_owned()
}

/// Message page: everything from the heading on is the runtime message.
pub fn message_page(text: &str) -> String {
    MSG_BODY.replace_all(text, "<h2>%MSG%</body>").into_owned()
}

/// DMX map: channel variables are injected at the top of `FM()`.
pub fn dmx_map(text: &str) -> String {
    FM_HEAD
        .replace_all(text, "function FM() {%DMXVARS%\n")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::spec::Method;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_output_set() {
        let manifest = firmware();
        assert_eq!(manifest.document.output, PathBuf::from("html_ui.h"));
        assert_eq!(manifest.document.page, "index");

        let outputs: Vec<_> = manifest.batches.iter().map(|b| b.output.clone()).collect();
        assert_eq!(
            outputs,
            [PathBuf::from("html_settings.h"), PathBuf::from("html_other.h")]
        );

        for batch in &manifest.batches {
            let names: FxHashSet<_> = batch.specs.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names.len(), batch.specs.len(), "duplicate symbol in {:?}", batch.output);
        }
    }

    #[test]
    fn test_dmx_pages_are_guarded() {
        let guarded: Vec<_> = firmware()
            .batches
            .iter()
            .flat_map(|b| b.specs.iter())
            .filter(|s| s.guard.as_deref() == Some(DMX_GUARD))
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(guarded, ["PAGE_settings_dmx", "PAGE_dmxmap"]);
    }

    #[test]
    fn test_favicon_is_last_and_binary() {
        let manifest = firmware();
        let other = &manifest.batches[1];
        let last = other.specs.last().unwrap();
        assert_eq!(last.name, "favicon");
        assert_eq!(last.method, Method::Binary);
    }

    #[test]
    fn test_settings_page_mangle() {
        let html = r#"<head><link rel="stylesheet" href="style.css"><style>.x{width:1%}</style></head><body>ok</body>"#;
        assert_eq!(
            settings_page(html),
            "<head>%CSS%%SCRIPT%</head><body>ok</body>"
        );
    }

    #[test]
    fn test_settings_menu_mangle() {
        let html = r#"<style>a{}</style><form action="/settings/dmx"><button>DMX</button></form><form action="/settings/sec"></form>"#;
        assert_eq!(
            settings_menu(html),
            r#"%CSS%%SCRIPT%%DMXMENU%<form action="/settings/sec"></form>"#
        );
    }

    #[test]
    fn test_message_and_dmx_mangles() {
        assert_eq!(
            message_page("<body><h2>Sample</h2><p>text</p></body></html>"),
            "<body><h2>%MSG%</body></html>"
        );
        assert_eq!(
            dmx_map("<script>function FM() {var a=1;}</script>"),
            "<script>function FM() {%DMXVARS%\nvar a=1;}</script>"
        );
    }

    #[test]
    fn test_escape_percent() {
        assert_eq!(escape_percent("width:50%;height:1%"), "width:50%%;height:1%%");
    }
}
