//! Asset specs: what to read and how to render it.

use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Free-form rewrite applied to the filtered, substituted text of one asset.
pub type Mangle = fn(&str) -> String;

/// How an asset is rendered into generated source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Raw string literal (`const char NAME[] PROGMEM = R"...";`)
    Plaintext,
    /// Length constant plus byte array
    Binary,
}

/// Named content filter applied before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    StyleMinify,
    MarkupMinify,
    /// Markup minification with the longer line limit used for the main UI.
    MarkupMinifyUi,
    ScriptMinify,
    /// Unrecognized name, kept so the warning can show it.
    Unknown(String),
}

impl FromStr for Filter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "style-minify" | "css-minify" => Self::StyleMinify,
            "markup-minify" | "html-minify" => Self::MarkupMinify,
            "markup-minify-ui" | "html-minify-ui" => Self::MarkupMinifyUi,
            "script-minify" | "js-minify" => Self::ScriptMinify,
            other => Self::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StyleMinify => "style-minify",
            Self::MarkupMinify => "markup-minify",
            Self::MarkupMinifyUi => "markup-minify-ui",
            Self::ScriptMinify => "script-minify",
            Self::Unknown(name) => name,
        };
        f.write_str(name)
    }
}

/// Declarative description of one embedded asset.
///
/// # Example
///
/// ```ignore
/// AssetSpec::plaintext("style.css", "PAGE_settingsCss")
///     .wrap("=====(<style>", "</style>)=====")
///     .filter("css-minify")
///     .mangle(|s| s.replace('%', "%%"));
/// ```
#[derive(Debug, Clone)]
pub struct AssetSpec {
    /// Source file, relative to the source directory
    pub file: PathBuf,
    /// Symbol name in the generated header
    pub name: String,
    pub method: Method,
    /// Text placed right after `R"` (raw string delimiter, opening tags)
    pub prepend: String,
    /// Text placed right before the closing `"`
    pub append: String,
    pub filter: Option<Filter>,
    pub mangle: Option<Mangle>,
    /// Preprocessor token; when set the chunk is wrapped in `#ifdef TOKEN`
    pub guard: Option<String>,
}

impl AssetSpec {
    fn new(file: impl Into<PathBuf>, name: impl Into<String>, method: Method) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
            method,
            prepend: String::new(),
            append: String::new(),
            filter: None,
            mangle: None,
            guard: None,
        }
    }

    pub fn plaintext(file: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(file, name, Method::Plaintext)
    }

    pub fn binary(file: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self::new(file, name, Method::Binary)
    }

    #[must_use]
    pub fn wrap(mut self, prepend: impl Into<String>, append: impl Into<String>) -> Self {
        self.prepend = prepend.into();
        self.append = append.into();
        self
    }

    /// Set the filter by name; unknown names are kept as [`Filter::Unknown`].
    #[must_use]
    pub fn filter(mut self, name: &str) -> Self {
        self.filter = Some(name.parse().unwrap_or_else(|never| match never {}));
        self
    }

    #[must_use]
    pub fn mangle(mut self, mangle: Mangle) -> Self {
        self.mangle = Some(mangle);
        self
    }

    #[must_use]
    pub fn guard(mut self, token: impl Into<String>) -> Self {
        self.guard = Some(token.into());
        self
    }
}
