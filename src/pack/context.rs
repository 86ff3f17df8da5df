//! Render context: project-wide values substituted into every asset.

/// Token replaced with the project version.
pub const VERSION_PLACEHOLDER: &str = "##VERSION##";

/// Repository URLs the UI sources link to, rewritten to the configured one.
pub const DEFAULT_UPSTREAMS: &[&str] = &[
    "https://github.com/atuline/WLED",
    "https://github.com/Aircoookie/WLED",
];

/// Version and repository URL, built once per run from project metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub version: Option<String>,
    pub repository: Option<String>,
    /// Upstream URLs replaced with `repository`
    pub upstream: Vec<String>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            version: None,
            repository: None,
            upstream: DEFAULT_UPSTREAMS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl RenderContext {
    pub fn new(version: Option<String>, repository: Option<String>) -> Self {
        Self {
            version,
            repository,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_upstream(mut self, upstream: Vec<String>) -> Self {
        self.upstream = upstream;
        self
    }

    /// Substitute repository URLs and the version placeholder.
    ///
    /// Missing values leave the text untouched.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        if let Some(repo) = &self.repository {
            for upstream in &self.upstream {
                if upstream != repo && out.contains(upstream.as_str()) {
                    out = out.replace(upstream.as_str(), repo);
                }
            }
        }
        if let Some(version) = &self.version {
            out = out.replace(VERSION_PLACEHOLDER, version);
        }
        out
    }
}

/// Strip npm-style decorations from a repository URL.
///
/// `git+https://github.com/me/WLED.git` -> `https://github.com/me/WLED`
pub fn normalize_repository_url(raw: &str) -> String {
    let url = raw.trim();
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);
    url.trim_end_matches('/').to_string()
}
