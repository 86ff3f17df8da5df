//! `[paths]`, `[metadata]` and `[minify]` sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pack::FilterOptions;

/// `[paths]` - where sources live and headers go (relative to project root)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// UI source directory
    pub source: PathBuf,
    /// Directory the generated headers are written to
    pub output: PathBuf,
    /// npm-style project metadata (`version`, `repository`)
    pub metadata: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "wled00/data".into(),
            output: "wled00".into(),
            metadata: "package.json".into(),
        }
    }
}

/// `[metadata]` - overrides for values otherwise read from project metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetadataConfig {
    pub version: Option<String>,
    pub repository: Option<String>,
    /// Repository URLs in the sources that are rewritten to `repository`
    pub upstream: Option<Vec<String>>,
}

/// `[minify]`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MinifyConfig {
    /// Line limit for `markup-minify` (0 disables wrapping)
    pub max_line_length: usize,
    /// Line limit for `markup-minify-ui` and the UI document
    pub ui_max_line_length: usize,
    /// Minify the UI document before compressing it
    pub document: bool,
    /// Fail an asset with an unknown filter name instead of passing it through
    pub strict_filters: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        let filters = FilterOptions::default();
        Self {
            max_line_length: filters.max_line_length,
            ui_max_line_length: filters.ui_max_line_length,
            document: true,
            strict_filters: filters.strict,
        }
    }
}

impl MinifyConfig {
    pub const fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            max_line_length: self.max_line_length,
            ui_max_line_length: self.ui_max_line_length,
            strict: self.strict_filters,
        }
    }
}
