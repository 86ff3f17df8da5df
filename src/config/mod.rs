//! Packer configuration (`fwpack.toml`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section    # [paths], [metadata], [minify]
//! ├── meta       # package.json (version, repository)
//! ├── error      # ConfigError
//! ├── util       # config file lookup, URL checks
//! └── mod.rs     # PackerConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | `[paths]`    | Source directory, output directory, metadata file |
//! | `[metadata]` | Version / repository overrides, upstream URLs     |
//! | `[minify]`   | Line limits, document minification, strictness   |

mod error;
mod meta;
mod section;
mod util;

pub use error::ConfigError;
pub use meta::ProjectMeta;
pub use section::{MetadataConfig, MinifyConfig, PathsConfig};

use meta::validate_repository;
use util::find_config_file;

use crate::{
    cli::{BuildArgs, Cli},
    debug, log,
    pack::{Packer, RenderContext},
    utils::path::resolve_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing fwpack.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory - parent of config file, or cwd (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub minify: MinifyConfig,
}

impl PackerConfig {
    /// Load configuration for `cli`, searching upward from cwd.
    ///
    /// Without a config file every section keeps its defaults and the
    /// project root is the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        Self::load_from(cli, &cwd)
    }

    fn load_from(cli: &Cli, cwd: &Path) -> Result<Self> {
        let config_path = find_config_file(&cli.config, cwd);

        let mut config = match &config_path {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                Self::from_path(path)?
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
        config.config_path = config_path;

        config.apply_build_args(cli.build_args());
        config.normalize_paths();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            log!("warning"; "- {}", field);
        }
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        if args.verbose {
            crate::logger::set_verbose(true);
        }

        Self::update_option(&mut self.paths.source, args.source.as_ref());
        Self::update_option(&mut self.paths.output, args.output.as_ref());
        Self::update_option(&mut self.minify.document, args.minify.as_ref());
        Self::update_option(&mut self.minify.strict_filters, args.strict_filters.as_ref());
    }

    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve all paths against the root directory.
    fn normalize_paths(&mut self) {
        self.paths.source = resolve_path(&self.paths.source, &self.root);
        self.paths.output = resolve_path(&self.paths.output, &self.root);
        self.paths.metadata = resolve_path(&self.paths.metadata, &self.root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration after paths are resolved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.paths.source.is_dir() {
            return Err(ConfigError::Validation(format!(
                "source directory `{}` does not exist",
                self.paths.source.display()
            )));
        }
        if self.paths.output.is_file() {
            return Err(ConfigError::Validation(format!(
                "output path `{}` is a file",
                self.paths.output.display()
            )));
        }
        if let Some(repo) = &self.metadata.repository {
            validate_repository(repo)?;
        }
        Ok(())
    }

    // ========================================================================
    // derived values
    // ========================================================================

    /// Build the render context from `[metadata]` and the project metadata file.
    ///
    /// Values in `[metadata]` win over the metadata file.
    pub fn render_context(&self) -> Result<RenderContext> {
        let meta = ProjectMeta::load(&self.paths.metadata)?;
        if meta.is_none() {
            log!("warn"; "no project metadata at {}", self.root_relative(&self.paths.metadata).display());
        }
        let meta = meta.unwrap_or_default();

        let version = self.metadata.version.clone().or(meta.version.clone());
        let repository = match &self.metadata.repository {
            Some(repo) => Some(validate_repository(repo)?),
            None => meta.repository_url()?,
        };

        let mut context = RenderContext::new(version, repository);
        if let Some(upstream) = &self.metadata.upstream {
            context = context.with_upstream(upstream.clone());
        }
        Ok(context)
    }

    /// A packer for the configured source directory.
    pub fn packer(&self) -> Result<Packer> {
        let mut packer = Packer::new(&self.paths.source, self.render_context()?);
        packer.label_dir = self
            .root_relative(&self.paths.source)
            .to_string_lossy()
            .replace('\\', "/");
        packer.filters = self.minify.filter_options();
        packer.minify_document = self.minify.document;
        Ok(packer)
    }

    /// Paths whose changes trigger a rebuild in watch mode.
    pub fn watch_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.paths.source.clone()];
        if self.paths.metadata.is_file() {
            paths.push(self.paths.metadata.clone());
        }
        paths.extend(self.config_path.clone());
        paths
    }
}

// ============================================================================
// tests
// ============================================================================
