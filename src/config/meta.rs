//! Project metadata (`package.json`).

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::ConfigError;
use super::util::is_valid_url;
use crate::pack::normalize_repository_url;

/// npm allows `repository` as a bare string or as `{ "type": ..., "url": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Repository {
    Url(String),
    Object { url: String },
}

/// The fields of `package.json` the packer cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectMeta {
    pub version: Option<String>,
    repository: Option<Repository>,
}

impl ProjectMeta {
    /// Load metadata from `path`; `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let meta = serde_json::from_str(&content)
            .map_err(|err| ConfigError::Json(path.to_path_buf(), err))?;
        Ok(Some(meta))
    }

    /// Repository URL without `git+` / `.git` decorations.
    pub fn repository_url(&self) -> Result<Option<String>, ConfigError> {
        let raw = match &self.repository {
            Some(Repository::Url(url) | Repository::Object { url }) => url,
            None => return Ok(None),
        };
        validate_repository(raw).map(Some)
    }
}

/// Normalize `raw` and check it is an absolute URL.
pub fn validate_repository(raw: &str) -> Result<String, ConfigError> {
    let url = normalize_repository_url(raw);
    if is_valid_url(&url) {
        Ok(url)
    } else {
        Err(ConfigError::Validation(format!(
            "repository `{raw}` is not a valid URL"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(json: &str) -> ProjectMeta {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_repository_object() {
        let meta = parse(
            r#"{"name":"wled","version":"0.15.0","repository":{"type":"git","url":"git+https://github.com/Aircoookie/WLED.git"}}"#,
        );
        assert_eq!(meta.version.as_deref(), Some("0.15.0"));
        assert_eq!(
            meta.repository_url().unwrap().as_deref(),
            Some("https://github.com/Aircoookie/WLED")
        );
    }

    #[test]
    fn test_repository_string() {
        let meta = parse(r#"{"repository":"https://github.com/me/fork"}"#);
        assert_eq!(
            meta.repository_url().unwrap().as_deref(),
            Some("https://github.com/me/fork")
        );
    }

    #[test]
    fn test_missing_fields() {
        let meta = parse("{}");
        assert!(meta.version.is_none());
        assert!(meta.repository_url().unwrap().is_none());
    }

    #[test]
    fn test_invalid_repository() {
        let meta = parse(r#"{"repository":"me/fork"}"#);
        assert!(matches!(
            meta.repository_url(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        assert!(ProjectMeta::load(&path).unwrap().is_none());

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ProjectMeta::load(&path),
            Err(ConfigError::Json(..))
        ));
    }
}
