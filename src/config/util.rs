//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// An absolute `config_name` is returned as-is when it exists.
///
/// # Example
/// ```text
/// /home/user/wled/wled00/data/  ← start
/// /home/user/wled/fwpack.toml   ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Check that `url` parses as an absolute URL.
pub fn is_valid_url(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|parsed| parsed.has_host())
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_walks_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("wled00/data");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("fwpack.toml"), "").unwrap();

        let found = find_config_file(Path::new("fwpack.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("fwpack.toml"));
    }

    #[test]
    fn test_find_config_absolute() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert_eq!(find_config_file(&path, dir.path()), None);

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://github.com/me/WLED"));
        assert!(!is_valid_url("github.com/me/WLED"));
        assert!(!is_valid_url("not a url"));
    }
}
