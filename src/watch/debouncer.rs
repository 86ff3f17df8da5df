//! Event debouncing for watch mode.
//!
//! Every trigger reruns the whole build, so the debouncer only has to decide
//! *when*; the collected paths are kept for the log line.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::EventKind;
use notify::event::ModifyKind;
use rustc_hash::FxHashMap;

use crate::debug;
use crate::utils::path::normalize_path;

/// Quiet period after the last event before a rebuild starts.
pub const DEBOUNCE_MS: u64 = 300;
/// Minimum gap between two rebuilds.
pub const REBUILD_COOLDOWN_MS: u64 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }

    fn from_event(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            // mtime/chmod noise would otherwise retrigger forever
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Debouncer {
    changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
    last_build: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notify event.
    ///
    /// A file created and removed inside one window cancels out; otherwise
    /// the latest kind for a path wins.
    pub fn add_event(&mut self, event: &notify::Event) {
        let Some(kind) = ChangeKind::from_event(&event.kind) else {
            return;
        };

        let mut seen = false;
        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            seen = true;
            let path = watch_key(path);
            match (self.changes.get(&path).copied(), kind) {
                (Some(ChangeKind::Created), ChangeKind::Removed) => {
                    debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                (Some(ChangeKind::Created), ChangeKind::Modified) => {}
                _ => {
                    debug!("watch"; "{}: {}", kind.label(), path.display());
                    self.changes.insert(path, kind);
                }
            }
        }
        if seen {
            self.last_event = (!self.changes.is_empty()).then(Instant::now);
        }
    }

    /// Take the pending changes once the quiet period and cooldown have passed.
    pub fn take_if_ready(&mut self) -> Option<Vec<(PathBuf, ChangeKind)>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        self.last_build = Some(Instant::now());

        let mut changes: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        changes.sort();
        Some(changes)
    }

    pub fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        if last_event.elapsed() < Duration::from_millis(DEBOUNCE_MS) {
            return false;
        }
        if let Some(last_build) = self.last_build
            && last_build.elapsed() < Duration::from_millis(REBUILD_COOLDOWN_MS)
        {
            return false;
        }
        !self.changes.is_empty()
    }

    /// How long the watch loop may block before the next possible rebuild.
    pub fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        let debounce_remaining =
            Duration::from_millis(DEBOUNCE_MS).saturating_sub(last_event.elapsed());
        let cooldown_remaining = self
            .last_build
            .map(|t| Duration::from_millis(REBUILD_COOLDOWN_MS).saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        debounce_remaining
            .max(cooldown_remaining)
            .max(Duration::from_millis(1))
    }
}

/// Key for a changed path.
///
/// Only the parent directory is canonicalized: a removed file can no longer
/// be resolved, but it must key the same as when it was created.
pub fn watch_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => normalize_path(parent).join(name),
        _ => normalize_path(path),
    }
}

/// Editor swap/backup files and dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bak" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    fn modify() -> EventKind {
        EventKind::Modify(ModifyKind::Data(DataChange::Content))
    }

    fn age(debouncer: &mut Debouncer, ms: u64) {
        debouncer.last_event = Instant::now().checked_sub(Duration::from_millis(ms));
    }

    #[test]
    fn test_not_ready_inside_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(modify(), "/ui/index.htm"));
        assert!(debouncer.take_if_ready().is_none());
        assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));
    }

    #[test]
    fn test_ready_after_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(modify(), "/ui/index.htm"));
        debouncer.add_event(&event(modify(), "/ui/index.htm"));
        age(&mut debouncer, DEBOUNCE_MS + 50);

        let changes = debouncer.take_if_ready().unwrap();
        assert_eq!(changes, [(PathBuf::from("/ui/index.htm"), ChangeKind::Modified)]);
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_cooldown_after_build() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(modify(), "/ui/a.htm"));
        age(&mut debouncer, DEBOUNCE_MS + 50);
        assert!(debouncer.take_if_ready().is_some());

        debouncer.add_event(&event(modify(), "/ui/b.htm"));
        age(&mut debouncer, DEBOUNCE_MS + 50);
        assert!(!debouncer.is_ready());
    }

    #[test]
    fn test_created_then_removed_cancels() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(EventKind::Create(CreateKind::File), "/ui/x.htm"));
        debouncer.add_event(&event(EventKind::Remove(RemoveKind::File), "/ui/x.htm"));
        age(&mut debouncer, DEBOUNCE_MS + 50);
        assert!(debouncer.take_if_ready().is_none());
        assert!(debouncer.last_event.is_none());
        assert!(debouncer.sleep_duration() > Duration::from_secs(60));
    }

    #[cfg(unix)]
    #[test]
    fn test_created_then_removed_through_symlink_cancels() {
        use std::fs;

        let dir = tempfile::TempDir::new().unwrap();
        let real = dir.path().join("real");
        let link = dir.path().join("link");
        fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let file = link.join("x.htm");
        fs::write(&file, "x").unwrap();
        let mut debouncer = Debouncer::new();
        let created = notify::Event::new(EventKind::Create(CreateKind::File)).add_path(file.clone());
        debouncer.add_event(&created);
        fs::remove_file(&file).unwrap();
        let removed = notify::Event::new(EventKind::Remove(RemoveKind::File)).add_path(file);
        debouncer.add_event(&removed);

        assert!(debouncer.changes.is_empty());
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_ignores_metadata_and_temp_files() {
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)),
            "/ui/index.htm",
        ));
        debouncer.add_event(&event(modify(), "/ui/.index.htm.swp"));
        debouncer.add_event(&event(modify(), "/ui/index.htm~"));
        assert!(debouncer.last_event.is_none());
    }
}
