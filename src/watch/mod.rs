//! Watch mode: rebuild everything whenever a source changes.
//!
//! ```text
//! notify watcher → mpsc channel → Debouncer → build_all
//! ```

mod debouncer;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};

use crate::cli::Cli;
use crate::cli::build::build_all;
use crate::config::PackerConfig;
use crate::logger::{status_error, status_success, status_warning};
use crate::manifest::Manifest;
use crate::utils::plural_count;
use crate::{debug, log};
use debouncer::{ChangeKind, Debouncer, watch_key};

/// Longest the loop blocks before rechecking the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static WATCHING: AtomicBool = AtomicBool::new(false);

/// Install the Ctrl+C handler. Call once at program start.
///
/// Inside the watch loop Ctrl+C stops the loop after the current build;
/// anywhere else the process exits immediately.
pub fn setup_shutdown_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        if !WATCHING.load(Ordering::SeqCst) {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Build once, then rebuild on every debounced change until Ctrl+C.
///
/// A change to the config file reloads it before the rebuild. The set of
/// watched paths is fixed at startup.
pub fn watch(cli: &Cli, mut config: PackerConfig, manifest: &Manifest) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })
    .context("Failed to create file watcher")?;

    for path in config.watch_paths() {
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(&path, mode)
            .with_context(|| format!("Failed to watch {}", path.display()))?;
        debug!("watch"; "watching {}", path.display());
    }

    WATCHING.store(true, Ordering::SeqCst);
    rebuild(&config, manifest);
    log!("watch"; "watching {} for changes, Ctrl+C to stop",
        config.root_relative(&config.paths.source).display());

    let mut debouncer = Debouncer::new();
    while !is_shutdown() {
        match rx.recv_timeout(debouncer.sleep_duration().min(POLL_INTERVAL)) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(err)) => log!("watch"; "watcher error: {}", err),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(changes) = debouncer.take_if_ready() {
            log!("watch"; "{}", describe_changes(&config, &changes));
            if config_changed(&config, &changes) {
                match PackerConfig::load(cli) {
                    Ok(reloaded) => {
                        log!("watch"; "reloaded config");
                        config = reloaded;
                    }
                    Err(err) => {
                        status_error("config reload failed", &format!("{err:#}"));
                        continue;
                    }
                }
            }
            rebuild(&config, manifest);
        }
    }

    log!("watch"; "stopped");
    Ok(())
}

/// Run a full build and report it in the status block.
///
/// Failures are shown, not returned: the next change gets another try.
fn rebuild(config: &PackerConfig, manifest: &Manifest) {
    match build_all(config, manifest) {
        Ok(summary) if summary.skipped.is_empty() => {
            status_success(&format!(
                "wrote {}",
                plural_count(summary.outputs.len(), "file")
            ));
        }
        Ok(summary) => {
            status_warning(&format!("skipped {}", summary.skipped.join(", ")));
        }
        Err(err) => status_error("build failed", &format!("{err:#}")),
    }
}

fn config_changed(config: &PackerConfig, changes: &[(PathBuf, ChangeKind)]) -> bool {
    config
        .config_path
        .as_deref()
        .map(watch_key)
        .is_some_and(|key| changes.iter().any(|(path, _)| *path == key))
}

fn describe_changes(config: &PackerConfig, changes: &[(PathBuf, ChangeKind)]) -> String {
    match changes {
        [(path, kind)] => format!("{} {}", kind.label(), config.root_relative(path).display()),
        _ => format!("{} changed", plural_count(changes.len(), "file")),
    }
}
