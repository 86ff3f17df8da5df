//! One full packing run.
//!
//! Phases:
//! - **Document** - inline, minify and gzip the UI document (fatal on error)
//! - **Chunks** - render every batch of the manifest (per-asset failures are skipped)

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::{
    config::PackerConfig,
    debug, log,
    manifest::Manifest,
    pack::BatchReport,
    utils::plural_count,
};

/// What one run produced.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Header files written, in order
    pub outputs: Vec<PathBuf>,
    /// Assets left out because they failed
    pub skipped: Vec<String>,
}

/// Generate every header described by `manifest`.
pub fn build_all(config: &PackerConfig, manifest: &Manifest) -> Result<BuildSummary> {
    let started = Instant::now();
    let packer = config.packer()?;
    let output_dir = &config.paths.output;
    let mut summary = BuildSummary::default();

    let document = &manifest.document;
    let dest = output_dir.join(&document.output);
    let report = packer
        .write_document(&document.file, &document.page, &dest)
        .with_context(|| format!("Failed to pack {}", document.file.display()))?;
    debug!("ui"; "{} characters packed into {} bytes",
        report.html.chars().count(), report.compressed_len);
    summary.outputs.push(dest);

    for batch in &manifest.batches {
        let dest = output_dir.join(&batch.output);
        let BatchReport { written, skipped } = packer
            .write_chunks(&batch.specs, &dest)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        debug!("pack"; "{}: {}", config.root_relative(&dest).display(), written.join(", "));
        summary.skipped.extend(skipped);
        summary.outputs.push(dest);
    }

    if summary.skipped.is_empty() {
        log!("pack"; "wrote {} in {:.2?}", plural_count(summary.outputs.len(), "file"), started.elapsed());
    } else {
        log!("pack"; "wrote {}, skipped {} in {:.2?}",
            plural_count(summary.outputs.len(), "file"),
            plural_count(summary.skipped.len(), "asset"),
            started.elapsed());
    }
    Ok(summary)
}
