//! Output files: the gzipped UI document and chunk batches.

use std::fs;
use std::path::{Path, PathBuf};

use super::chunk::{self, ChunkEnv};
use super::context::RenderContext;
use super::error::{PackError, Result, truncate};
use super::filter::FilterOptions;
use super::gzip::gzip;
use super::inline::inline_document;
use super::markup;
use super::spec::AssetSpec;
use crate::utils::plural_count;
use crate::{debug, log};

/// Longest diagnostic shown when an asset is skipped.
const WARN_MESSAGE_LEN: usize = 60;

/// Header of every chunk file.
pub const CHUNK_FILE_HEADER: &str = "/*
 * More web UI HTML source arrays.
 * This file is auto generated, please don't make any changes manually.
 * Instead, see https://kno.wled.ge/advanced/custom-features/#changing-web-ui
 * to find out how to easily modify the web UI source!
 */
";

/// Header of the gzipped UI document file.
pub const DOCUMENT_FILE_HEADER: &str = "/*
 * Binary array for the Web UI.
 * gzip is used for smaller size and improved speeds.
 *
 * Please see https://kno.wled.ge/advanced/custom-features/#changing-web-ui
 * to find out how to easily modify the web UI source!
 */
";

/// Append-only buffer for one generated file.
#[derive(Debug)]
pub struct ChunkWriter {
    buf: Vec<u8>,
}

impl ChunkWriter {
    pub fn new() -> Self {
        Self {
            buf: CHUNK_FILE_HEADER.as_bytes().to_vec(),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Write the buffer once, creating the parent directory if needed.
    pub fn write_to(self, dest: &Path) -> Result<()> {
        write_file(dest, &self.buf)
    }
}

/// Outcome of one chunk batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

/// Outcome of packing the UI document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// The document as it went into the compressor
    pub html: String,
    pub compressed_len: usize,
}

/// Runs assets through the pipeline and writes generated headers.
#[derive(Debug, Clone)]
pub struct Packer {
    pub source_dir: PathBuf,
    /// How the source directory is named in provenance comments
    pub label_dir: String,
    pub context: RenderContext,
    pub filters: FilterOptions,
    /// Minify the UI document before compressing it
    pub minify_document: bool,
}

impl Packer {
    pub fn new(source_dir: impl Into<PathBuf>, context: RenderContext) -> Self {
        let source_dir = source_dir.into();
        Self {
            label_dir: source_dir.to_string_lossy().replace('\\', "/"),
            source_dir,
            context,
            filters: FilterOptions::default(),
            minify_document: true,
        }
    }

    fn env(&self) -> ChunkEnv<'_> {
        ChunkEnv {
            source_dir: &self.source_dir,
            label_dir: &self.label_dir,
            context: &self.context,
            filters: &self.filters,
        }
    }

    /// Render `specs` in order into `dest`.
    ///
    /// A spec that fails is skipped with a warning; only writing `dest`
    /// itself can fail the batch.
    pub fn write_chunks(&self, specs: &[AssetSpec], dest: &Path) -> Result<BatchReport> {
        let env = self.env();
        let mut writer = ChunkWriter::new();
        let mut report = BatchReport::default();

        for spec in specs {
            match chunk::render(spec, &env) {
                Ok(chunk) => {
                    debug!("pack"; "{} from {}", spec.name, env.label(spec));
                    writer.push(&chunk);
                    report.written.push(spec.name.clone());
                }
                Err(err) => {
                    log!("warn"; "{}", skip_warning(spec, &env.label(spec), &err));
                    report.skipped.push(spec.name.clone());
                }
            }
        }

        log!("pack"; "writing {} to {}", plural_count(specs.len(), "chunk"), dest.display());
        writer.write_to(dest)?;
        Ok(report)
    }

    /// Inline, substitute, minify and gzip `file` into `PAGE_<page>` in `dest`.
    ///
    /// Every failure here is fatal to the run.
    pub fn write_document(&self, file: &Path, page: &str, dest: &Path) -> Result<DocumentReport> {
        let path = self.source_dir.join(file);
        let label = self.env().label(&AssetSpec::binary(file, page));

        log!("ui"; "reading {}", label);
        let html = inline_document(&path)?;
        log!("ui"; "inlined {} characters", html.chars().count());

        let html = self.context.apply(&html);
        let html = if self.minify_document {
            let minified = markup::minify(&html, self.filters.ui_max_line_length)?;
            log!("ui"; "minified to {} characters", minified.chars().count());
            minified
        } else {
            html
        };

        let compressed = gzip(html.as_bytes())?;
        log!("ui"; "compressed {} bytes", compressed.len());

        let literal = chunk::binary_literal(&format!("PAGE_{page}"), "_L", &compressed)?;
        let source = format!(
            "{DOCUMENT_FILE_HEADER}\n{}\n{literal}\n",
            chunk::provenance(&label)
        );
        log!("ui"; "writing {}", dest.display());
        write_file(dest, source.as_bytes())?;

        Ok(DocumentReport {
            html,
            compressed_len: compressed.len(),
        })
    }
}

/// One-line warning for an asset left out of its batch.
fn skip_warning(spec: &AssetSpec, label: &str, err: &PackError) -> String {
    let message = err.diagnostic();
    format!(
        "failed {} from {}: {}",
        spec.name,
        label,
        truncate(&message, WARN_MESSAGE_LEN)
    )
}

fn write_file(dest: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PackError::Write(parent.to_path_buf(), e))?;
    }
    fs::write(dest, bytes).map_err(|e| PackError::Write(dest.to_path_buf(), e))
}
