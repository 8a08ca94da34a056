//! Sequential batch extraction over a directory of decoded documents.
//!
//! One document is parsed and extracted before the next is opened. A failure
//! on one document is logged and recorded; the run continues.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::extract::{AnyExtractor, Extractor, ExtractorKind, Record};
use crate::parser::{DocumentParser, ParseOptions};

/// Extension of decoded page dumps.
pub const DEFAULT_EXTENSION: &str = "json";

/// Record produced for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOutput {
    /// File name of the source document
    pub file_name: String,
    /// Extracted record
    pub record: Record,
}

/// A document that could not be processed.
#[derive(Debug)]
pub struct BatchFailure {
    /// Path of the document
    pub path: PathBuf,
    /// What went wrong
    pub error: Error,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully extracted documents, in processing order
    pub successes: Vec<ExtractionOutput>,
    /// Documents that failed
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Total number of documents seen.
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if every document succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs one extractor over many documents.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    extractor: AnyExtractor,
    options: ParseOptions,
    extension: String,
    recursive: bool,
}

impl BatchProcessor {
    /// Create a processor using the built-in tables of `kind`.
    pub fn new(kind: ExtractorKind) -> Result<Self> {
        Ok(Self::with_extractor(AnyExtractor::new(kind)?))
    }

    /// Create a processor around an already configured extractor.
    pub fn with_extractor(extractor: impl Into<AnyExtractor>) -> Self {
        Self {
            extractor: extractor.into(),
            options: ParseOptions::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            recursive: false,
        }
    }

    /// Set parsing options used for every document.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Only pick up files with this extension (case-insensitive).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Descend into subdirectories.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// The extractor in use.
    pub fn extractor(&self) -> &AnyExtractor {
        &self.extractor
    }

    /// Parse and extract a single document.
    ///
    /// The decoder handle is released before this returns.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionOutput> {
        let path = path.as_ref();
        let document = {
            let parser = DocumentParser::open_with_options(path, self.options.clone())?;
            parser.parse()?
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(ExtractionOutput {
            file_name,
            record: self.extractor.extract(&document),
        })
    }

    /// Process every matching file in `dir`.
    ///
    /// Fails only if `dir` is not an existing directory. Files are processed
    /// in name order.
    pub fn process_directory<P: AsRef<Path>>(&self, dir: P) -> Result<BatchReport> {
        let files = self.collect_files(dir.as_ref())?;
        Ok(self.process_files(&files, |_, _| {}))
    }

    /// Process a list of files, calling `on_done` after each one.
    pub fn process_files<F>(&self, files: &[PathBuf], mut on_done: F) -> BatchReport
    where
        F: FnMut(&Path, bool),
    {
        let mut report = BatchReport::default();

        for path in files {
            match self.process_file(path) {
                Ok(output) => {
                    log::debug!("BatchProcessor: extracted {}", path.display());
                    report.successes.push(output);
                    on_done(path, true);
                }
                Err(error) => {
                    log::warn!("BatchProcessor: failed on {}: {}", path.display(), error);
                    report.failures.push(BatchFailure {
                        path: path.clone(),
                        error,
                    });
                    on_done(path, false);
                }
            }
        }

        log::info!(
            "BatchProcessor: {} succeeded, {} failed",
            report.successes.len(),
            report.failures.len()
        );
        report
    }

    /// Matching files under `dir`, sorted by name.
    pub fn collect_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(Error::ResourceNotFound(dir.to_path_buf()));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(if self.recursive { usize::MAX } else { 1 })
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("BatchProcessor: skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && self.matches_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .map_or(false, |e| e.to_string_lossy().eq_ignore_ascii_case(&self.extension))
    }
}
