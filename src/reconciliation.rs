//! Folder reconciliation of PAIN.001 batches.
//!
//! Every matching file of the input directory is parsed independently. A file
//! that fails to parse is recorded with its error and the scan moves on; the
//! global totals only ever include files that parsed completely.

use crate::audit::ReferenceIndex;
use crate::config::ReconcilerConfig;
use crate::error::{Error, Result};
use crate::pain001_format::Pain001Document;
use crate::types::{BatchWarning, PaymentBatch};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Totals of one successfully parsed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub file_name: String,
    pub transaction_count: usize,
    pub computed_total: Decimal,
    /// Control sum as declared; `None` when the header has none.
    pub declared_control_sum: Option<Decimal>,
    /// `computed_total - control sum`, with a missing control sum counted as zero.
    pub difference: Decimal,
    pub warnings: Vec<BatchWarning>,
}

impl ReconciliationResult {
    /// Compute the totals of `batch`.
    ///
    /// Fails with [`Error::AmountOverflow`] when the difference does not fit.
    pub fn from_batch(file_name: impl Into<String>, batch: &PaymentBatch) -> Result<Self> {
        let computed_total = batch.computed_total();
        let difference = computed_total
            .checked_sub(batch.effective_control_sum())
            .ok_or_else(|| Error::AmountOverflow("control sum difference".to_string()))?;

        Ok(Self {
            file_name: file_name.into(),
            transaction_count: batch.transaction_count(),
            computed_total,
            declared_control_sum: batch.control_sum(),
            difference,
            warnings: batch.warnings().to_vec(),
        })
    }

    /// Control sum used in the comparison.
    pub fn control_sum(&self) -> Decimal {
        self.declared_control_sum.unwrap_or(Decimal::ZERO)
    }

    /// Exact decimal equality of computed total and control sum.
    pub fn is_balanced(&self) -> bool {
        self.difference.is_zero()
    }
}

/// What happened to one file of the scan.
#[derive(Debug)]
pub struct FileOutcome {
    /// Path relative to the input directory.
    pub file_name: String,
    pub result: Result<ReconciliationResult>,
}

/// Totals aggregated over every successfully reconciled file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GlobalSummary {
    pub file_count: usize,
    pub failed_file_count: usize,
    pub transaction_count: usize,
    pub computed_total: Decimal,
    pub control_sum_total: Decimal,
    pub difference_total: Decimal,
    /// Files whose difference is not zero, in processing order.
    pub discrepancies: Vec<String>,
}

impl GlobalSummary {
    /// Add one file to the totals. On overflow the summary is left unchanged.
    pub fn record(&mut self, result: &ReconciliationResult) -> Result<()> {
        let overflow = || Error::AmountOverflow("global totals".to_string());
        let computed_total = self
            .computed_total
            .checked_add(result.computed_total)
            .ok_or_else(overflow)?;
        let control_sum_total = self
            .control_sum_total
            .checked_add(result.control_sum())
            .ok_or_else(overflow)?;
        let difference_total = self
            .difference_total
            .checked_add(result.difference)
            .ok_or_else(overflow)?;

        self.file_count += 1;
        self.transaction_count += result.transaction_count;
        self.computed_total = computed_total;
        self.control_sum_total = control_sum_total;
        self.difference_total = difference_total;

        if !result.is_balanced() {
            self.discrepancies.push(result.file_name.clone());
        }
        Ok(())
    }

    pub fn record_failure(&mut self) {
        self.failed_file_count += 1;
    }

    /// No reconciled file shows a difference.
    pub fn is_balanced(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Result of a full directory pass.
#[derive(Debug, Default)]
pub struct ReconciliationReport {
    pub outcomes: Vec<FileOutcome>,
    pub summary: GlobalSummary,
    pub references: ReferenceIndex,
}

impl ReconciliationReport {
    /// Per-file errors, as `(file name, error)` pairs.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.outcomes.iter().filter_map(|outcome| match outcome.result {
            Err(ref e) => Some((outcome.file_name.as_str(), e)),
            Ok(_) => None,
        })
    }

    /// Successfully reconciled files.
    pub fn results(&self) -> impl Iterator<Item = &ReconciliationResult> {
        self.outcomes.iter().filter_map(|outcome| outcome.result.as_ref().ok())
    }
}

/// Runs the extractor over a directory and aggregates the results.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a reconciler after validating `config`.
    pub fn new(config: ReconcilerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// List the files to process, sorted by path.
    ///
    /// Fails with [`Error::DirectoryNotFound`] when the input directory is
    /// missing and [`Error::NoMatchingFiles`] when nothing matches the filter.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.config.input_dir();
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        self.collect_files(dir, &mut files)?;
        if files.is_empty() {
            return Err(Error::NoMatchingFiles(dir.to_path_buf()));
        }

        files.sort();
        Ok(files)
    }

    fn collect_files(&self, dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                if self.config.recursive {
                    self.collect_files(&entry.path(), files)?;
                }
            } else if self.config.filter.matches(&entry.file_name().to_string_lossy()) {
                files.push(entry.path());
            }
        }
        Ok(())
    }

    /// Reconcile every matching file of the input directory.
    pub fn run(&self) -> Result<ReconciliationReport> {
        self.run_with(|_, _| {})
    }

    /// Like [`Reconciler::run`], handing each reconciled batch to `on_batch`
    /// before it is dropped. Batches of failed files are never handed over.
    pub fn run_with<F>(&self, mut on_batch: F) -> Result<ReconciliationReport>
    where
        F: FnMut(&str, &PaymentBatch),
    {
        let files = self.discover_files()?;
        info!(
            directory = %self.config.input_dir().display(),
            files = files.len(),
            "starting reconciliation"
        );

        let mut report = ReconciliationReport::default();

        for path in &files {
            let file_name = self.display_name(path);
            info!(file = %file_name, "processing");

            let result = Pain001Document::from_path(path).and_then(|document| {
                let batch = document.batch;
                let reconciled = ReconciliationResult::from_batch(file_name.clone(), &batch)?;
                report.summary.record(&reconciled)?;
                on_batch(&file_name, &batch);
                report.references.record(&batch);
                Ok(reconciled)
            });

            match result {
                Ok(ref reconciled) if !reconciled.is_balanced() => {
                    warn!(
                        file = %file_name,
                        difference = %reconciled.difference,
                        "control sum mismatch"
                    );
                }
                Ok(_) => {}
                Err(ref e) => {
                    warn!(file = %file_name, error = %e, "file skipped");
                    report.summary.record_failure();
                }
            }

            report.outcomes.push(FileOutcome { file_name, result });
        }

        info!(
            files = report.summary.file_count,
            failed = report.summary.failed_file_count,
            discrepancies = report.summary.discrepancies.len(),
            "reconciliation finished"
        );
        Ok(report)
    }

    fn display_name(&self, path: &Path) -> String {
        path.strip_prefix(self.config.input_dir())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
