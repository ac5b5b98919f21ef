//! CSV and text exports of a reconciliation run.
//!
//! A run exported to a directory produces, all stamped with the same local
//! time `%Y%m%d_%H%M%S`:
//!
//! - `transactions_<ts>.csv`: `File,Reference,Amount` for every transaction
//! - `end_to_end_ids_<ts>.txt`: sorted unique references, quoted and comma separated
//! - `duplicates_<ts>.txt`: references seen more than once (only if any)
//! - `errors_<ts>.txt`: per-file errors (only if any)

use crate::audit::ReferenceIndex;
use crate::error::Result;
use crate::reconciliation::ReconciliationReport;
use crate::types::PaymentBatch;
use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// One exported transaction row of a directory run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Reference")]
    pub reference: String,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
struct BatchRecord<'a> {
    #[serde(rename = "Reference")]
    reference: &'a str,
    #[serde(rename = "Amount")]
    amount: Decimal,
}

/// Collects transaction rows while batches stream past the reconciler.
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    rows: Vec<TransactionRecord>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, file_name: &str, batch: &PaymentBatch) {
        self.rows.extend(batch.transactions().iter().map(|tx| TransactionRecord {
            file: file_name.to_string(),
            reference: tx.reference.clone(),
            amount: tx.amount,
        }));
    }

    pub fn rows(&self) -> &[TransactionRecord] {
        &self.rows
    }

    /// Write the rows as CSV with a `File,Reference,Amount` header.
    pub fn write_csv<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut csv_writer = Writer::from_writer(writer);
        if self.rows.is_empty() {
            csv_writer.write_record(["File", "Reference", "Amount"])?;
        }
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Write one batch as `Reference,Amount` CSV.
pub fn write_batch_csv<W: Write>(writer: &mut W, batch: &PaymentBatch) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    if batch.transactions().is_empty() {
        csv_writer.write_record(["Reference", "Amount"])?;
    }
    for transaction in batch.transactions() {
        csv_writer.serialize(BatchRecord {
            reference: &transaction.reference,
            amount: transaction.amount,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write unique references as `'A',\n'B'` with no trailing separator.
pub fn write_reference_list<W: Write>(writer: &mut W, references: &ReferenceIndex) -> Result<()> {
    let quoted: Vec<String> = references.unique().map(|r| format!("'{}'", r)).collect();
    write!(writer, "{}", quoted.join(",\n"))?;
    Ok(())
}

pub fn write_duplicates<W: Write>(writer: &mut W, references: &ReferenceIndex) -> Result<()> {
    writeln!(writer, "Duplicates found:")?;
    writeln!(writer)?;
    for (reference, count) in references.duplicates() {
        writeln!(writer, "'{}' : {} occurrences", reference, count)?;
    }
    Ok(())
}

pub fn write_errors<W: Write>(writer: &mut W, report: &ReconciliationReport) -> Result<()> {
    for (file_name, e) in report.failures() {
        writeln!(writer, "{}: {}", file_name, e)?;
    }
    Ok(())
}

/// Writes the export files of one run into a directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    timestamp: String,
}

impl Exporter {
    /// Prepare `dir`, creating it when missing, with the current local time as stamp.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        Self::with_timestamp(dir, timestamp)
    }

    pub fn with_timestamp(dir: impl Into<PathBuf>, timestamp: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            timestamp: timestamp.into(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, stem: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.{}", stem, self.timestamp, extension))
    }

    /// Write every export of `report`; returns the paths written.
    pub fn export(&self, report: &ReconciliationReport, log: &TransactionLog) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let path = self.path_for("transactions", "csv");
        log.write_csv(&mut BufWriter::new(File::create(&path)?))?;
        written.push(path);

        let path = self.path_for("end_to_end_ids", "txt");
        write_to_file(&path, |w| write_reference_list(w, &report.references))?;
        written.push(path);

        if report.references.has_duplicates() {
            let path = self.path_for("duplicates", "txt");
            write_to_file(&path, |w| write_duplicates(w, &report.references))?;
            written.push(path);
        }

        if report.summary.failed_file_count > 0 {
            let path = self.path_for("errors", "txt");
            write_to_file(&path, |w| write_errors(w, report))?;
            written.push(path);
        }

        for path in &written {
            info!(path = %path.display(), "export written");
        }
        Ok(written)
    }
}

fn write_to_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transaction;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn batch(rows: &[(&str, &str)]) -> PaymentBatch {
        let transactions = rows
            .iter()
            .map(|(reference, amount)| Transaction::new(*reference, Decimal::from_str(amount).unwrap()))
            .collect();
        PaymentBatch::new(transactions, None, Vec::new()).unwrap()
    }

    #[test]
    fn test_transaction_log_csv() {
        let mut log = TransactionLog::new();
        log.record("a.xml", &batch(&[("E1", "10.10"), ("E2", "0.05")]));
        log.record("b.xml", &batch(&[("E3", "5.00")]));

        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "File,Reference,Amount\na.xml,E1,10.10\na.xml,E2,0.05\nb.xml,E3,5.00\n"
        );
    }

    #[test]
    fn test_empty_log_still_has_header() {
        let mut out = Vec::new();
        TransactionLog::new().write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "File,Reference,Amount\n");
    }

    #[test]
    fn test_batch_csv() {
        let mut out = Vec::new();
        write_batch_csv(&mut out, &batch(&[("R,1", "1.00")])).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Reference,Amount\n\"R,1\",1.00\n");
    }

    #[test]
    fn test_reference_list_format() {
        let mut index = ReferenceIndex::new();
        index.record(&batch(&[("B", "1"), ("A", "1"), ("B", "1")]));

        let mut out = Vec::new();
        write_reference_list(&mut out, &index).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "'A',\n'B'");

        let mut out = Vec::new();
        write_duplicates(&mut out, &index).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Duplicates found:\n\n'B' : 2 occurrences\n"
        );
    }
}
