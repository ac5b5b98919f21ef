//! Human-readable reconciliation report.

use crate::error::Result;
use crate::reconciliation::{ReconciliationReport, ReconciliationResult};
use crate::types::{BatchWarning, PaymentBatch};
use rust_decimal::Decimal;
use std::io::Write;

/// Currency label printed next to amounts.
pub const CURRENCY: &str = "EUR";

/// Write the full report for a directory pass.
///
/// # Examples
///
/// ```no_run
/// use pain_recon::{report, Reconciler, ReconcilerConfig};
///
/// let reconciler = Reconciler::new(ReconcilerConfig::new("./batches"))?;
/// let result = reconciler.run()?;
/// report::write_report(&mut std::io::stdout(), &result)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_report<W: Write>(writer: &mut W, report: &ReconciliationReport) -> Result<()> {
    writeln!(writer, "=== PAIN.001 RECONCILIATION REPORT ===")?;

    for outcome in &report.outcomes {
        writeln!(writer)?;
        writeln!(writer, "File: {}", outcome.file_name)?;
        match outcome.result {
            Ok(ref result) => write_file_result(writer, result)?,
            Err(ref e) => writeln!(writer, "  ERROR: {}", e)?,
        }
    }

    let summary = &report.summary;
    writeln!(writer)?;
    writeln!(writer, "=== GLOBAL SUMMARY ===")?;
    writeln!(writer, "Files processed: {}", summary.file_count)?;
    writeln!(writer, "Files failed: {}", summary.failed_file_count)?;
    writeln!(writer, "Transactions: {}", summary.transaction_count)?;
    writeln!(writer, "Computed total: {} {}", summary.computed_total, CURRENCY)?;
    writeln!(writer, "Control sum total: {} {}", summary.control_sum_total, CURRENCY)?;
    writeln!(writer, "Difference total: {} {}", summary.difference_total, CURRENCY)?;
    writeln!(
        writer,
        "Files with difference: {} / {}",
        summary.discrepancies.len(),
        summary.file_count
    )?;

    writeln!(writer)?;
    if summary.is_balanced() {
        writeln!(writer, "VERDICT: all control sums match the computed totals.")?;
    } else {
        writeln!(
            writer,
            "VERDICT: differences detected, {} {} in total.",
            summary.difference_total, CURRENCY
        )?;
        writeln!(writer)?;
        writeln!(writer, "Files with a difference:")?;
        for (i, file_name) in summary.discrepancies.iter().enumerate() {
            writeln!(writer, "  {}. {}", i + 1, file_name)?;
        }
    }

    if report.summary.failed_file_count > 0 {
        writeln!(writer)?;
        writeln!(writer, "Files not processed:")?;
        for (i, (file_name, e)) in report.failures().enumerate() {
            writeln!(writer, "  {}. {}: {}", i + 1, file_name, e)?;
        }
    }

    let references = &report.references;
    if references.has_duplicates() {
        writeln!(writer)?;
        writeln!(
            writer,
            "Duplicate EndToEndId values ({} references, {} unique):",
            references.total(),
            references.unique_count()
        )?;
        for (reference, count) in references.duplicates() {
            writeln!(writer, "  '{}': {} occurrences", reference, count)?;
        }
    }

    Ok(())
}

fn write_file_result<W: Write>(writer: &mut W, result: &ReconciliationResult) -> Result<()> {
    writeln!(writer, "  Transactions: {}", result.transaction_count)?;
    writeln!(writer, "  Computed total: {} {}", result.computed_total, CURRENCY)?;
    write_control_sum(writer, result.declared_control_sum.as_ref())?;
    writeln!(writer, "  Difference: {} {}", result.difference, CURRENCY)?;
    for warning in &result.warnings {
        if *warning != BatchWarning::MissingControlSum {
            writeln!(writer, "  Warning: {}", warning)?;
        }
    }
    if result.is_balanced() {
        writeln!(writer, "  OK: sums match")?;
    } else {
        writeln!(writer, "  MISMATCH: difference of {} {}", result.difference, CURRENCY)?;
    }
    Ok(())
}

fn write_control_sum<W: Write>(writer: &mut W, control_sum: Option<&Decimal>) -> Result<()> {
    match control_sum {
        Some(sum) => writeln!(writer, "  Control sum: {} {}", sum, CURRENCY)?,
        None => writeln!(writer, "  Control sum: missing, treated as 0 {}", CURRENCY)?,
    }
    Ok(())
}

/// Write every reference and amount of a single batch, followed by its totals.
pub fn write_batch_listing<W: Write>(writer: &mut W, file_name: &str, batch: &PaymentBatch) -> Result<()> {
    writeln!(writer, "File: {}", file_name)?;
    for transaction in batch.transactions() {
        writeln!(
            writer,
            "Reference: {}, Amount: {}",
            transaction.reference, transaction.amount
        )?;
    }

    let result = ReconciliationResult::from_batch(file_name, batch)?;
    writeln!(writer)?;
    write_file_result(writer, &result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reconciliation::FileOutcome;
    use crate::types::Transaction;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn render(report: &ReconciliationReport) -> String {
        let mut out = Vec::new();
        write_report(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn reconciled(name: &str, amounts: &[(&str, &str)], control_sum: Option<&str>) -> (PaymentBatch, ReconciliationResult) {
        let transactions = amounts
            .iter()
            .map(|(reference, amount)| Transaction::new(*reference, dec(amount)))
            .collect();
        let warnings = match control_sum {
            Some(_) => Vec::new(),
            None => vec![BatchWarning::MissingControlSum],
        };
        let batch = PaymentBatch::new(transactions, control_sum.map(dec), warnings).unwrap();
        let result = ReconciliationResult::from_batch(name, &batch).unwrap();
        (batch, result)
    }

    fn push(report: &mut ReconciliationReport, batch: &PaymentBatch, result: ReconciliationResult) {
        report.references.record(batch);
        report.summary.record(&result).unwrap();
        report.outcomes.push(FileOutcome {
            file_name: result.file_name.clone(),
            result: Ok(result),
        });
    }

    #[test]
    fn test_balanced_report() {
        let mut report = ReconciliationReport::default();
        let (batch, result) = reconciled("a.xml", &[("A", "10.10"), ("B", "5.05")], Some("15.15"));
        push(&mut report, &batch, result);

        let text = render(&report);
        assert!(text.contains("File: a.xml\n  Transactions: 2\n  Computed total: 15.15 EUR"));
        assert!(text.contains("  Control sum: 15.15 EUR\n  Difference: 0.00 EUR\n  OK: sums match"));
        assert!(text.contains("Files with difference: 0 / 1"));
        assert!(text.contains("VERDICT: all control sums match"));
        assert!(!text.contains("Duplicate EndToEndId"));
    }

    #[test]
    fn test_report_with_mismatch_failure_and_duplicates() {
        let mut report = ReconciliationReport::default();
        let (batch, result) = reconciled("a.xml", &[("A", "1.00")], Some("1.00"));
        push(&mut report, &batch, result);
        let (batch, result) = reconciled("b.xml", &[("A", "2.00")], None);
        push(&mut report, &batch, result);

        report.summary.record_failure();
        report.outcomes.push(FileOutcome {
            file_name: "c.xml".to_string(),
            result: Err(Error::MissingField {
                field: "InstdAmt",
                transaction: 1,
            }),
        });

        let text = render(&report);
        assert!(text.contains("  Control sum: missing, treated as 0 EUR"));
        assert!(text.contains("  MISMATCH: difference of 2.00 EUR"));
        assert!(text.contains("File: c.xml\n  ERROR: transaction #1 is missing required field InstdAmt"));
        assert!(text.contains("Files processed: 2\nFiles failed: 1"));
        assert!(text.contains("Files with a difference:\n  1. b.xml\n"));
        assert!(text.contains("Files not processed:\n  1. c.xml: "));
        assert!(text.contains("  'A': 2 occurrences"));
    }

    #[test]
    fn test_batch_listing() {
        let (batch, _) = reconciled("x.xml", &[("R1", "1.50"), ("R2", "2.50")], Some("4.00"));
        let mut out = Vec::new();
        write_batch_listing(&mut out, "x.xml", &batch).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("File: x.xml\nReference: R1, Amount: 1.50\nReference: R2, Amount: 2.50\n"));
        assert!(text.contains("  Transactions: 2"));
        assert!(text.contains("  OK: sums match"));
    }
}
