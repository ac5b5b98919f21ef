//! Payment batch data extracted from PAIN.001 documents.

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One credit-transfer entry (`CdtTrfTxInf`) of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// End-to-end identifier. Not guaranteed unique.
    pub reference: String,

    /// Instructed amount, never negative.
    pub amount: Decimal,
}

impl Transaction {
    /// Create a new transaction.
    pub fn new(reference: impl Into<String>, amount: Decimal) -> Self {
        Self {
            reference: reference.into(),
            amount,
        }
    }
}

/// Non-fatal findings recorded while parsing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchWarning {
    /// The group header carries no `CtrlSum`; it is treated as zero.
    MissingControlSum,
    /// The root element is not in the pain.001.001.09 namespace.
    UnexpectedNamespace(String),
}

impl fmt::Display for BatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchWarning::MissingControlSum => {
                write!(f, "CtrlSum not found in group header, treated as 0")
            }
            BatchWarning::UnexpectedNamespace(ns) if ns.is_empty() => {
                write!(f, "root element has no namespace")
            }
            BatchWarning::UnexpectedNamespace(ns) => {
                write!(f, "unexpected root namespace '{}'", ns)
            }
        }
    }
}

/// One parsed PAIN.001 document.
///
/// A batch is immutable once built; [`PaymentBatch::new`] computes the exact
/// total up front so reading it later cannot fail.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PaymentBatch {
    transactions: Vec<Transaction>,
    control_sum: Option<Decimal>,
    warnings: Vec<BatchWarning>,
    total: Decimal,
}

impl PaymentBatch {
    /// Build a batch, failing with [`Error::AmountOverflow`] when the amounts
    /// cannot be summed exactly.
    pub fn new(
        transactions: Vec<Transaction>,
        control_sum: Option<Decimal>,
        warnings: Vec<BatchWarning>,
    ) -> Result<Self> {
        let total = transactions
            .iter()
            .try_fold(Decimal::ZERO, |acc, tx| acc.checked_add(tx.amount))
            .ok_or_else(|| Error::AmountOverflow("sum of transaction amounts".to_string()))?;

        Ok(Self {
            transactions,
            control_sum,
            warnings,
            total,
        })
    }

    /// Transactions in document order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Declared group-header control sum.
    pub fn control_sum(&self) -> Option<Decimal> {
        self.control_sum
    }

    pub fn warnings(&self) -> &[BatchWarning] {
        &self.warnings
    }

    /// Exact sum of all transaction amounts; zero for an empty batch.
    pub fn computed_total(&self) -> Decimal {
        self.total
    }

    /// Control sum with the missing case treated as zero.
    pub fn effective_control_sum(&self) -> Decimal {
        self.control_sum.unwrap_or(Decimal::ZERO)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
