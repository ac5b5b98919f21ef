//! PAIN.001 Reconciliation Library
//!
//! Extracts credit-transfer amounts from ISO 20022 `pain.001.001.09` payment
//! batches and checks them against the declared control sum.
//!
//! # Components
//!
//! - **Extractor** ([`pain001_format`]): one XML document in, one [`PaymentBatch`] out
//! - **Reconciler** ([`reconciliation`]): a directory of documents in, per-file
//!   results and a [`GlobalSummary`] out
//! - **Report / exports** ([`report`], [`export`]): text report, CSV and reference lists
//!
//! All amounts are exact [`rust_decimal::Decimal`] values; a file passes only
//! when its computed total equals the control sum exactly.
//!
//! # Examples
//!
//! ## Parsing one batch
//!
//! ```no_run
//! use std::path::Path;
//! use pain_recon::pain001_format::Pain001Document;
//!
//! let document = Pain001Document::from_path(Path::new("batch.xml"))?;
//! println!("Computed total: {}", document.batch.computed_total());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Reconciling a directory
//!
//! ```no_run
//! use pain_recon::{Reconciler, ReconcilerConfig};
//!
//! let reconciler = Reconciler::new(ReconcilerConfig::new("./batches"))?;
//! let report = reconciler.run()?;
//! for file_name in &report.summary.discrepancies {
//!     println!("difference in {}", file_name);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod pain001_format;
pub mod reconciliation;
pub mod report;
pub mod types;

// Re-export commonly used types
pub use audit::ReferenceIndex;
pub use config::{FileFilter, ReconcilerConfig};
pub use error::{Error, Result};
pub use reconciliation::{FileOutcome, GlobalSummary, ReconciliationReport, ReconciliationResult, Reconciler};
pub use types::{BatchWarning, PaymentBatch, Transaction};
