//! PAIN.001 (ISO 20022) payment-initiation extractor.
//!
//! Only three pieces of a `pain.001.001.09` document are consumed: the group
//! header's `CtrlSum` and, for every `CdtTrfTxInf`, its `EndToEndId` and
//! `InstdAmt`. Elements are matched by local name within the pain.001.001.09
//! namespace; everything else is skipped.

use crate::error::{Error, Result};
use crate::types::{BatchWarning, PaymentBatch, Transaction};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use rust_decimal::Decimal;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Namespace of the supported message version.
pub const PAIN001_NAMESPACE: &str = "urn:iso:std:iso:20022:tech:xsd:pain.001.001.09";

/// Represents a parsed PAIN.001 document.
#[derive(Debug, Clone, PartialEq)]
pub struct Pain001Document {
    /// The extracted batch.
    pub batch: PaymentBatch,
}

impl Pain001Document {
    /// Parse a PAIN.001 document from any source implementing `Read`.
    ///
    /// Malformed input yields [`Error::MalformedDocument`] with an empty file
    /// name; use [`Pain001Document::from_path`] to get the name attached.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use pain_recon::pain001_format::Pain001Document;
    ///
    /// let mut file = File::open("batch.xml")?;
    /// let document = Pain001Document::from_read(&mut file)?;
    /// println!("{} transactions", document.batch.transaction_count());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let batch = parse_batch(BufReader::new(reader))?;
        Ok(Pain001Document { batch })
    }

    /// Parse the PAIN.001 document stored at `path`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut file = File::open(path)?;
        Self::from_read(&mut file).map_err(|e| e.in_file(&name))
    }
}

/// Elements the extractor cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    GrpHdr,
    CtrlSum,
    CdtTrfTxInf,
    EndToEndId,
    InstdAmt,
    Other,
}

impl Tag {
    fn classify(in_pain_namespace: bool, local_name: &[u8]) -> Self {
        if !in_pain_namespace {
            return Tag::Other;
        }
        match local_name {
            b"GrpHdr" => Tag::GrpHdr,
            b"CtrlSum" => Tag::CtrlSum,
            b"CdtTrfTxInf" => Tag::CdtTrfTxInf,
            b"EndToEndId" => Tag::EndToEndId,
            b"InstdAmt" => Tag::InstdAmt,
            _ => Tag::Other,
        }
    }
}

/// Fields collected for the transaction currently open.
#[derive(Debug, Default)]
struct PendingTransaction {
    index: usize,
    depth: usize,
    reference: Option<String>,
    amount: Option<String>,
}

impl PendingTransaction {
    fn finish(self) -> Result<Transaction> {
        let reference = self.reference.ok_or(Error::MissingField {
            field: "EndToEndId",
            transaction: self.index,
        })?;
        let raw = self.amount.ok_or(Error::MissingField {
            field: "InstdAmt",
            transaction: self.index,
        })?;

        let amount = parse_amount(&raw).ok_or_else(|| Error::InvalidAmount {
            value: raw.clone(),
            transaction: self.index,
        })?;

        Ok(Transaction { reference, amount })
    }
}

/// Text being collected for a field element.
#[derive(Debug)]
struct Capture {
    tag: Tag,
    depth: usize,
    text: String,
}

/// Streaming state over one document.
#[derive(Debug, Default)]
struct BatchParser {
    stack: Vec<Tag>,
    seen_root: bool,
    capture: Option<Capture>,
    pending: Option<PendingTransaction>,
    transactions_seen: usize,
    control_sum_text: Option<String>,
    transactions: Vec<Transaction>,
    warnings: Vec<BatchWarning>,
}

impl BatchParser {
    fn open(&mut self, tag: Tag, namespace: &str, is_empty: bool) -> Result<()> {
        if !self.seen_root {
            self.seen_root = true;
            if namespace != PAIN001_NAMESPACE {
                warn!(namespace, "root element is not in the pain.001.001.09 namespace");
                self.warnings
                    .push(BatchWarning::UnexpectedNamespace(namespace.to_string()));
            }
        } else if self.stack.is_empty() {
            return Err(malformed("multiple root elements".to_string()));
        }

        let parent = self.stack.last().copied();
        self.stack.push(tag);
        let depth = self.stack.len();

        match tag {
            Tag::CdtTrfTxInf if self.pending.is_none() => {
                self.transactions_seen += 1;
                self.pending = Some(PendingTransaction {
                    index: self.transactions_seen,
                    depth,
                    ..Default::default()
                });
            }
            Tag::CtrlSum if parent == Some(Tag::GrpHdr) && self.control_sum_text.is_none() => {
                self.capture = Some(Capture { tag, depth, text: String::new() });
            }
            Tag::EndToEndId | Tag::InstdAmt if self.wants(tag) => {
                self.capture = Some(Capture { tag, depth, text: String::new() });
            }
            _ => {}
        }

        if is_empty {
            self.close()?;
        }
        Ok(())
    }

    /// Whether the open transaction still needs the first value of `tag`.
    fn wants(&self, tag: Tag) -> bool {
        if self.capture.is_some() {
            return false;
        }
        match (&self.pending, tag) {
            (Some(p), Tag::EndToEndId) => p.reference.is_none(),
            (Some(p), Tag::InstdAmt) => p.amount.is_none(),
            _ => false,
        }
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.stack.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(malformed("text outside the root element".to_string()));
        }
        if let Some(capture) = self.capture.as_mut() {
            capture.text.push_str(text);
        }
        Ok(())
    }

    fn cdata(&mut self, text: &str) -> Result<()> {
        if self.stack.is_empty() {
            return Err(malformed("CDATA outside the root element".to_string()));
        }
        self.text(text)
    }

    fn close(&mut self) -> Result<()> {
        let depth = self.stack.len();

        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(capture) = self.capture.take() {
                let value = capture.text.trim().to_string();
                match (capture.tag, self.pending.as_mut()) {
                    (Tag::CtrlSum, _) => self.control_sum_text = Some(value),
                    (Tag::EndToEndId, Some(p)) => p.reference = Some(value),
                    (Tag::InstdAmt, Some(p)) => p.amount = Some(value),
                    _ => {}
                }
            }
        }

        if self.pending.as_ref().is_some_and(|p| p.depth == depth) {
            if let Some(pending) = self.pending.take() {
                let transaction = pending.finish()?;
                debug!(
                    reference = %transaction.reference,
                    amount = %transaction.amount,
                    "extracted transaction"
                );
                self.transactions.push(transaction);
            }
        }

        if self.stack.pop().is_none() {
            return Err(malformed("closing tag without an open element".to_string()));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<PaymentBatch> {
        if !self.seen_root {
            return Err(malformed("document has no root element".to_string()));
        }
        if !self.stack.is_empty() {
            return Err(malformed(format!(
                "unexpected end of document, {} element(s) left open",
                self.stack.len()
            )));
        }

        // An empty CtrlSum element carries no value, same as an absent one.
        let control_sum = match self.control_sum_text.take().filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(
                Decimal::from_str(&raw)
                    .map_err(|_| malformed(format!("invalid CtrlSum '{}'", raw)))?,
            ),
            None => {
                warn!("CtrlSum not found in group header, treating it as 0");
                self.warnings.push(BatchWarning::MissingControlSum);
                None
            }
        };

        PaymentBatch::new(self.transactions, control_sum, self.warnings)
    }
}

fn parse_batch<R: BufRead>(source: R) -> Result<PaymentBatch> {
    let mut reader = NsReader::from_reader(source);
    let mut parser = BatchParser::default();
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        let (resolved, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| xml_error(e, position))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let namespace = namespace_of(&resolved)?;
                let tag = Tag::classify(namespace == PAIN001_NAMESPACE, e.local_name().as_ref());
                let is_empty = matches!(event, Event::Empty(_));
                parser.open(tag, &namespace, is_empty)?;
            }
            Event::End(_) => parser.close()?,
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|e| xml_error(e, position))?;
                parser.text(&text)?;
            }
            Event::CData(ref e) => parser.cdata(&String::from_utf8_lossy(e))?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    parser.finish()
}

fn namespace_of(resolved: &ResolveResult) -> Result<String> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Ok(String::from_utf8_lossy(ns).into_owned()),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(malformed(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(prefix)
        ))),
    }
}

/// Parse an instructed amount as a non-negative exact decimal.
fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|amount| !amount.is_sign_negative())
}

fn malformed(message: String) -> Error {
    Error::MalformedDocument {
        file: String::new(),
        message,
    }
}

fn xml_error(err: impl fmt::Display, position: impl fmt::Display) -> Error {
    malformed(format!("{} (near byte {})", err, position))
}
