//! Reconciler configuration.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Case-insensitive file-name suffix filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    suffix: String,
}

impl FileFilter {
    /// Create a filter matching names that end with `suffix`.
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into().to_lowercase(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether `file_name` ends with the configured suffix, ignoring case.
    pub fn matches(&self, file_name: &str) -> bool {
        !self.suffix.is_empty() && file_name.to_lowercase().ends_with(&self.suffix)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(".xml")
    }
}

impl FromStr for FileFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let pattern = s.trim().trim_start_matches('*');
        if pattern.is_empty() {
            return Err(Error::InvalidConfig(format!("empty file filter '{}'", s)));
        }
        Ok(FileFilter::new(pattern))
    }
}

/// Everything a reconciliation run needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilerConfig {
    /// Directory holding the PAIN.001 files.
    pub input_dir: PathBuf,

    /// Report file; `None` writes the report to stdout.
    pub output: Option<PathBuf>,

    /// Which files in the directory are considered.
    pub filter: FileFilter,

    /// Descend into subdirectories.
    pub recursive: bool,

    /// Directory receiving the CSV and text exports.
    pub export_dir: Option<PathBuf>,
}

impl ReconcilerConfig {
    /// Create a configuration for a flat scan of `.xml` files in `input_dir`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output: None,
            filter: FileFilter::default(),
            recursive: false,
            export_dir: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_export_dir(mut self, export_dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(export_dir.into());
        self
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("input directory is empty".to_string()));
        }
        if self.filter.suffix().is_empty() {
            return Err(Error::InvalidConfig("file filter is empty".to_string()));
        }
        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(Error::InvalidConfig(format!(
                    "report output '{}' is a directory",
                    output.display()
                )));
            }
        }
        Ok(())
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = FileFilter::default();
        assert!(filter.matches("batch.xml"));
        assert!(filter.matches("BATCH.XML"));
        assert!(filter.matches("Pain.Xml"));
        assert!(!filter.matches("batch.xml.bak"));
        assert!(!filter.matches("notes.txt"));
    }

    #[test]
    fn test_filter_from_str() {
        let filter: FileFilter = "*.PAIN".parse().unwrap();
        assert_eq!(filter.suffix(), ".pain");
        assert!(filter.matches("a.pain"));
        assert!("*".parse::<FileFilter>().is_err());
        assert!("  ".parse::<FileFilter>().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ReconcilerConfig::new("/data/pain")
            .with_output("/tmp/report.txt")
            .recursive(true)
            .with_export_dir("/tmp/out");

        assert_eq!(config.input_dir(), Path::new("/data/pain"));
        assert_eq!(config.output, Some(PathBuf::from("/tmp/report.txt")));
        assert!(config.recursive);
        assert_eq!(config.filter, FileFilter::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_input() {
        assert!(matches!(
            ReconcilerConfig::new("").validate(),
            Err(Error::InvalidConfig(_))
        ));
        let config = ReconcilerConfig::new("/data").with_filter(FileFilter::new(""));
        assert!(config.validate().is_err());
    }
}
