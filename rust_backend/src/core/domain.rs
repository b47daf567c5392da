//! Domain models for uploaded sources and combination settings.
//!
//! A [`Source`] is one uploaded tabular file after parsing. The enums in this
//! module describe how a set of sources is checked and combined; they are
//! deserialized straight from the `[combine]` table of the dashboard config.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{CombineError, CombineResult};

/// A file as handed over by the presentation layer: its name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, keeping only its file name as the upload name.
    pub fn from_path(path: &Path) -> CombineResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                CombineError::Configuration(format!("Invalid upload path: {}", path.display()))
            })?
            .to_string();
        let bytes = std::fs::read(path)?;
        Ok(Self { file_name, bytes })
    }
}

/// Tabular formats the loader understands.
///
/// # Examples
///
/// ```
/// use udv_rust::core::domain::SourceFormat;
///
/// assert_eq!(SourceFormat::from_file_name("sales.CSV"), Some(SourceFormat::Csv));
/// assert_eq!(SourceFormat::from_file_name("stock.xlsx"), Some(SourceFormat::Xlsx));
/// assert_eq!(SourceFormat::from_file_name("notes.txt"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Xls,
}

impl SourceFormat {
    /// Detects the format from the file name extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?;
        Self::from_extension(extension)
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded file parsed into a table.
///
/// `name` is the uploaded file name. It keys the provenance map and is
/// embedded into column names in join mode, so it must be unique within one
/// combination request.
#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub format: SourceFormat,
    pub table: DataFrame,
}

impl Source {
    pub fn new(name: impl Into<String>, format: SourceFormat, table: DataFrame) -> Self {
        Self {
            name: name.into(),
            format,
            table,
        }
    }

    pub fn row_count(&self) -> usize {
        self.table.height()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.table.column(column).is_ok()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.table
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }
}

/// How sources are combined into one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationMode {
    /// Row-wise union; output rows = sum of input rows.
    Stack,
    /// Full outer join on the key column; one output row per key.
    #[default]
    Join,
}

impl fmt::Display for CombinationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stack => f.write_str("stack"),
            Self::Join => f.write_str("join"),
        }
    }
}

/// How strictly a source's columns must match the required column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnPolicy {
    /// The source's column set must equal the required set.
    Exact,
    /// The required columns must be present; others are allowed.
    #[default]
    Subset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::from_file_name("a.csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_file_name("A.XLS"), Some(SourceFormat::Xls));
        assert_eq!(SourceFormat::from_file_name("report.tar.xlsx"), Some(SourceFormat::Xlsx));
        assert_eq!(SourceFormat::from_file_name("no_extension"), None);
        assert_eq!(SourceFormat::from_file_name("data.json"), None);
    }

    #[test]
    fn test_upload_from_path_uses_file_name() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "ID\n1\n").unwrap();

        let upload = Upload::from_path(file.path()).unwrap();
        assert_eq!(upload.bytes, b"ID\n1\n");
        assert!(!upload.file_name.contains('/'));
    }

    #[test]
    fn test_mode_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: CombinationMode,
            policy: ColumnPolicy,
        }

        let parsed: Wrapper = toml::from_str("mode = \"stack\"\npolicy = \"exact\"").unwrap();
        assert_eq!(parsed.mode, CombinationMode::Stack);
        assert_eq!(parsed.policy, ColumnPolicy::Exact);
    }
}
