use std::path::Path;

use crate::core::domain::{Source, SourceFormat, Upload};
use crate::error::{CombineError, CombineResult};
use crate::parsing::{csv_parser, excel_parser};
use crate::transformations::cleaning;

/// Options applied to every loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Remove columns whose every value is missing.
    pub drop_empty_columns: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            drop_empty_columns: true,
        }
    }
}

/// Unified interface for loading uploaded CSV and Excel files.
#[derive(Debug, Clone, Default)]
pub struct SourceLoader {
    options: LoadOptions,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    /// Load a source from its file name and raw bytes (format from the extension)
    pub fn load(&self, file_name: &str, bytes: &[u8]) -> CombineResult<Source> {
        let format = SourceFormat::from_file_name(file_name).ok_or_else(|| {
            CombineError::UnsupportedFormat {
                file_name: file_name.to_string(),
                extension: Path::new(file_name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("")
                    .to_string(),
            }
        })?;

        let mut table = match format {
            SourceFormat::Csv => csv_parser::parse_csv(file_name, bytes)?,
            SourceFormat::Xlsx | SourceFormat::Xls => {
                excel_parser::parse_workbook(file_name, format, bytes)?
            }
        };

        if self.options.drop_empty_columns {
            let dropped = cleaning::empty_columns(&table);
            if !dropped.is_empty() {
                log::debug!("Dropping empty columns from '{}': {:?}", file_name, dropped);
                table = cleaning::drop_empty_columns(&table)?;
            }
        }

        log::info!(
            "Loaded '{}' ({}): {} rows x {} columns",
            file_name,
            format,
            table.height(),
            table.width()
        );

        Ok(Source::new(file_name, format, table))
    }

    pub fn load_upload(&self, upload: &Upload) -> CombineResult<Source> {
        self.load(&upload.file_name, &upload.bytes)
    }

    /// Load a source from disk; the file name becomes the source name
    pub fn load_from_file(&self, path: &Path) -> CombineResult<Source> {
        let upload = Upload::from_path(path)?;
        self.load_upload(&upload)
    }
}
