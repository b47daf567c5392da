use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::DashboardConfig;
use crate::core::domain::{CombinationMode, Source, Upload};
use crate::core::provenance::ProvenanceMap;
use crate::error::{CombineError, CombineResult};
use crate::io::loaders::{LoadOptions, SourceLoader};
use crate::parsing::csv_parser;
use crate::preprocessing::validator::SchemaValidator;
use crate::services::summary::{summarize, TableSummary};
use crate::transformations::{join, stack, Combined};

/// Result of one successful combination request
#[derive(Debug, Clone)]
pub struct CombineOutcome {
    pub mode: CombinationMode,
    pub table: DataFrame,
    pub provenance: ProvenanceMap,
    pub summary: TableSummary,
    pub warnings: Vec<String>,
}

/// Serializable view of a [`CombineOutcome`], with the table as CSV text.
#[derive(Debug, Serialize)]
pub struct OutcomePayload<'a> {
    pub mode: CombinationMode,
    pub table_csv: String,
    pub provenance: &'a ProvenanceMap,
    pub summary: &'a TableSummary,
    pub warnings: &'a [String],
}

impl CombineOutcome {
    pub fn export_csv(&self) -> CombineResult<String> {
        csv_parser::write_csv(&self.table)
    }

    pub fn payload(&self) -> CombineResult<OutcomePayload<'_>> {
        Ok(OutcomePayload {
            mode: self.mode,
            table_csv: self.export_csv()?,
            provenance: &self.provenance,
            summary: &self.summary,
            warnings: &self.warnings,
        })
    }

    pub fn to_json(&self) -> CombineResult<String> {
        serde_json::to_string(&self.payload()?)
            .map_err(|e| CombineError::Configuration(format!("Failed to serialize outcome: {}", e)))
    }
}

/// Main combination pipeline: count check, load, validate, combine, summarize
#[derive(Debug, Clone, Default)]
pub struct CombinePipeline {
    config: DashboardConfig,
}

impl CombinePipeline {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Combine uploaded files into one table.
    ///
    /// Any failure abandons the whole request; nothing partial is returned.
    pub fn process(&self, uploads: &[Upload]) -> CombineResult<CombineOutcome> {
        self.config.validate()?;
        let combine = &self.config.combine;

        log::info!(
            "Combining {} upload(s) in {:?} mode",
            uploads.len(),
            combine.mode
        );

        // Step 1: Source count, before anything is parsed
        self.check_source_count(uploads.len())?;

        // Step 2: Upload names key the provenance map
        let mut names = HashSet::with_capacity(uploads.len());
        for upload in uploads {
            if !names.insert(upload.file_name.as_str()) {
                return Err(CombineError::DuplicateSourceName(upload.file_name.clone()));
            }
        }

        // Step 3: Load
        let loader = SourceLoader::with_options(LoadOptions {
            drop_empty_columns: self.config.loading.drop_empty_columns,
        });
        let sources = uploads
            .iter()
            .map(|upload| loader.load_upload(upload))
            .collect::<CombineResult<Vec<Source>>>()?;

        // Step 4: Validate
        SchemaValidator::validate_all(&sources, combine)?;

        // Step 5: Combine
        let Combined {
            table,
            provenance,
            warnings,
        } = match combine.mode {
            CombinationMode::Stack => stack(&sources, combine.sort_column.as_deref())?,
            CombinationMode::Join => join(&sources, &combine.key_column)?,
        };

        // Step 6: Summarize
        let summary = summarize(&table, self.config.summary.metric_column.as_deref())?;

        log::info!(
            "Combined table has {} rows x {} columns ({} warning(s))",
            table.height(),
            table.width(),
            warnings.len()
        );

        Ok(CombineOutcome {
            mode: combine.mode,
            table,
            provenance,
            summary,
            warnings,
        })
    }

    /// Read files from disk and process them
    pub fn process_paths(&self, paths: &[PathBuf]) -> CombineResult<CombineOutcome> {
        self.check_source_count(paths.len())?;

        let uploads = paths
            .iter()
            .map(|path| Upload::from_path(path))
            .collect::<CombineResult<Vec<_>>>()?;

        self.process(&uploads)
    }

    fn check_source_count(&self, provided: usize) -> CombineResult<()> {
        let limits = &self.config.limits;
        if provided > limits.max_sources {
            return Err(CombineError::TooManySources {
                provided,
                max: limits.max_sources,
            });
        }
        if provided < limits.min_sources {
            return Err(CombineError::NotEnoughSources {
                provided,
                min: limits.min_sources,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::ColumnPolicy;

    fn csv(name: &str, content: &str) -> Upload {
        Upload::new(name, content.as_bytes().to_vec())
    }

    #[test]
    fn test_too_many_sources_checked_before_parsing() {
        // none of these would parse
        let uploads: Vec<Upload> = (0..6)
            .map(|i| Upload::new(format!("f{}.pdf", i), vec![0u8]))
            .collect();

        let result = CombinePipeline::new().process(&uploads);
        assert!(matches!(
            result,
            Err(CombineError::TooManySources { provided: 6, max: 5 })
        ));
    }

    #[test]
    fn test_no_uploads() {
        let result = CombinePipeline::new().process(&[]);
        assert!(matches!(result, Err(CombineError::NotEnoughSources { provided: 0, min: 1 })));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let uploads = vec![
            csv("a.csv", "product_id\n1\n"),
            csv("a.csv", "product_id\n2\n"),
        ];
        let result = CombinePipeline::new().process(&uploads);
        assert!(matches!(result, Err(CombineError::DuplicateSourceName(name)) if name == "a.csv"));
    }

    #[test]
    fn test_join_with_defaults() {
        let uploads = vec![
            csv("a.csv", "product_id,value\n1,10\n2,20\n"),
            csv("b.csv", "product_id,value\n2,5\n3,7\n"),
        ];

        let outcome = CombinePipeline::new().process(&uploads).unwrap();
        assert_eq!(outcome.mode, CombinationMode::Join);
        assert_eq!(outcome.table.height(), 3);
        assert_eq!(outcome.provenance.len(), 2);

        let total = outcome.summary.metric_total.as_ref().unwrap();
        assert!((total.total - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_stack_with_exact_policy() {
        let config = DashboardConfig::default()
            .with_mode(CombinationMode::Stack)
            .with_sort_column(Some("unique_id"))
            .with_column_policy(ColumnPolicy::Exact, &[]);
        let pipeline = CombinePipeline::with_config(config);

        let ok = vec![
            csv("a.csv", "unique_id,value\n2,1\n"),
            csv("b.csv", "unique_id,value\n1,2\n"),
        ];
        let outcome = pipeline.process(&ok).unwrap();
        assert_eq!(outcome.table.height(), 2);
        assert_eq!(outcome.provenance.source_of_row(0), Some("b.csv"));

        let bad = vec![
            csv("a.csv", "unique_id,value\n2,1\n"),
            csv("b.csv", "unique_id,value,extra\n1,2,3\n"),
        ];
        assert!(matches!(
            pipeline.process(&bad),
            Err(CombineError::UnexpectedColumns { .. })
        ));
    }

    #[test]
    fn test_outcome_json_payload() {
        let uploads = vec![csv("a.csv", "product_id,value\n1,10\n")];
        let outcome = CombinePipeline::new().process(&uploads).unwrap();

        let json: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
        assert_eq!(json["mode"], "join");
        assert!(json["table_csv"].as_str().unwrap().starts_with("product_id,value__a.csv"));
        assert_eq!(json["provenance"]["entries"][0]["color"], "#FFCDD2");
        assert_eq!(json["summary"]["row_count"], 1);
    }
}
