//! Dashboard configuration file support.
//!
//! The combination behavior that used to differ between dashboard deployments
//! (merge key, stacking vs joining, strict vs lenient column checks, sort
//! column) is read from a TOML file instead of being hard-coded:
//!
//! ```toml
//! [combine]
//! mode = "stack"
//! key_column = "unique_id"
//! sort_column = "unique_id"
//! column_policy = "exact"
//! required_columns = ["unique_id", "value"]
//!
//! [loading]
//! drop_empty_columns = false
//!
//! [limits]
//! max_sources = 5
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::{ColumnPolicy, CombinationMode};
use crate::core::provenance::PALETTE;
use crate::error::{CombineError, CombineResult};

/// Dashboard configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub combine: CombineSettings,
    #[serde(default)]
    pub loading: LoadingSettings,
    #[serde(default)]
    pub limits: SourceLimits,
    #[serde(default)]
    pub summary: SummarySettings,
}

/// How sources are checked and combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombineSettings {
    #[serde(default)]
    pub mode: CombinationMode,
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Stack mode only; join mode always sorts by the key.
    #[serde(default)]
    pub sort_column: Option<String>,
    #[serde(default)]
    pub column_policy: ColumnPolicy,
    #[serde(default)]
    pub required_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingSettings {
    #[serde(default = "default_drop_empty_columns")]
    pub drop_empty_columns: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLimits {
    #[serde(default = "default_min_sources")]
    pub min_sources: usize,
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Numeric column whose total is reported alongside the statistics.
    #[serde(default = "default_metric_column")]
    pub metric_column: Option<String>,
}

fn default_key_column() -> String {
    "product_id".to_string()
}

fn default_drop_empty_columns() -> bool {
    true
}

fn default_min_sources() -> usize {
    1
}

fn default_max_sources() -> usize {
    PALETTE.len()
}

fn default_metric_column() -> Option<String> {
    Some("value".to_string())
}

impl Default for CombineSettings {
    fn default() -> Self {
        Self {
            mode: CombinationMode::default(),
            key_column: default_key_column(),
            sort_column: None,
            column_policy: ColumnPolicy::default(),
            required_columns: Vec::new(),
        }
    }
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            drop_empty_columns: default_drop_empty_columns(),
        }
    }
}

impl Default for SourceLimits {
    fn default() -> Self {
        Self {
            min_sources: default_min_sources(),
            max_sources: default_max_sources(),
        }
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            metric_column: default_metric_column(),
        }
    }
}

impl DashboardConfig {
    /// Load dashboard configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` if the file parses and passes [`validate`](Self::validate)
    /// * `Err(CombineError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> CombineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CombineError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CombineResult<Self> {
        let config: DashboardConfig = toml::from_str(content).map_err(|e| {
            CombineError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load dashboard configuration from the default location.
    ///
    /// Searches for `dashboard.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> CombineResult<Self> {
        let search_paths = [
            PathBuf::from("dashboard.toml"),
            PathBuf::from("rust_backend/dashboard.toml"),
            PathBuf::from("../dashboard.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading dashboard config from {}", path.display());
                return Self::from_file(&path);
            }
        }

        Err(CombineError::Configuration(
            "No dashboard.toml found in standard locations".to_string(),
        ))
    }

    /// Default-location config, falling back to built-in defaults when no
    /// file exists.
    pub fn load_or_default() -> CombineResult<Self> {
        match Self::from_default_location() {
            Ok(config) => Ok(config),
            Err(CombineError::Configuration(msg)) if msg.starts_with("No dashboard.toml") => {
                log::debug!("{}; using built-in defaults", msg);
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Checks settings that serde alone cannot enforce.
    pub fn validate(&self) -> CombineResult<()> {
        let limits = &self.limits;
        if limits.max_sources > PALETTE.len() {
            return Err(CombineError::Configuration(format!(
                "max_sources = {} exceeds the {} available source colors",
                limits.max_sources,
                PALETTE.len()
            )));
        }
        if limits.min_sources == 0 || limits.min_sources > limits.max_sources {
            return Err(CombineError::Configuration(format!(
                "min_sources must be between 1 and max_sources ({}), got {}",
                limits.max_sources, limits.min_sources
            )));
        }

        let combine = &self.combine;
        if combine.mode == CombinationMode::Join {
            if combine.key_column.trim().is_empty() {
                return Err(CombineError::Configuration(
                    "key_column must not be empty in join mode".to_string(),
                ));
            }
            if combine.column_policy == ColumnPolicy::Exact && combine.required_columns.is_empty() {
                return Err(CombineError::Configuration(
                    "exact column policy in join mode needs explicit required_columns".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn with_mode(mut self, mode: CombinationMode) -> Self {
        self.combine.mode = mode;
        self
    }

    pub fn with_key_column(mut self, key_column: impl Into<String>) -> Self {
        self.combine.key_column = key_column.into();
        self
    }

    pub fn with_sort_column(mut self, sort_column: Option<&str>) -> Self {
        self.combine.sort_column = sort_column.map(str::to_string);
        self
    }

    pub fn with_column_policy(mut self, policy: ColumnPolicy, required: &[&str]) -> Self {
        self.combine.column_policy = policy;
        self.combine.required_columns = required.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_drop_empty_columns(mut self, drop: bool) -> Self {
        self.loading.drop_empty_columns = drop;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.combine.mode, CombinationMode::Join);
        assert_eq!(config.combine.key_column, "product_id");
        assert_eq!(config.combine.column_policy, ColumnPolicy::Subset);
        assert!(config.loading.drop_empty_columns);
        assert_eq!(config.limits.max_sources, 5);
        assert_eq!(config.summary.metric_column.as_deref(), Some("value"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[combine]
mode = "stack"
sort_column = "unique_id"
column_policy = "exact"
required_columns = ["unique_id", "value"]

[loading]
drop_empty_columns = false
"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.combine.mode, CombinationMode::Stack);
        assert_eq!(config.combine.sort_column.as_deref(), Some("unique_id"));
        assert_eq!(config.combine.column_policy, ColumnPolicy::Exact);
        assert_eq!(config.combine.required_columns, vec!["unique_id", "value"]);
        assert!(!config.loading.drop_empty_columns);
        // untouched tables keep their defaults
        assert_eq!(config.limits.max_sources, 5);
    }

    #[test]
    fn test_rejects_more_sources_than_colors() {
        let result = DashboardConfig::from_toml_str("[limits]\nmax_sources = 6\n");
        assert!(matches!(result, Err(CombineError::Configuration(_))));
    }

    #[test]
    fn test_rejects_zero_min_sources() {
        let result = DashboardConfig::from_toml_str("[limits]\nmin_sources = 0\n");
        assert!(matches!(result, Err(CombineError::Configuration(_))));
    }

    #[test]
    fn test_rejects_exact_join_without_required_columns() {
        let result = DashboardConfig::from_toml_str(
            "[combine]\nmode = \"join\"\ncolumn_policy = \"exact\"\n",
        );
        assert!(matches!(result, Err(CombineError::Configuration(_))));

        // stacking may derive the contract from the first source
        let config = DashboardConfig::from_toml_str(
            "[combine]\nmode = \"stack\"\ncolumn_policy = \"exact\"\n",
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_unknown_mode_is_a_configuration_error() {
        let result = DashboardConfig::from_toml_str("[combine]\nmode = \"zip\"\n");
        assert!(matches!(result, Err(CombineError::Configuration(_))));
    }
}
