//! Column checks applied to every source before it is combined.
//!
//! A [`SchemaRequirement`] lists the columns a source must carry and whether
//! other columns are tolerated. The requirement for one request is derived
//! from the `[combine]` settings by [`SchemaRequirement::for_sources`].

use serde::{Deserialize, Serialize};

use crate::config::CombineSettings;
use crate::core::domain::{ColumnPolicy, CombinationMode, Source};
use crate::error::{CombineError, CombineResult};

/// Columns a source must provide, and how strictly.
///
/// # Examples
///
/// ```
/// use udv_rust::core::domain::ColumnPolicy;
/// use udv_rust::preprocessing::validator::SchemaRequirement;
///
/// let requirement = SchemaRequirement::subset(&["product_id", "value"]);
/// assert_eq!(requirement.policy, ColumnPolicy::Subset);
/// assert_eq!(requirement.columns.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaRequirement {
    pub columns: Vec<String>,
    pub policy: ColumnPolicy,
}

impl SchemaRequirement {
    pub fn new(columns: Vec<String>, policy: ColumnPolicy) -> Self {
        Self { columns, policy }
    }

    pub fn subset(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect(), ColumnPolicy::Subset)
    }

    pub fn exact(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect(), ColumnPolicy::Exact)
    }

    /// Effective requirement for one request.
    ///
    /// Stack mode uses `required_columns` as given, except that an exact
    /// policy without listed columns takes the first source's columns as the
    /// contract. Join mode always adds the key column.
    pub fn for_sources(settings: &CombineSettings, sources: &[Source]) -> CombineResult<Self> {
        let mut columns = settings.required_columns.clone();

        match settings.mode {
            CombinationMode::Stack => {
                if settings.column_policy == ColumnPolicy::Exact && columns.is_empty() {
                    if let Some(first) = sources.first() {
                        columns = first.column_names();
                    }
                }
            }
            CombinationMode::Join => {
                if settings.column_policy == ColumnPolicy::Exact && columns.is_empty() {
                    return Err(CombineError::Configuration(
                        "exact column policy in join mode needs explicit required_columns"
                            .to_string(),
                    ));
                }
                if !columns.contains(&settings.key_column) {
                    columns.insert(0, settings.key_column.clone());
                }
            }
        }

        Ok(Self::new(columns, settings.column_policy))
    }
}

/// Checks sources against a [`SchemaRequirement`].
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate one source, returning it unchanged when it conforms.
    ///
    /// Reports the first missing column in requirement order; under the exact
    /// policy, every extra column the source carries, in source order.
    pub fn validate<'a>(
        source: &'a Source,
        requirement: &SchemaRequirement,
    ) -> CombineResult<&'a Source> {
        if let Some(missing) = requirement
            .columns
            .iter()
            .find(|column| !source.has_column(column))
        {
            return Err(CombineError::MissingRequiredColumn {
                source_name: source.name.clone(),
                column: missing.clone(),
            });
        }

        if requirement.policy == ColumnPolicy::Exact {
            let unexpected: Vec<String> = source
                .column_names()
                .into_iter()
                .filter(|name| !requirement.columns.contains(name))
                .collect();

            if !unexpected.is_empty() {
                return Err(CombineError::UnexpectedColumns {
                    source_name: source.name.clone(),
                    columns: unexpected,
                });
            }
        }

        Ok(source)
    }

    pub fn check_key_column(source: &Source, key_column: &str) -> CombineResult<()> {
        if source.has_column(key_column) {
            Ok(())
        } else {
            Err(CombineError::MissingKeyColumn {
                source_name: source.name.clone(),
                key_column: key_column.to_string(),
            })
        }
    }

    /// Validate every source of one request under the `[combine]` settings.
    ///
    /// In join mode all key columns are checked before any other requirement,
    /// so a missing key is reported as such even when other columns are
    /// missing too.
    pub fn validate_all(sources: &[Source], settings: &CombineSettings) -> CombineResult<()> {
        if settings.mode == CombinationMode::Join {
            for source in sources {
                Self::check_key_column(source, &settings.key_column)?;
            }
        }

        let requirement = SchemaRequirement::for_sources(settings, sources)?;
        for source in sources {
            Self::validate(source, &requirement)?;
        }

        log::debug!(
            "{} source(s) satisfy {} required column(s) ({:?} policy)",
            sources.len(),
            requirement.columns.len(),
            requirement.policy
        );
        Ok(())
    }
}
