use polars::prelude::*;
use std::collections::HashMap;

use super::Combined;
use crate::core::domain::Source;
use crate::core::provenance::{Contribution, ProvenanceMap, PALETTE};
use crate::error::{CombineError, CombineResult};

/// Column added to every stacked row naming the file it came from.
pub const SOURCE_COLUMN: &str = "source_file";

/// Stack sources row-wise.
///
/// Columns are the outer union of all source schemas; a source without a
/// given column contributes nulls there, and numeric columns whose types
/// differ between sources are widened to a common type. When `sort_column`
/// is set the result is sorted ascending by it with a stable sort (missing
/// values last), so rows with equal keys stay in upload-then-row order.
///
/// A configured sort column that no source contains is not an error: the
/// rows stay in upload order and a warning is returned.
pub fn stack(sources: &[Source], sort_column: Option<&str>) -> CombineResult<Combined> {
    if sources.is_empty() {
        return Err(CombineError::NotEnoughSources { provided: 0, min: 1 });
    }
    if sources.len() > PALETTE.len() {
        return Err(CombineError::TooManySources {
            provided: sources.len(),
            max: PALETTE.len(),
        });
    }

    let frames = sources
        .iter()
        .map(|source| {
            source
                .table
                .clone()
                .lazy()
                .with_column(lit(source.name.as_str()).alias(SOURCE_COLUMN))
        })
        .collect::<Vec<_>>();

    let mut stacked = concat_lf_diagonal(
        frames,
        UnionArgs {
            to_supertypes: true,
            ..Default::default()
        },
    )?;

    let mut warnings = Vec::new();
    match sort_column {
        Some(column) if sources.iter().any(|source| source.has_column(column)) => {
            stacked = stacked.sort_by_exprs(
                vec![col(column)],
                SortMultipleOptions::default()
                    .with_maintain_order(true)
                    .with_nulls_last(true),
            );
        }
        Some(column) => {
            let warning = format!(
                "Sort column '{}' not found in any source; rows kept in upload order",
                column
            );
            log::warn!("{}", warning);
            warnings.push(warning);
        }
        None => {}
    }

    let table = stacked.collect()?;
    let provenance = row_provenance(&table, sources)?;

    log::debug!(
        "Stacked {} sources into {} rows x {} columns",
        sources.len(),
        table.height(),
        table.width()
    );

    Ok(Combined {
        table,
        provenance,
        warnings,
    })
}

/// Attribute every row of the stacked table to its source via [`SOURCE_COLUMN`].
fn row_provenance(table: &DataFrame, sources: &[Source]) -> CombineResult<ProvenanceMap> {
    let origins = table.column(SOURCE_COLUMN)?.str()?;

    let mut rows_by_source: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, origin) in origins.into_iter().enumerate() {
        if let Some(name) = origin {
            rows_by_source.entry(name).or_default().push(row);
        }
    }

    let mut provenance = ProvenanceMap::new();
    for source in sources {
        let rows = rows_by_source.remove(source.name.as_str()).unwrap_or_default();
        provenance
            .push(source.name.as_str(), Contribution::Rows(rows))
            .ok_or(CombineError::TooManySources {
                provided: sources.len(),
                max: PALETTE.len(),
            })?;
    }

    Ok(provenance)
}
