use polars::prelude::*;

use super::cleaning::is_numeric_dtype;
use super::Combined;
use crate::core::domain::Source;
use crate::core::provenance::{Contribution, ProvenanceMap, PALETTE};
use crate::error::{CombineError, CombineResult};
use crate::preprocessing::validator::SchemaValidator;

/// Separator between the uploaded column name and the source name.
pub const JOIN_SEPARATOR: &str = "__";

/// Name a non-key column takes in the joined table.
///
/// ```
/// use udv_rust::transformations::joining::joined_column_name;
///
/// assert_eq!(joined_column_name("price", "q1.csv"), "price__q1.csv");
/// ```
pub fn joined_column_name(column: &str, source_name: &str) -> String {
    format!("{}{}{}", column, JOIN_SEPARATOR, source_name)
}

/// Join sources column-wise on `key_column` with full outer semantics.
///
/// Every non-key column is renamed with [`joined_column_name`] so columns from
/// different sources never collide. Sources are folded left to right; a key
/// missing from a source leaves that source's columns null in the key's row.
/// The result is sorted ascending by key with missing keys last. Rows with
/// equal keys keep first-seen order: left source rows in their upload order,
/// then unmatched rows of later sources.
pub fn join(sources: &[Source], key_column: &str) -> CombineResult<Combined> {
    if sources.is_empty() {
        return Err(CombineError::NotEnoughSources { provided: 0, min: 1 });
    }
    if sources.len() > PALETTE.len() {
        return Err(CombineError::TooManySources {
            provided: sources.len(),
            max: PALETTE.len(),
        });
    }
    for source in sources {
        SchemaValidator::check_key_column(source, key_column)?;
    }

    let mut warnings = Vec::new();
    let key_dtype = reconcile_key_dtype(sources, key_column, &mut warnings)?;

    let mut provenance = ProvenanceMap::new();
    let mut frames = Vec::with_capacity(sources.len());

    for source in sources {
        let duplicates = duplicate_key_count(source, key_column)?;
        if duplicates > 0 {
            let warning = format!(
                "'{}' has {} duplicate value(s) in key column '{}'",
                source.name, duplicates, key_column
            );
            log::warn!("{}", warning);
            warnings.push(warning);
        }

        let (table, contributed) = suffix_columns(source, key_column)?;
        let mut frame = table.lazy();
        if let Some(dtype) = &key_dtype {
            frame = frame.with_column(col(key_column).cast(dtype.clone()));
        }
        frames.push(frame);

        provenance
            .push(source.name.as_str(), Contribution::Columns(contributed))
            .ok_or(CombineError::TooManySources {
                provided: sources.len(),
                max: PALETTE.len(),
            })?;
    }
    provenance.add_shared_column(key_column);

    let mut frames = frames.into_iter();
    let mut joined = match frames.next() {
        Some(frame) => frame,
        None => return Err(CombineError::NotEnoughSources { provided: 0, min: 1 }),
    };
    for frame in frames {
        joined = joined.join(
            frame,
            [col(key_column)],
            [col(key_column)],
            JoinArgs {
                maintain_order: MaintainOrderJoin::LeftRight,
                ..JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns)
            },
        );
    }

    let table = joined
        .sort_by_exprs(
            vec![col(key_column)],
            SortMultipleOptions::default()
                .with_maintain_order(true)
                .with_nulls_last(true),
        )
        .collect()?;

    log::debug!(
        "Joined {} sources on '{}' into {} rows x {} columns",
        sources.len(),
        key_column,
        table.height(),
        table.width()
    );

    Ok(Combined {
        table,
        provenance,
        warnings,
    })
}

/// Rename every column except the key; returns the table and the new names.
fn suffix_columns(source: &Source, key_column: &str) -> CombineResult<(DataFrame, Vec<String>)> {
    let mut contributed = Vec::new();
    let mut columns = Vec::with_capacity(source.table.width());

    for column in source.table.get_columns() {
        let mut column = column.clone();
        if column.name().as_str() != key_column {
            let renamed = joined_column_name(column.name().as_str(), &source.name);
            column.rename(renamed.as_str().into());
            contributed.push(renamed);
        }
        columns.push(column);
    }

    Ok((DataFrame::new(columns)?, contributed))
}

/// Common key type when sources disagree. `None` means the types already
/// match.
///
/// Float64 when every key column is numeric, or is text whose values all
/// parse as numbers; text otherwise.
fn reconcile_key_dtype(
    sources: &[Source],
    key_column: &str,
    warnings: &mut Vec<String>,
) -> CombineResult<Option<DataType>> {
    let mut keys = Vec::with_capacity(sources.len());
    for source in sources {
        keys.push(source.table.column(key_column)?);
    }

    if keys.windows(2).all(|pair| pair[0].dtype() == pair[1].dtype()) {
        return Ok(None);
    }

    let numeric = keys.iter().all(|column| {
        is_numeric_dtype(column.dtype())
            || (column.dtype() == &DataType::String
                && column.strict_cast(&DataType::Float64).is_ok())
    });

    let warning = if numeric {
        format!(
            "Key column '{}' has different types across sources; compared as numbers",
            key_column
        )
    } else {
        format!(
            "Key column '{}' has different types across sources; compared as text, \
             so numeric keys only match text keys spelled the same way",
            key_column
        )
    };
    log::warn!("{}", warning);
    warnings.push(warning);

    Ok(Some(if numeric {
        DataType::Float64
    } else {
        DataType::String
    }))
}

fn duplicate_key_count(source: &Source, key_column: &str) -> CombineResult<usize> {
    let keys = source.table.column(key_column)?.drop_nulls();
    if keys.is_empty() {
        return Ok(0);
    }
    Ok(keys.len() - keys.n_unique()?)
}
