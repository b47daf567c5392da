//! Summary statistics of a combined table.
//!
//! Numeric columns get the usual describe-style statistics; every column gets
//! its missing-value count. Statistics that are undefined for the available
//! values (no values at all, or a standard deviation from a single value)
//! are `None` rather than zero.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CombineResult;
use crate::transformations::cleaning::is_numeric_dtype;
use crate::transformations::joining::JOIN_SEPARATOR;

/// Statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    /// Number of non-missing values.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Total of the configured metric column.
///
/// After a join the metric exists once per source (`value__a.csv`, ...);
/// the total then covers all of those columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTotal {
    pub column: String,
    pub total: f64,
    pub summed_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub numeric: Vec<NumericSummary>,
    pub missing: Vec<MissingCount>,
    pub total_missing: usize,
    pub metric_total: Option<MetricTotal>,
}

impl TableSummary {
    pub fn numeric_column(&self, column: &str) -> Option<&NumericSummary> {
        self.numeric.iter().find(|s| s.column == column)
    }

    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.missing
            .iter()
            .find(|m| m.column == column)
            .map(|m| m.missing)
    }
}

/// Summarize a combined table.
pub fn summarize(df: &DataFrame, metric_column: Option<&str>) -> CombineResult<TableSummary> {
    let mut numeric = Vec::new();
    let mut missing = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let nulls = column.null_count();
        missing.push(MissingCount {
            column: column.name().to_string(),
            missing: nulls,
        });

        if is_numeric_dtype(column.dtype()) {
            let values = numeric_values(column)?;
            numeric.push(compute_stats(column.name().as_str(), &values));
        }
    }

    let total_missing = missing.iter().map(|m| m.missing).sum();
    let metric_total = match metric_column.filter(|name| !name.is_empty()) {
        Some(name) => metric_total(df, name)?,
        None => None,
    };

    Ok(TableSummary {
        row_count: df.height(),
        column_count: df.width(),
        numeric,
        missing,
        total_missing,
        metric_total,
    })
}

fn numeric_values(column: &Column) -> CombineResult<Vec<f64>> {
    let as_float = column.cast(&DataType::Float64)?;
    Ok(as_float
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

fn metric_total(df: &DataFrame, metric: &str) -> CombineResult<Option<MetricTotal>> {
    let joined_prefix = format!("{}{}", metric, JOIN_SEPARATOR);

    let summed: Vec<&Column> = match df.column(metric) {
        Ok(column) => vec![column],
        Err(_) => df
            .get_columns()
            .iter()
            .filter(|column| column.name().starts_with(joined_prefix.as_str()))
            .collect(),
    };

    if summed.is_empty() || !summed.iter().all(|column| is_numeric_dtype(column.dtype())) {
        log::debug!("Metric column '{}' is absent or not numeric", metric);
        return Ok(None);
    }

    let mut total = 0.0;
    for column in &summed {
        total += numeric_values(column)?.iter().sum::<f64>();
    }

    Ok(Some(MetricTotal {
        column: metric.to_string(),
        total,
        summed_columns: summed.iter().map(|c| c.name().to_string()).collect(),
    }))
}

/// Quantile with linear interpolation between the closest ranks.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn compute_stats(column: &str, values: &[f64]) -> NumericSummary {
    let count = values.len();
    if count == 0 {
        return NumericSummary {
            column: column.to_string(),
            count: 0,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        };
    }

    let mean = values.iter().sum::<f64>() / count as f64;

    let std = if count > 1 {
        let variance = values
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / (count - 1) as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    NumericSummary {
        column: column.to_string(),
        count,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}
