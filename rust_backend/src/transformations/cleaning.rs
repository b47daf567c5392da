use polars::prelude::*;

/// Numeric column types the loaders and combiners produce.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int32
            | DataType::Int64
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of the columns that hold no value at all.
///
/// A table without rows reports nothing: its header is all the schema
/// information the upload carries.
pub fn empty_columns(df: &DataFrame) -> Vec<String> {
    if df.height() == 0 {
        return Vec::new();
    }

    df.get_columns()
        .iter()
        .filter(|column| column.null_count() == column.len())
        .map(|column| column.name().to_string())
        .collect()
}

/// Remove every column whose values are all missing
pub fn drop_empty_columns(df: &DataFrame) -> PolarsResult<DataFrame> {
    let empty = empty_columns(df);
    if empty.is_empty() {
        return Ok(df.clone());
    }

    let kept = df
        .get_columns()
        .iter()
        .filter(|column| !empty.iter().any(|name| name == column.name().as_str()))
        .cloned()
        .collect::<Vec<_>>();

    DataFrame::new(kept)
}
