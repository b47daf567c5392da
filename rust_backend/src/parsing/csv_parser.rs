use polars::prelude::*;
use std::io::Cursor;

use crate::error::{CombineError, CombineResult};

/// Parse CSV bytes into a Polars DataFrame.
///
/// The first line is the header row. Column types are inferred from every
/// row, not a prefix, so a late fractional value still makes the column
/// Float64. Empty fields are read as nulls. Content that is not UTF-8 is
/// rejected rather than decoded lossily.
pub fn parse_csv(source_name: &str, bytes: &[u8]) -> CombineResult<DataFrame> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(CombineError::parse(source_name, "file is empty"));
    }
    std::str::from_utf8(bytes).map_err(|e| CombineError::parse(source_name, e))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| CombineError::parse(source_name, e))
}

/// Serialize a DataFrame to CSV text with a header row.
///
/// This is the download format of the combined table, and the loader reads it
/// back to the same cell values.
pub fn write_csv(table: &DataFrame) -> CombineResult<String> {
    let mut df = table.clone();
    let mut buffer: Vec<u8> = Vec::new();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)?;

    // polars only emits UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
