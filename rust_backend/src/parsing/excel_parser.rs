use calamine::{Data, Range, Reader, Xls, Xlsx};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;

use crate::core::domain::SourceFormat;
use crate::error::{CombineError, CombineResult};

static EMPTY: Data = Data::Empty;

/// Parse the first worksheet of an Excel workbook into a Polars DataFrame.
///
/// The first row of the used range holds the column names; every later row
/// is data. Fully blank rows are skipped.
pub fn parse_workbook(
    source_name: &str,
    format: SourceFormat,
    bytes: &[u8],
) -> CombineResult<DataFrame> {
    let cursor = Cursor::new(bytes.to_vec());

    let range = match format {
        SourceFormat::Xlsx => {
            let mut workbook: Xlsx<_> =
                Xlsx::new(cursor).map_err(|e| CombineError::parse(source_name, e))?;
            first_worksheet(source_name, workbook.worksheet_range_at(0))?
        }
        SourceFormat::Xls => {
            let mut workbook: Xls<_> =
                Xls::new(cursor).map_err(|e| CombineError::parse(source_name, e))?;
            first_worksheet(source_name, workbook.worksheet_range_at(0))?
        }
        SourceFormat::Csv => {
            return Err(CombineError::parse(
                source_name,
                "CSV content passed to the workbook parser",
            ))
        }
    };

    range_to_dataframe(source_name, &range)
}

fn first_worksheet<E: std::fmt::Display>(
    source_name: &str,
    sheet: Option<Result<Range<Data>, E>>,
) -> CombineResult<Range<Data>> {
    sheet
        .ok_or_else(|| CombineError::parse(source_name, "workbook contains no worksheet"))?
        .map_err(|e| CombineError::parse(source_name, e))
}

/// Convert a worksheet range into typed columns.
pub fn range_to_dataframe(source_name: &str, range: &Range<Data>) -> CombineResult<DataFrame> {
    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| CombineError::parse(source_name, "worksheet is empty"))?;
    let headers = header_names(header_row);

    let mut cells: Vec<Vec<&Data>> = vec![Vec::new(); headers.len()];
    for row in rows {
        if row.iter().all(is_blank) {
            continue;
        }
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).unwrap_or(&EMPTY));
        }
    }

    let columns = headers
        .iter()
        .zip(cells.iter())
        .map(|(name, values)| typed_column(name, values))
        .collect::<Vec<_>>();

    DataFrame::new(columns).map_err(|e| CombineError::parse(source_name, e))
}

/// Header cells to unique column names: blanks become `Unnamed: <index>`,
/// repeats get a `.1`, `.2`, ... suffix.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(row.len());

    for (idx, cell) in row.iter().enumerate() {
        let base = if is_blank(cell) {
            format!("Unnamed: {}", idx)
        } else {
            cell.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    Text,
}

fn integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(value as i64)
    } else {
        None
    }
}

fn column_kind(values: &[&Data]) -> CellKind {
    let mut kind: Option<CellKind> = None;

    for cell in values.iter().filter(|cell| !is_blank(cell)) {
        let cell_kind = match cell {
            Data::Int(_) => CellKind::Int,
            Data::Float(f) if integral(*f).is_some() => CellKind::Int,
            Data::Float(_) => CellKind::Float,
            Data::Bool(_) => CellKind::Bool,
            _ => return CellKind::Text,
        };

        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(CellKind::Int), CellKind::Float) | (Some(CellKind::Float), CellKind::Int) => {
                CellKind::Float
            }
            _ => return CellKind::Text,
        });
    }

    // all-blank columns stay text so they can be recognised as empty later
    kind.unwrap_or(CellKind::Text)
}

fn typed_column(name: &str, values: &[&Data]) -> Column {
    match column_kind(values) {
        CellKind::Int => {
            let data: Vec<Option<i64>> = values
                .iter()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i),
                    Data::Float(f) => integral(*f),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), data)
        }
        CellKind::Float => {
            let data: Vec<Option<f64>> = values
                .iter()
                .map(|cell| match cell {
                    Data::Int(i) => Some(*i as f64),
                    Data::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), data)
        }
        CellKind::Bool => {
            let data: Vec<Option<bool>> = values
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), data)
        }
        CellKind::Text => {
            let data: Vec<Option<String>> = values
                .iter()
                .map(|cell| if is_blank(cell) { None } else { Some(cell.to_string()) })
                .collect();
            Column::new(name.into(), data)
        }
    }
}
