//! Parsers for uploaded tabular formats.
//!
//! Both parsers turn raw upload bytes into a Polars DataFrame. Format
//! detection and post-processing live in [`crate::io::loaders`].
//!
//! # Parsers
//!
//! - [`csv_parser`]: Parse CSV text, and write DataFrames back to CSV for export
//! - [`excel_parser`]: Parse the first worksheet of `.xlsx` / `.xls` workbooks
//!
//! # Example
//!
//! ```
//! use udv_rust::parsing::csv_parser::{parse_csv, write_csv};
//!
//! let df = parse_csv("inline.csv", b"ID,X\n1,a\n2,b\n").expect("valid CSV");
//! assert_eq!(df.height(), 2);
//!
//! let text = write_csv(&df).unwrap();
//! assert!(text.starts_with("ID,X"));
//! ```

pub mod csv_parser;
pub mod excel_parser;


pub use csv_parser::{parse_csv, write_csv};
pub use excel_parser::parse_workbook;
