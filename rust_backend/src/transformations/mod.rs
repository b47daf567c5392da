//! Table combination and cleaning.
//!
//! # Modules
//!
//! - [`stacking`]: Row-wise union of sources with a `source_file` column
//! - [`joining`]: Column-wise full outer join on a key column
//! - [`cleaning`]: Drop columns without any value
//!
//! # Example
//!
//! ```no_run
//! use udv_rust::core::{Source, SourceFormat};
//! use udv_rust::transformations::{join, stack};
//! use polars::prelude::*;
//!
//! # fn example(a: DataFrame, b: DataFrame) -> udv_rust::error::CombineResult<()> {
//! let sources = vec![
//!     Source::new("a.csv", SourceFormat::Csv, a),
//!     Source::new("b.csv", SourceFormat::Csv, b),
//! ];
//!
//! let stacked = stack(&sources, Some("unique_id"))?;
//! let joined = join(&sources, "product_id")?;
//! println!("{} stacked rows, {} joined rows", stacked.table.height(), joined.table.height());
//! # Ok(())
//! # }
//! ```

use polars::prelude::DataFrame;

use crate::core::provenance::ProvenanceMap;

pub mod cleaning;
pub mod joining;
pub mod stacking;

pub use cleaning::{drop_empty_columns, empty_columns, is_numeric_dtype};
pub use joining::{join, joined_column_name, JOIN_SEPARATOR};
pub use stacking::{stack, SOURCE_COLUMN};

/// Result of a stack or join, before summary statistics are computed.
#[derive(Debug, Clone)]
pub struct Combined {
    pub table: DataFrame,
    pub provenance: ProvenanceMap,
    /// Non-fatal notes about the combination (type coercions, duplicate keys).
    pub warnings: Vec<String>,
}
