//! Unified Data View backend.
//!
//! Loads up to five uploaded CSV or Excel files, checks their columns, and
//! combines them into one table, either stacked row-wise or joined on a key
//! column. Every combined table comes with a provenance map (which source
//! contributed which rows or columns, and its display color) and summary
//! statistics.
//!
//! ```no_run
//! use udv_rust::config::DashboardConfig;
//! use udv_rust::core::Upload;
//! use udv_rust::services::Session;
//!
//! # fn main() -> udv_rust::error::CombineResult<()> {
//! let mut session = Session::new(DashboardConfig::load_or_default()?);
//! let outcome = session.process(&[
//!     Upload::new("q1.csv", std::fs::read("q1.csv")?),
//!     Upload::new("q2.csv", std::fs::read("q2.csv")?),
//! ])?;
//! println!("{} rows", outcome.table.height());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod services;
pub mod transformations;

#[cfg(feature = "python")]
pub mod python;

pub use config::DashboardConfig;
pub use error::{CombineError, CombineResult};
pub use preprocessing::{CombineOutcome, CombinePipeline};
pub use services::Session;

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn udv_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register(m)
}
