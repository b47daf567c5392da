//! Python bindings for the dashboard backend.
//!
//! The presentation layer hands over uploaded files as `(name, bytes)` pairs
//! and receives the combined table, provenance and summary as one JSON
//! document. Rendering (cell colors, charts) stays on the Python side.
//!
//! # Python API
//!
//! ```python
//! import udv_rust
//!
//! session = udv_rust.Session()
//! payload = json.loads(session.process([(f.name, f.getvalue()) for f in uploads]))
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::PathBuf;

use crate::config::DashboardConfig;
use crate::core::domain::Upload;
use crate::error::CombineError;
use crate::io::samples;
use crate::services::session;

fn to_py_err(err: CombineError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Dashboard session holding the last combined table.
#[pyclass(module = "udv_rust", name = "Session", unsendable)]
pub struct PySession {
    inner: session::Session,
}

#[pymethods]
impl PySession {
    /// Create a session from a TOML config file, or the default search
    /// locations when no path is given.
    #[new]
    #[pyo3(signature = (config_path=None))]
    pub fn new(config_path: Option<&str>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => DashboardConfig::from_file(path),
            None => DashboardConfig::load_or_default(),
        }
        .map_err(to_py_err)?;

        Ok(Self {
            inner: session::Session::new(config),
        })
    }

    /// Combine uploaded files; returns the outcome as a JSON string.
    ///
    /// Raises `ValueError` with a user-facing message on any failure. The
    /// previous outcome is kept in that case.
    pub fn process(&mut self, files: Vec<(String, Vec<u8>)>) -> PyResult<String> {
        let uploads: Vec<Upload> = files
            .into_iter()
            .map(|(name, bytes)| Upload::new(name, bytes))
            .collect();

        let outcome = self.inner.process(&uploads).map_err(to_py_err)?;
        outcome.to_json().map_err(to_py_err)
    }

    /// Combined table as CSV text, or `None` before the first request.
    pub fn export_csv(&self) -> PyResult<Option<String>> {
        self.inner.export_csv().map_err(to_py_err)
    }

    /// `(source name, color)` pairs in upload order.
    pub fn legend(&self) -> Vec<(String, String)> {
        self.inner.legend()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    fn __repr__(&self) -> String {
        match self.inner.current() {
            Some(outcome) => format!(
                "Session(mode={:?}, rows={}, sources={})",
                outcome.mode,
                outcome.table.height(),
                outcome.provenance.len()
            ),
            None => "Session(empty)".to_string(),
        }
    }
}

/// Write the demo datasets into `directory`; returns the files written.
#[pyfunction]
#[pyo3(signature = (directory="sample_data"))]
pub fn write_sample_datasets(directory: &str) -> PyResult<Vec<String>> {
    let written = samples::write_sample_datasets(&PathBuf::from(directory)).map_err(to_py_err)?;
    Ok(written
        .iter()
        .map(|path| path.display().to_string())
        .collect())
}

/// Register all Python-facing classes and functions.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySession>()?;
    m.add_function(wrap_pyfunction!(write_sample_datasets, m)?)?;
    Ok(())
}
