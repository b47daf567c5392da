//! Loading uploaded files into sources, and the bundled demo datasets.
//!
//! # Example
//!
//! ```no_run
//! use udv_rust::io::loaders::SourceLoader;
//! use std::path::Path;
//!
//! let source = SourceLoader::new()
//!     .load_from_file(Path::new("sample_data/source_1.csv"))
//!     .expect("Failed to load");
//! println!("Loaded {} rows from {}", source.row_count(), source.name);
//! ```

pub mod loaders;
pub mod samples;


pub use loaders::{LoadOptions, SourceLoader};
pub use samples::write_sample_datasets;
