//! Demo datasets for trying the dashboard without real uploads.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CombineResult;

/// Number of sample files, one per palette color.
pub const SAMPLE_COUNT: usize = 5;

const HEADER: &str = "unique_id,product_id,product_name,value";

const PRODUCTS: [&str; 8] = [
    "Amoxicillin",
    "Atorvastatin",
    "Ibuprofen",
    "Lisinopril",
    "Metformin",
    "Omeprazole",
    "Paracetamol",
    "Salbutamol",
];

const ROWS_PER_FILE: usize = 6;

/// File name of the `index`-th sample (1-based).
pub fn sample_file_name(index: usize) -> String {
    format!("source_{}.csv", index)
}

/// CSV content of the `index`-th sample (1-based).
///
/// Product ids are unique within a file and overlap between neighbouring
/// files, so joining on `product_id` lines them up; `unique_id` is unique
/// across all samples.
pub fn sample_csv(index: usize) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');

    for row in 0..ROWS_PER_FILE {
        let unique_id = (index - 1) * ROWS_PER_FILE + row + 1;
        let product = (index + row) % PRODUCTS.len();
        let product_id = 100 + product;
        let value = ((index * 37 + row * 53) % 400) as f64 / 4.0 + 5.0;

        csv.push_str(&format!(
            "{},{},{},{:.2}\n",
            unique_id, product_id, PRODUCTS[product], value
        ));
    }

    csv
}

/// Write `source_1.csv` to `source_5.csv` into `dir`.
///
/// Existing files are left untouched. Returns the paths that were written.
pub fn write_sample_datasets(dir: &Path) -> CombineResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for index in 1..=SAMPLE_COUNT {
        let path = dir.join(sample_file_name(index));
        if path.exists() {
            log::debug!("Keeping existing sample {}", path.display());
            continue;
        }

        fs::write(&path, sample_csv(index))?;
        log::info!("Wrote sample dataset {}", path.display());
        written.push(path);
    }

    Ok(written)
}
