use anyhow::{Context, Result};
use std::path::PathBuf;

use udv_rust::io::samples::{write_sample_datasets, SAMPLE_COUNT};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Target directory from args or the dashboard's default
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));

    let written = write_sample_datasets(&dir)
        .with_context(|| format!("Failed to write sample datasets to {}", dir.display()))?;

    println!(
        "{} of {} sample files written to {}",
        written.len(),
        SAMPLE_COUNT,
        dir.display()
    );
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}
