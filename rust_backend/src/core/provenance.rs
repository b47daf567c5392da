//! Source provenance for combined tables.
//!
//! The provenance map records which source contributed which rows (stack
//! mode) or columns (join mode), together with the display color assigned to
//! that source. Colors come from a fixed palette indexed by upload order; the
//! presentation layer decides how to paint them.

use serde::{Deserialize, Serialize};

/// Display colors, one per upload slot.
pub const PALETTE: [&str; 5] = ["#FFCDD2", "#C8E6C9", "#BBDEFB", "#FFF9C4", "#E1BEE7"];

/// Returns the palette color for the source at `upload_index`, if any.
pub fn color_for(upload_index: usize) -> Option<&'static str> {
    PALETTE.get(upload_index).copied()
}

/// What a single source contributed to the combined table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum Contribution {
    /// Row indices in the combined table.
    Rows(Vec<usize>),
    /// Column names in the combined table.
    Columns(Vec<String>),
}

impl Contribution {
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Columns(columns) => columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProvenance {
    pub source: String,
    pub color: String,
    pub contribution: Contribution,
}

/// Provenance of every processed source, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceMap {
    entries: Vec<SourceProvenance>,
    /// Columns that blend values from all sources (the join key).
    shared_columns: Vec<String>,
}

impl ProvenanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next source; its color is picked by its upload position.
    ///
    /// Returns `None` once the palette is exhausted. Source limits are
    /// validated against the palette size, so that only happens if a caller
    /// bypasses the pipeline.
    pub fn push(&mut self, source: impl Into<String>, contribution: Contribution) -> Option<&str> {
        let color = color_for(self.entries.len())?;
        self.entries.push(SourceProvenance {
            source: source.into(),
            color: color.to_string(),
            contribution,
        });
        Some(color)
    }

    pub fn add_shared_column(&mut self, column: impl Into<String>) {
        self.shared_columns.push(column.into());
    }

    pub fn entries(&self) -> &[SourceProvenance] {
        &self.entries
    }

    pub fn shared_columns(&self) -> &[String] {
        &self.shared_columns
    }

    pub fn get(&self, source: &str) -> Option<&SourceProvenance> {
        self.entries.iter().find(|entry| entry.source == source)
    }

    pub fn sources(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.source.as_str()).collect()
    }

    /// Source name to color, in upload order.
    pub fn legend(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|entry| (entry.source.clone(), entry.color.clone()))
            .collect()
    }

    /// The source that contributed `row` (stack mode only).
    pub fn source_of_row(&self, row: usize) -> Option<&str> {
        self.entries.iter().find_map(|entry| match &entry.contribution {
            Contribution::Rows(rows) if rows.contains(&row) => Some(entry.source.as_str()),
            _ => None,
        })
    }

    /// The source that contributed `column` (join mode only).
    pub fn source_of_column(&self, column: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match &entry.contribution {
            Contribution::Columns(columns) if columns.iter().any(|c| c == column) => {
                Some(entry.source.as_str())
            }
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
