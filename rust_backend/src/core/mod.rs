//! Core domain models for the data combination backend.
//!
//! This module defines the data structures shared by every stage: uploaded
//! files, parsed sources, combination settings and source provenance.

pub mod domain;
pub mod provenance;

pub use domain::{ColumnPolicy, CombinationMode, Source, SourceFormat, Upload};
pub use provenance::{Contribution, ProvenanceMap, SourceProvenance, PALETTE};
