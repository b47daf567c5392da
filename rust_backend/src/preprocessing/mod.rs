//! Request processing: schema checks and the end-to-end combination pipeline.

pub mod pipeline;
pub mod validator;

pub use pipeline::{CombineOutcome, CombinePipeline, OutcomePayload};
pub use validator::{SchemaRequirement, SchemaValidator};
