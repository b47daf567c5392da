use crate::config::DashboardConfig;
use crate::core::domain::Upload;
use crate::error::CombineResult;
use crate::preprocessing::pipeline::{CombineOutcome, CombinePipeline};

/// One user's dashboard session.
///
/// Holds the outcome of the last successful combination. A new request
/// replaces it wholesale; a failed request leaves it as it was.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pipeline: CombinePipeline,
    current: Option<CombineOutcome>,
}

impl Session {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            pipeline: CombinePipeline::with_config(config),
            current: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        self.pipeline.config()
    }

    /// Run a combination request and keep its outcome.
    pub fn process(&mut self, uploads: &[Upload]) -> CombineResult<&CombineOutcome> {
        let outcome = self.pipeline.process(uploads)?;
        Ok(&*self.current.insert(outcome))
    }

    pub fn current(&self) -> Option<&CombineOutcome> {
        self.current.as_ref()
    }

    /// Source name to color, in upload order. Empty before the first request.
    pub fn legend(&self) -> Vec<(String, String)> {
        self.current
            .as_ref()
            .map(|outcome| outcome.provenance.legend())
            .unwrap_or_default()
    }

    /// Combined table as CSV, if there is one.
    pub fn export_csv(&self) -> CombineResult<Option<String>> {
        self.current
            .as_ref()
            .map(CombineOutcome::export_csv)
            .transpose()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
