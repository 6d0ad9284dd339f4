use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::models::{CaseRecord, FeedbackEntry, FeedbackRequest, ResolvedFeedback};
use crate::stats::{self, BenchmarkSummary};
use crate::store::Store;

/// The query surface the API/UI layer talks to. Thin forwarding over the
/// store plus on-demand aggregation; holds no state of its own.
#[derive(Clone)]
pub struct ReviewService {
    store: Store,
    config: PipelineConfig,
}

impl ReviewService {
    pub fn new(store: Store, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    /// Store a freshly built case record, replacing any prior run.
    pub async fn record_case(&self, case: CaseRecord) -> Result<()> {
        self.store.upsert_case(case).await
    }

    pub async fn list_cases(&self) -> Result<Vec<CaseRecord>> {
        self.store.list_cases().await
    }

    pub async fn get_case(&self, property_id: &str) -> Result<CaseRecord> {
        self.store
            .get_case(property_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("property '{property_id}'")))
    }

    pub async fn feedback_log(&self) -> Result<Vec<FeedbackEntry>> {
        self.store.list_feedback().await
    }

    pub async fn resolved_feedback(&self, property_id: &str) -> Result<ResolvedFeedback> {
        self.store.resolved_feedback(property_id).await
    }

    pub async fn append_feedback(&self, request: FeedbackRequest) -> Result<FeedbackEntry> {
        self.store.append_feedback(request).await
    }

    pub async fn reset_feedback(&self) -> Result<()> {
        self.store.reset_feedback().await
    }

    /// Recompute the benchmark summary from a single store snapshot.
    pub async fn benchmark_summary(&self) -> Result<BenchmarkSummary> {
        let (cases, feedback) = self.store.snapshot().await?;
        Ok(stats::summarize(&self.config, &cases, &feedback))
    }
}
