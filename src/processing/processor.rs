use crate::error::{AppError, Result};
use crate::forecast::ForecastService;
use crate::ingest::parse_incidents;
use crate::models::AnalysisSnapshot;
use crate::processing::AnalysisWorker;
use crate::state::SnapshotStore;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of a successful batch ingestion
#[derive(Debug)]
pub struct IngestOutcome {
    /// Identifier assigned to the uploaded batch
    pub batch_id: Uuid,

    /// Number of incidents ingested
    pub ingested: usize,

    /// The refreshed snapshot computed from the full record set
    pub snapshot: AnalysisSnapshot,
}

/// Main incident processor.
///
/// Orchestrates the pipeline: validate and ingest a batch, append it
/// to the user's record set, recompute the analysis on the worker,
/// attach forecast and recommendations, and persist the snapshot.
pub struct IncidentProcessor {
    store: Arc<dyn SnapshotStore>,
    worker: AnalysisWorker,
    forecasts: Arc<ForecastService>,
}

impl IncidentProcessor {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        worker: AnalysisWorker,
        forecasts: Arc<ForecastService>,
    ) -> Self {
        Self {
            store,
            worker,
            forecasts,
        }
    }

    /// Get a reference to the snapshot store
    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Ingest a CSV batch for a user and recompute their snapshot.
    ///
    /// Validation failures abort before anything is stored; a batch
    /// with any bad row is never partially ingested.
    pub async fn ingest_csv(&self, user_id: &str, data: &[u8]) -> Result<IngestOutcome> {
        let batch_id = Uuid::new_v4();

        let incidents = parse_incidents(data, Utc::now())?;

        tracing::info!(
            user_id = %user_id,
            batch_id = %batch_id,
            count = incidents.len(),
            "Validated incident batch"
        );

        self.store.append_incidents(user_id, &incidents).await?;

        let snapshot = self.refresh(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            batch_id = %batch_id,
            total_incidents = snapshot.analysis.total_incidents,
            elevated_areas = snapshot.analysis.elevated_areas().len(),
            "Batch ingested and snapshot refreshed"
        );

        Ok(IngestOutcome {
            batch_id,
            ingested: incidents.len(),
            snapshot,
        })
    }

    /// Recompute and persist the snapshot from a user's stored
    /// incidents
    pub async fn refresh(&self, user_id: &str) -> Result<AnalysisSnapshot> {
        let incidents = self.store.load_incidents(user_id).await?;
        let analysis = self.worker.analyze(incidents).await?;

        let (forecast, recommendations) = self.forecasts.generate(&analysis).await;

        let snapshot = AnalysisSnapshot {
            analysis,
            forecast,
            recommendations,
            created_at: Utc::now(),
        };

        self.store.save_snapshot(user_id, &snapshot).await?;
        Ok(snapshot)
    }

    /// Load the latest persisted snapshot for a user
    pub async fn latest(&self, user_id: &str) -> Result<Option<AnalysisSnapshot>> {
        self.store.load_snapshot(user_id).await
    }

    /// Flip the completed flag on one of a user's stored
    /// recommendations and persist the updated snapshot
    pub async fn toggle_recommendation(
        &self,
        user_id: &str,
        index: usize,
    ) -> Result<AnalysisSnapshot> {
        let mut snapshot = self
            .store
            .load_snapshot(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No snapshot for user {}", user_id)))?;

        let recommendation_count = snapshot.recommendations.len();
        let recommendation = snapshot.recommendations.get_mut(index).ok_or_else(|| {
            AppError::NotFound(format!(
                "No recommendation at index {} (snapshot has {})",
                index, recommendation_count
            ))
        })?;
        recommendation.completed = !recommendation.completed;

        self.store.save_snapshot(user_id, &snapshot).await?;
        Ok(snapshot)
    }
}
