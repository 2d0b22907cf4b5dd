use crate::analytics::AnalyticsEngine;
use crate::error::{AppError, Result};
use crate::models::{AnalysisResult, Incident};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};

/// One analysis request: the incident collection to analyze plus the
/// reference instant, answered on a oneshot channel.
struct AnalysisJob {
    incidents: Vec<Incident>,
    reference: DateTime<Utc>,
    reply: oneshot::Sender<AnalysisResult>,
}

/// Handle to the dedicated analysis task.
///
/// The engine runs on its own spawned task fed by a job queue, so
/// interactive callers never run the computation inline; they send the
/// incident collection and await the result. The handle is cheap to
/// clone and safe to share.
#[derive(Clone)]
pub struct AnalysisWorker {
    tx: mpsc::Sender<AnalysisJob>,
}

impl AnalysisWorker {
    /// Spawn the worker task around an engine
    pub fn spawn(engine: AnalyticsEngine) -> Self {
        let (tx, mut rx) = mpsc::channel::<AnalysisJob>(32);

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let result = engine.analyze_at(&job.incidents, job.reference);
                if job.reply.send(result).is_err() {
                    tracing::debug!("Analysis requester dropped before receiving result");
                }
            }
            tracing::debug!("Analysis worker shutting down");
        });

        Self { tx }
    }

    /// Analyze using the current processing time as reference
    pub async fn analyze(&self, incidents: Vec<Incident>) -> Result<AnalysisResult> {
        self.analyze_at(incidents, Utc::now()).await
    }

    /// Analyze against an explicit reference instant
    pub async fn analyze_at(
        &self,
        incidents: Vec<Incident>,
        reference: DateTime<Utc>,
    ) -> Result<AnalysisResult> {
        let (reply, rx) = oneshot::channel();

        self.tx
            .send(AnalysisJob {
                incidents,
                reference,
                reply,
            })
            .await
            .map_err(|_| AppError::Internal("Analysis worker is not running".to_string()))?;

        rx.await
            .map_err(|_| AppError::Internal("Analysis worker dropped the job".to_string()))
    }
}
