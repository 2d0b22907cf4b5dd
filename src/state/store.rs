use crate::error::Result;
use crate::models::{AnalysisSnapshot, Incident};
use crate::state::SnapshotStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory snapshot store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    incidents: Arc<DashMap<String, Vec<Incident>>>,
    snapshots: Arc<DashMap<String, AnalysisSnapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            incidents: Arc::new(DashMap::new()),
            snapshots: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn append_incidents(&self, user_id: &str, incidents: &[Incident]) -> Result<()> {
        self.incidents
            .entry(user_id.to_string())
            .or_default()
            .extend_from_slice(incidents);

        tracing::debug!(user_id = %user_id, count = incidents.len(), "Incidents appended");
        Ok(())
    }

    async fn load_incidents(&self, user_id: &str) -> Result<Vec<Incident>> {
        Ok(self
            .incidents
            .get(user_id)
            .map(|entry| entry.clone())
            .unwrap_or_default())
    }

    async fn count_incidents(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .incidents
            .get(user_id)
            .map(|entry| entry.len() as u64)
            .unwrap_or(0))
    }

    async fn save_snapshot(&self, user_id: &str, snapshot: &AnalysisSnapshot) -> Result<()> {
        self.snapshots.insert(user_id.to_string(), snapshot.clone());
        tracing::debug!(user_id = %user_id, "Snapshot saved");
        Ok(())
    }

    async fn load_snapshot(&self, user_id: &str) -> Result<Option<AnalysisSnapshot>> {
        Ok(self.snapshots.get(user_id).map(|entry| entry.clone()))
    }
}
