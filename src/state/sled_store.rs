use crate::error::{AppError, Result};
use crate::models::{AnalysisSnapshot, Incident};
use crate::state::SnapshotStore;
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;

/// Persistent snapshot store using the Sled embedded database.
///
/// Incidents and snapshots live in separate trees, both keyed by user
/// id with bincode-serialized values.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    incidents_tree: sled::Tree,
    snapshots_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(&path)
            .map_err(|e| AppError::Storage(format!("Failed to open Sled database: {}", e)))?;

        let incidents_tree = db
            .open_tree("incidents")
            .map_err(|e| AppError::Storage(format!("Failed to open incidents tree: {}", e)))?;

        let snapshots_tree = db
            .open_tree("snapshots")
            .map_err(|e| AppError::Storage(format!("Failed to open snapshots tree: {}", e)))?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            incidents_tree,
            snapshots_tree,
        })
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize value: {}", e)))
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize value: {}", e)))
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }

    /// Get database size in bytes
    pub fn size_on_disk(&self) -> Result<u64> {
        self.db
            .size_on_disk()
            .map_err(|e| AppError::Storage(format!("Failed to get database size: {}", e)))
    }
}

#[async_trait]
impl SnapshotStore for SledStore {
    async fn append_incidents(&self, user_id: &str, incidents: &[Incident]) -> Result<()> {
        let key = user_id.as_bytes();

        let mut all: Vec<Incident> = match self
            .incidents_tree
            .get(key)
            .map_err(|e| AppError::Storage(format!("Failed to read incidents: {}", e)))?
        {
            Some(bytes) => Self::deserialize(&bytes)?,
            None => Vec::new(),
        };
        all.extend_from_slice(incidents);

        let value = Self::serialize(&all)?;
        self.incidents_tree
            .insert(key, value)
            .map_err(|e| AppError::Storage(format!("Failed to save incidents: {}", e)))?;

        self.incidents_tree
            .flush()
            .map_err(|e| AppError::Storage(format!("Failed to flush incidents tree: {}", e)))?;

        tracing::debug!(user_id = %user_id, count = incidents.len(), "Incidents appended to Sled");
        Ok(())
    }

    async fn load_incidents(&self, user_id: &str) -> Result<Vec<Incident>> {
        match self
            .incidents_tree
            .get(user_id.as_bytes())
            .map_err(|e| AppError::Storage(format!("Failed to read incidents: {}", e)))?
        {
            Some(bytes) => Self::deserialize(&bytes),
            None => Ok(Vec::new()),
        }
    }

    async fn count_incidents(&self, user_id: &str) -> Result<u64> {
        Ok(self.load_incidents(user_id).await?.len() as u64)
    }

    async fn save_snapshot(&self, user_id: &str, snapshot: &AnalysisSnapshot) -> Result<()> {
        let value = Self::serialize(snapshot)?;

        self.snapshots_tree
            .insert(user_id.as_bytes(), value)
            .map_err(|e| AppError::Storage(format!("Failed to save snapshot: {}", e)))?;

        self.snapshots_tree
            .flush()
            .map_err(|e| AppError::Storage(format!("Failed to flush snapshots tree: {}", e)))?;

        tracing::debug!(user_id = %user_id, "Snapshot saved to Sled");
        Ok(())
    }

    async fn load_snapshot(&self, user_id: &str) -> Result<Option<AnalysisSnapshot>> {
        match self
            .snapshots_tree
            .get(user_id.as_bytes())
            .map_err(|e| AppError::Storage(format!("Failed to read snapshot: {}", e)))?
        {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}
