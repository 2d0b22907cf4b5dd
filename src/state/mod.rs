pub mod factory;
pub mod sled_store;
pub mod store;

pub use factory::{create_in_memory_store, create_store};
pub use sled_store::SledStore;
pub use store::InMemoryStore;

use crate::error::Result;
use crate::models::{AnalysisSnapshot, Incident};
use async_trait::async_trait;

/// Repository for per-user incident records and analysis snapshots.
///
/// Incident records are append-only; snapshots are replaced whole on
/// every analysis run. The engine itself never touches storage — it is
/// injected into callers that do.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Append a validated incident batch to a user's record set
    async fn append_incidents(&self, user_id: &str, incidents: &[Incident]) -> Result<()>;

    /// Load all incidents for a user, in ingestion order
    async fn load_incidents(&self, user_id: &str) -> Result<Vec<Incident>>;

    /// Count incidents stored for a user
    async fn count_incidents(&self, user_id: &str) -> Result<u64>;

    /// Persist the latest analysis snapshot for a user
    async fn save_snapshot(&self, user_id: &str, snapshot: &AnalysisSnapshot) -> Result<()>;

    /// Load the latest analysis snapshot for a user, if any
    async fn load_snapshot(&self, user_id: &str) -> Result<Option<AnalysisSnapshot>>;
}
