use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// How long a progress record is kept after its last update
pub const UPLOAD_RETENTION_SECS: i64 = 300;
/// How often the background sweep runs (in seconds)
pub const SWEEP_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Received,
    Analyzing,
    Completed,
    Error,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadProgress {
    pub status: UploadStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diary_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub owner: Uuid,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

/// Process-wide store of upload progress records keyed by upload id.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    records: Arc<RwLock<HashMap<Uuid, UploadProgress>>>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new upload for `owner` and returns its id.
    pub async fn start(&self, owner: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let record = UploadProgress {
            status: UploadStatus::Received,
            progress: 10,
            diary_id: None,
            error: None,
            owner,
            updated_at: Utc::now(),
        };
        self.records.write().await.insert(id, record);
        id
    }

    pub async fn advance(&self, id: Uuid, status: UploadStatus, progress: u8) {
        if let Some(record) = self.records.write().await.get_mut(&id) {
            record.status = status;
            record.progress = progress.min(100);
            record.updated_at = Utc::now();
        }
    }

    pub async fn complete(&self, id: Uuid, diary_id: Uuid) {
        if let Some(record) = self.records.write().await.get_mut(&id) {
            record.status = UploadStatus::Completed;
            record.progress = 100;
            record.diary_id = Some(diary_id);
            record.updated_at = Utc::now();
        }
    }

    pub async fn fail(&self, id: Uuid, error: impl Into<String>) {
        if let Some(record) = self.records.write().await.get_mut(&id) {
            record.status = UploadStatus::Error;
            record.error = Some(error.into());
            record.updated_at = Utc::now();
        }
    }

    /// Current record of an upload owned by `owner`. A terminal record is
    /// handed out once and then forgotten.
    pub async fn poll(&self, id: Uuid, owner: Uuid) -> Option<UploadProgress> {
        let mut records = self.records.write().await;
        let record = records.get(&id).filter(|r| r.owner == owner)?.clone();
        if record.status.is_terminal() {
            records.remove(&id);
        }
        Some(record)
    }

    /// Drops records not touched within the retention period. Returns how many went.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| (now - r.updated_at).num_seconds() < UPLOAD_RETENTION_SECS);
        before - records.len()
    }

    pub async fn tracked(&self) -> usize {
        self.records.read().await.len()
    }
}

/// Background task that periodically sweeps stale progress records.
pub fn spawn_sweeper(tracker: UploadTracker) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let removed = tracker.sweep(Utc::now()).await;
            if removed > 0 {
                tracing::info!(removed, "Swept stale upload progress records");
            }
        }
    })
}
