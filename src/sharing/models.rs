use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub id: Uuid,
    /// Exactly the users the entry should end up shared with.
    pub usernames: Vec<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub changes: u32,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SharedUsersQuery {
    pub id: Uuid,
}
