use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CleanupReport {
    pub removed_assignments: usize,
    pub expired_subscriptions: usize,
    pub affected_users: usize,
    pub ran_at: DateTime<Utc>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.removed_assignments == 0 && self.expired_subscriptions == 0
    }
}

#[derive(Debug, Serialize)]
pub struct CleanupStats {
    pub pending_expired_assignments: usize,
    pub pending_lapsed_subscriptions: usize,
    pub last_run: Option<CleanupReport>,
    pub checked_at: DateTime<Utc>,
}
