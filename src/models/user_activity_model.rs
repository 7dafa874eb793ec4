use crate::types::models::activity::activity_action::ActivityAction;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit record.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserActivity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub user_id: ObjectId,

    pub action: ActivityAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<ObjectId>,

    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl UserActivity {
    pub fn new(user_id: ObjectId, action: ActivityAction, now: DateTime<Utc>) -> Self {
        Self {
            _id: Some(ObjectId::new()),
            user_id,
            action,
            dashboard_id: None,
            plan_id: None,
            subscription_id: None,
            ticket_id: None,
            started_at: now,
            ended_at: None,
            duration_secs: None,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Closes an open activity; returns `false` if it was already closed.
    pub fn finish(&mut self, now: DateTime<Utc>) -> bool {
        if self.ended_at.is_some() {
            return false;
        }
        let ended_at = now.max(self.started_at);
        self.ended_at = Some(ended_at);
        self.duration_secs = Some((ended_at - self.started_at).num_seconds());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn finish_records_duration_once() {
        let start = Utc::now();
        let mut activity = UserActivity::new(ObjectId::new(), ActivityAction::ViewDashboard, start);

        assert!(activity.finish(start + Duration::seconds(95)));
        assert_eq!(activity.duration_secs, Some(95));
        assert!(!activity.finish(start + Duration::seconds(200)));
        assert_eq!(activity.duration_secs, Some(95));
    }

    #[test]
    fn finish_never_goes_negative() {
        let start = Utc::now();
        let mut activity = UserActivity::new(ObjectId::new(), ActivityAction::ViewDashboard, start);
        activity.finish(start - Duration::seconds(10));
        assert_eq!(activity.duration_secs, Some(0));
    }
}
