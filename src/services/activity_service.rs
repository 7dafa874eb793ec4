use crate::{
    constants::{DEFAULT_ACTIVITY_LIMIT, MAX_ACTIVITY_LIMIT},
    errors::{AppError, AppResult},
    middleware::auth_middleware::AuthUser,
    models::user_activity_model::UserActivity,
    repositories::user_activity_repository::UserActivityRepository,
    types::models::activity::activity_action::ActivityAction,
    utils::{
        locale_utils::{Messages, Namespace},
        request_utils::RequestMeta,
    },
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use log::error;
use std::sync::Arc;

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, MAX_ACTIVITY_LIMIT)
}

pub struct ActivityService {
    pub activity_repository: Arc<UserActivityRepository>,
}

impl ActivityService {
    pub fn new(activity_repository: Arc<UserActivityRepository>) -> Self {
        Self { activity_repository }
    }

    pub fn start(
        user_id: ObjectId,
        action: ActivityAction,
        meta: &RequestMeta,
        now: DateTime<Utc>,
    ) -> UserActivity {
        let mut activity = UserActivity::new(user_id, action, now);
        activity.ip_address = meta.ip_address.clone();
        activity.user_agent = meta.user_agent.clone();
        activity
    }

    /// Audit writes never fail the request they describe.
    pub async fn record(&self, activity: UserActivity) -> Option<UserActivity> {
        match self.activity_repository.create_activity(&activity).await {
            Ok(saved) => Some(saved),
            Err(err) => {
                error!(
                    "Failed to record {} activity for user {}: {}",
                    activity.action, activity.user_id, err
                );
                None
            }
        }
    }

    /// Closes an open activity (e.g. a dashboard view). Closing twice keeps
    /// the first end time.
    pub async fn finish(
        &self,
        id: &ObjectId,
        user: &AuthUser,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<UserActivity> {
        let mut activity = self
            .activity_repository
            .find_by_id(id)
            .await?
            .filter(|activity| user.is_admin() || activity.user_id == user.id)
            .ok_or_else(|| {
                AppError::NotFound(messages.get_str(
                    Namespace::Dashboard,
                    "activity.not_found",
                    "Activity not found.",
                ))
            })?;

        if activity.finish(now) {
            self.activity_repository.replace_activity(&activity).await?;
        }
        Ok(activity)
    }

    pub async fn list_activity(
        &self,
        user_id: Option<&ObjectId>,
        limit: Option<i64>,
    ) -> AppResult<Vec<UserActivity>> {
        Ok(self
            .activity_repository
            .find_recent(user_id, clamp_limit(limit))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_is_bounded() {
        assert_eq!(clamp_limit(None), DEFAULT_ACTIVITY_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(1_000_000)), MAX_ACTIVITY_LIMIT);
    }

    #[test]
    fn started_activity_carries_request_meta() {
        let meta = RequestMeta {
            ip_address: Some("198.51.100.4".to_string()),
            user_agent: Some("portal".to_string()),
        };
        let activity =
            ActivityService::start(ObjectId::new(), ActivityAction::Login, &meta, Utc::now());
        assert_eq!(activity.ip_address.as_deref(), Some("198.51.100.4"));
        assert!(activity.ended_at.is_none());
    }
}
