//! Removes expired dashboard assignments and lapses subscriptions whose
//! billing period has ended.
//!
//! Runs on a fixed interval on the actix runtime and on demand from the admin
//! API. Runs are serialized; the most recent report is kept in memory for the
//! stats endpoint.

use crate::{
    errors::AppResult,
    models::{
        subscription_model::Subscription,
        user_model::{DashboardAssignment, User},
    },
    repositories::{
        subscription_repository::SubscriptionRepository, user_repository::UserRepository,
    },
    types::responses::cleanup_response::{CleanupReport, CleanupStats},
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::{sync::Arc, time::Duration};
use tokio::sync::{Mutex, RwLock};

/// Users holding expired assignments, paired with exactly those assignments.
fn expired_by_user(
    users: &[User],
    now: DateTime<Utc>,
) -> Vec<(ObjectId, Vec<DashboardAssignment>)> {
    users
        .iter()
        .filter_map(|user| {
            let expired = user.expired_assignments(now);
            match (user._id, expired.is_empty()) {
                (Some(id), false) => Some((id, expired)),
                _ => None,
            }
        })
        .collect()
}

fn lapsed(subscriptions: &[Subscription], now: DateTime<Utc>) -> Vec<&Subscription> {
    subscriptions
        .iter()
        .filter(|subscription| subscription.has_lapsed(now))
        .collect()
}

pub struct CleanupService {
    pub user_repository: Arc<UserRepository>,
    pub subscription_repository: Arc<SubscriptionRepository>,
    last_report: RwLock<Option<CleanupReport>>,
    run_lock: Mutex<()>,
}

impl CleanupService {
    pub fn new(
        user_repository: Arc<UserRepository>,
        subscription_repository: Arc<SubscriptionRepository>,
    ) -> Self {
        Self {
            user_repository,
            subscription_repository,
            last_report: RwLock::new(None),
            run_lock: Mutex::new(()),
        }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> AppResult<CleanupReport> {
        let _guard = self.run_lock.lock().await;

        // Writes only apply to documents still in the state read here.
        let users = self.user_repository.find_with_expiring_assignments().await?;
        let mut removed_assignments = 0;
        let mut affected_users = 0;
        for (id, expired) in expired_by_user(&users, now) {
            if self
                .user_repository
                .pull_expired_assignments(&id, &expired, now)
                .await?
            {
                removed_assignments += expired.len();
                affected_users += 1;
            }
        }

        let subscriptions = self.subscription_repository.find_live().await?;
        let mut expired_subscriptions = 0;
        for subscription in lapsed(&subscriptions, now) {
            if self
                .subscription_repository
                .lapse_if_unchanged(subscription, now)
                .await?
            {
                expired_subscriptions += 1;
            } else {
                debug!("Subscription {:?} changed during cleanup; left as is", subscription._id);
            }
        }

        let report = CleanupReport {
            removed_assignments,
            expired_subscriptions,
            affected_users,
            ran_at: now,
        };

        if report.is_empty() {
            debug!("Cleanup found nothing to do");
        } else {
            info!(
                "Cleanup removed {} assignment(s) from {} user(s) and lapsed {} subscription(s)",
                report.removed_assignments, report.affected_users, report.expired_subscriptions
            );
        }

        *self.last_report.write().await = Some(report.clone());
        Ok(report)
    }

    /// Read-only counts of what the next run would change.
    pub async fn stats(&self, now: DateTime<Utc>) -> AppResult<CleanupStats> {
        let pending_expired_assignments = self
            .user_repository
            .find_with_expiring_assignments()
            .await?
            .iter()
            .map(|user| user.expired_assignment_count(now))
            .sum();
        let pending_lapsed_subscriptions = self
            .subscription_repository
            .find_live()
            .await?
            .iter()
            .filter(|subscription| subscription.has_lapsed(now))
            .count();

        Ok(CleanupStats {
            pending_expired_assignments,
            pending_lapsed_subscriptions,
            last_run: self.last_report.read().await.clone(),
            checked_at: now,
        })
    }

    pub fn spawn_periodic(self: Arc<Self>, interval_secs: u64) {
        let period = Duration::from_secs(interval_secs.max(1));
        info!("Cleanup job scheduled every {}s", period.as_secs());

        actix_rt::spawn(async move {
            let mut interval = actix_rt::time::interval(period);
            loop {
                interval.tick().await;
                if let Err(err) = self.run(Utc::now()).await {
                    error!("Scheduled cleanup failed: {}", err);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{subscription_model::fixtures::subscription, user_model::fixtures::user},
        types::models::{pricing::subscription_status::SubscriptionStatus, user::role::Role},
    };
    use chrono::Duration as ChronoDuration;

    fn with_assignments(expiries: &[Option<ChronoDuration>], now: DateTime<Utc>) -> User {
        let mut user = user(Role::User);
        user.dashboard_assignments = expiries
            .iter()
            .map(|offset| DashboardAssignment {
                dashboard_id: ObjectId::new(),
                assigned_at: now - ChronoDuration::days(30),
                expires_at: offset.map(|offset| now + offset),
            })
            .collect();
        user
    }

    #[test]
    fn picks_only_users_with_expired_assignments() {
        let now = Utc::now();
        let users = vec![
            with_assignments(&[Some(ChronoDuration::hours(-1)), None], now),
            with_assignments(&[Some(ChronoDuration::hours(5))], now),
            with_assignments(
                &[Some(ChronoDuration::days(-2)), Some(ChronoDuration::seconds(-1))],
                now,
            ),
        ];

        let expired = expired_by_user(&users, now);
        assert_eq!(expired.len(), 2);
        assert_eq!(expired[0].0, users[0]._id.unwrap());
        assert_eq!(expired[0].1.len(), 1);
        assert_eq!(expired[1].0, users[2]._id.unwrap());
        assert_eq!(expired[1].1.len(), 2);
        assert!(expired.iter().flat_map(|(_, a)| a).all(|a| a.expires_at.is_some()));
    }

    #[test]
    fn lapses_only_subscriptions_past_period_end() {
        let now = Utc::now();
        let user_id = ObjectId::new();
        let subscriptions = vec![
            subscription(
                user_id,
                ObjectId::new(),
                SubscriptionStatus::Active,
                ChronoDuration::days(-1),
            ),
            subscription(
                user_id,
                ObjectId::new(),
                SubscriptionStatus::Trialing,
                ChronoDuration::days(3),
            ),
            subscription(
                user_id,
                ObjectId::new(),
                SubscriptionStatus::Trialing,
                ChronoDuration::minutes(-5),
            ),
        ];

        let picked: Vec<_> = lapsed(&subscriptions, now).into_iter().map(|s| s._id).collect();
        assert_eq!(picked, vec![subscriptions[0]._id, subscriptions[2]._id]);
    }
}
