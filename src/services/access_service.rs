use crate::{
    errors::{AppError, AppResult},
    middleware::auth_middleware::AuthUser,
    repositories::{
        category_repository::CategoryRepository, dashboard_repository::DashboardRepository,
        pricing_plan_repository::PricingPlanRepository,
        subscription_repository::SubscriptionRepository, user_repository::UserRepository,
    },
    services::{
        access_resolver::{AccessInput, find_dashboard, resolve_dashboard_access},
        activity_service::ActivityService,
    },
    types::{
        models::activity::activity_action::ActivityAction,
        responses::dashboard_access_response::{CategoryAccess, DashboardViewResponse},
    },
    utils::{
        locale_utils::{Messages, Namespace},
        request_utils::RequestMeta,
    },
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use log::warn;
use std::sync::Arc;

/// Loads everything the resolver needs for one user.
pub struct AccessService {
    pub user_repository: Arc<UserRepository>,
    pub dashboard_repository: Arc<DashboardRepository>,
    pub category_repository: Arc<CategoryRepository>,
    pub subscription_repository: Arc<SubscriptionRepository>,
    pub pricing_plan_repository: Arc<PricingPlanRepository>,
    pub activity_service: Arc<ActivityService>,
}

impl AccessService {
    pub fn new(
        user_repository: Arc<UserRepository>,
        dashboard_repository: Arc<DashboardRepository>,
        category_repository: Arc<CategoryRepository>,
        subscription_repository: Arc<SubscriptionRepository>,
        pricing_plan_repository: Arc<PricingPlanRepository>,
        activity_service: Arc<ActivityService>,
    ) -> Self {
        Self {
            user_repository,
            dashboard_repository,
            category_repository,
            subscription_repository,
            pricing_plan_repository,
            activity_service,
        }
    }

    pub async fn dashboards_for_user(
        &self,
        user_id: &ObjectId,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<Vec<CategoryAccess>> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(messages.get_str(
                    Namespace::User,
                    "fetch.not_found",
                    "User not found.",
                ))
            })?;

        let (dashboards, categories, subscriptions) = futures::try_join!(
            self.dashboard_repository.find_active(),
            self.category_repository.find_all(),
            self.subscription_repository.find_by_user(user_id),
        )?;

        let mut plan_ids: Vec<ObjectId> = subscriptions
            .iter()
            .filter(|subscription| subscription.grants_access(now))
            .map(|subscription| subscription.plan_id)
            .collect();
        plan_ids.sort();
        plan_ids.dedup();
        let plans = self.pricing_plan_repository.find_by_ids(&plan_ids).await?;

        Ok(resolve_dashboard_access(
            AccessInput {
                dashboards: &dashboards,
                categories: &categories,
                assignments: &user.dashboard_assignments,
                subscriptions: &subscriptions,
                plans: &plans,
            },
            now,
        ))
    }

    /// Checks access to one dashboard and opens a view activity for it.
    pub async fn view_dashboard(
        &self,
        user: &AuthUser,
        dashboard_id: &ObjectId,
        meta: &RequestMeta,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<DashboardViewResponse> {
        let resolved = self.dashboards_for_user(&user.id, now, messages).await?;
        let dashboard = find_dashboard(&resolved, &dashboard_id.to_hex())
            .filter(|dashboard| dashboard.has_access)
            .cloned()
            .ok_or_else(|| {
                warn!("User {} denied dashboard {}", user.email, dashboard_id);
                AppError::Forbidden(messages.get_str(
                    Namespace::Dashboard,
                    "view.forbidden",
                    "You do not have access to this dashboard.",
                ))
            })?;

        let mut activity =
            ActivityService::start(user.id, ActivityAction::ViewDashboard, meta, now);
        activity.dashboard_id = Some(*dashboard_id);
        let activity_id = self
            .activity_service
            .record(activity)
            .await
            .and_then(|activity| activity._id)
            .map(|id| id.to_hex())
            .unwrap_or_default();

        Ok(DashboardViewResponse { activity_id, dashboard })
    }
}
