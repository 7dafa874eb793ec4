use crate::{
    errors::{AppError, AppResult},
    models::pricing_plan_model::PricingPlan,
    repositories::{
        dashboard_repository::DashboardRepository, pricing_plan_repository::PricingPlanRepository,
    },
    types::requests::pricing::pricing_plan_request::PricingPlanRequest,
    utils::{
        locale_utils::{Messages, Namespace},
        request_utils::parse_object_ids,
    },
};
use bson::oid::ObjectId;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

pub struct PricingService {
    pub pricing_plan_repository: Arc<PricingPlanRepository>,
    pub dashboard_repository: Arc<DashboardRepository>,
}

impl PricingService {
    pub fn new(
        pricing_plan_repository: Arc<PricingPlanRepository>,
        dashboard_repository: Arc<DashboardRepository>,
    ) -> Self {
        Self {
            pricing_plan_repository,
            dashboard_repository,
        }
    }

    fn not_found(messages: &Messages) -> AppError {
        AppError::NotFound(messages.get_str(
            Namespace::Pricing,
            "plans.not_found",
            "Pricing plan not found.",
        ))
    }

    async fn bundled_dashboards(
        &self,
        raw: &[String],
        messages: &Messages,
    ) -> AppResult<Vec<ObjectId>> {
        let ids = parse_object_ids(raw, "dashboard")?;
        let found = self.dashboard_repository.count_by_ids(&ids).await?;
        if found != ids.len() as u64 {
            warn!("Plan references {} dashboard(s) but only {} exist", ids.len(), found);
            return Err(AppError::BadRequest(messages.get_str(
                Namespace::Pricing,
                "plans.unknown_dashboard",
                "The plan references a dashboard that does not exist.",
            )));
        }
        Ok(ids)
    }

    fn clean_features(features: Vec<String>) -> Vec<String> {
        features
            .into_iter()
            .map(|feature| feature.trim().to_string())
            .filter(|feature| !feature.is_empty())
            .collect()
    }

    pub async fn create_plan(
        &self,
        request: PricingPlanRequest,
        messages: &Messages,
    ) -> AppResult<PricingPlan> {
        let dashboards = self.bundled_dashboards(&request.dashboards, messages).await?;
        let now = Utc::now();
        let plan = PricingPlan {
            _id: Some(ObjectId::new()),
            name: request.name.trim().to_string(),
            description: request.description,
            price_minor: request.price_minor,
            currency: request.currency,
            billing_cycle: request.billing_cycle,
            features: Self::clean_features(request.features),
            dashboards,
            trial_days: request.trial_days,
            is_active: request.is_active.unwrap_or(true),
            stripe_price_id: request.stripe_price_id,
            created_at: now,
            updated_at: now,
        };

        let plan = self.pricing_plan_repository.create_plan(&plan).await?;
        info!("Created pricing plan '{}' ({} {})", plan.name, plan.price_minor, plan.currency);
        Ok(plan)
    }

    pub async fn get_active_plans(&self) -> AppResult<Vec<PricingPlan>> {
        Ok(self.pricing_plan_repository.find_active().await?)
    }

    pub async fn get_all_plans(&self) -> AppResult<Vec<PricingPlan>> {
        Ok(self.pricing_plan_repository.find_all().await?)
    }

    pub async fn get_plan(&self, id: &ObjectId, messages: &Messages) -> AppResult<PricingPlan> {
        self.pricing_plan_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(messages))
    }

    pub async fn update_plan(
        &self,
        id: &ObjectId,
        request: PricingPlanRequest,
        messages: &Messages,
    ) -> AppResult<PricingPlan> {
        let mut plan = self.get_plan(id, messages).await?;
        plan.dashboards = self.bundled_dashboards(&request.dashboards, messages).await?;
        plan.name = request.name.trim().to_string();
        plan.description = request.description;
        plan.price_minor = request.price_minor;
        plan.currency = request.currency;
        plan.billing_cycle = request.billing_cycle;
        plan.features = Self::clean_features(request.features);
        plan.trial_days = request.trial_days;
        plan.is_active = request.is_active.unwrap_or(true);
        plan.stripe_price_id = request.stripe_price_id;
        plan.updated_at = Utc::now();

        self.pricing_plan_repository.replace_plan(&plan).await?;
        Ok(plan)
    }

    /// Existing subscriptions keep their `plan_id`; the resolver skips the
    /// missing plan.
    pub async fn delete_plan(&self, id: &ObjectId, messages: &Messages) -> AppResult<()> {
        if !self.pricing_plan_repository.delete_plan(id).await? {
            return Err(Self::not_found(messages));
        }
        info!("Deleted pricing plan {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_features_are_dropped() {
        let cleaned =
            PricingService::clean_features(vec![" Export ".into(), "  ".into(), "SSO".into()]);
        assert_eq!(cleaned, vec!["Export", "SSO"]);
    }
}
