use crate::{
    errors::{AppError, AppResult},
    models::dashboard_model::Dashboard,
    repositories::{
        category_repository::CategoryRepository, dashboard_repository::DashboardRepository,
        pricing_plan_repository::PricingPlanRepository, user_repository::UserRepository,
    },
    types::requests::dashboard::dashboard_request::DashboardRequest,
    utils::{
        locale_utils::{Messages, Namespace},
        request_utils::parse_object_id,
    },
};
use bson::oid::ObjectId;
use chrono::Utc;
use log::info;
use std::{collections::HashSet, sync::Arc};

pub struct DashboardService {
    pub dashboard_repository: Arc<DashboardRepository>,
    pub category_repository: Arc<CategoryRepository>,
    pub pricing_plan_repository: Arc<PricingPlanRepository>,
    pub user_repository: Arc<UserRepository>,
}

impl DashboardService {
    pub fn new(
        dashboard_repository: Arc<DashboardRepository>,
        category_repository: Arc<CategoryRepository>,
        pricing_plan_repository: Arc<PricingPlanRepository>,
        user_repository: Arc<UserRepository>,
    ) -> Self {
        Self {
            dashboard_repository,
            category_repository,
            pricing_plan_repository,
            user_repository,
        }
    }

    fn not_found(messages: &Messages) -> AppError {
        AppError::NotFound(messages.get_str(
            Namespace::Dashboard,
            "fetch.not_found",
            "Dashboard not found.",
        ))
    }

    async fn resolve_category(
        &self,
        raw: Option<&str>,
        messages: &Messages,
    ) -> AppResult<Option<ObjectId>> {
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            return Ok(None);
        };
        let id = parse_object_id(raw, "category")?;
        if self.category_repository.find_by_id(&id).await?.is_none() {
            return Err(AppError::NotFound(messages.get_str(
                Namespace::Category,
                "fetch.not_found",
                "Category not found.",
            )));
        }
        Ok(Some(id))
    }

    pub async fn create_dashboard(
        &self,
        request: DashboardRequest,
        messages: &Messages,
    ) -> AppResult<Dashboard> {
        let category_id = self.resolve_category(request.category_id.as_deref(), messages).await?;
        let now = Utc::now();
        let dashboard = Dashboard {
            _id: Some(ObjectId::new()),
            name: request.name.trim().to_string(),
            description: request.description,
            embed_url: request.embed_url,
            is_active: request.is_active.unwrap_or(true),
            is_public: request.is_public.unwrap_or(false),
            category_id,
            created_at: now,
            updated_at: now,
        };

        let dashboard = self.dashboard_repository.create_dashboard(&dashboard).await?;
        if let (Some(category_id), Some(dashboard_id)) = (category_id, dashboard._id) {
            self.category_repository.add_dashboard(&category_id, &dashboard_id).await?;
        }
        info!("Created dashboard '{}'", dashboard.name);
        Ok(dashboard)
    }

    pub async fn get_all_dashboards(&self) -> AppResult<Vec<Dashboard>> {
        Ok(self.dashboard_repository.find_all().await?)
    }

    /// Active dashboards that are public themselves or sit in a public category.
    pub async fn get_public_dashboards(&self) -> AppResult<Vec<Dashboard>> {
        let public_categories: HashSet<ObjectId> = self
            .category_repository
            .find_all()
            .await?
            .into_iter()
            .filter(|category| category.is_public)
            .filter_map(|category| category._id)
            .collect();

        Ok(self
            .dashboard_repository
            .find_active()
            .await?
            .into_iter()
            .filter(|dashboard| {
                dashboard.is_public
                    || dashboard
                        .category_id
                        .is_some_and(|id| public_categories.contains(&id))
            })
            .collect())
    }

    pub async fn get_dashboard(&self, id: &ObjectId, messages: &Messages) -> AppResult<Dashboard> {
        self.dashboard_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(messages))
    }

    /// Full replacement; omitted flags fall back to their defaults.
    pub async fn update_dashboard(
        &self,
        id: &ObjectId,
        request: DashboardRequest,
        messages: &Messages,
    ) -> AppResult<Dashboard> {
        let mut dashboard = self.get_dashboard(id, messages).await?;
        let category_id = self.resolve_category(request.category_id.as_deref(), messages).await?;

        if dashboard.category_id != category_id {
            self.category_repository.remove_dashboard_everywhere(id).await?;
            if let Some(category_id) = category_id {
                self.category_repository.add_dashboard(&category_id, id).await?;
            }
        }

        dashboard.name = request.name.trim().to_string();
        dashboard.description = request.description;
        dashboard.embed_url = request.embed_url;
        dashboard.is_active = request.is_active.unwrap_or(true);
        dashboard.is_public = request.is_public.unwrap_or(false);
        dashboard.category_id = category_id;
        dashboard.updated_at = Utc::now();

        self.dashboard_repository.replace_dashboard(&dashboard).await?;
        Ok(dashboard)
    }

    /// Deletes the dashboard and pulls it from categories, plans and user
    /// assignments.
    pub async fn delete_dashboard(&self, id: &ObjectId, messages: &Messages) -> AppResult<()> {
        if !self.dashboard_repository.delete_dashboard(id).await? {
            return Err(Self::not_found(messages));
        }

        let categories = self.category_repository.remove_dashboard_everywhere(id).await?;
        let plans = self.pricing_plan_repository.pull_dashboard(id).await?;
        let users = self.user_repository.pull_dashboard(id).await?;
        info!(
            "Deleted dashboard {} (categories: {}, plans: {}, users: {})",
            id, categories, plans, users
        );
        Ok(())
    }
}
