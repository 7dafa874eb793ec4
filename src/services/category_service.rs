use crate::{
    errors::{AppError, AppResult, is_duplicate_key},
    models::category_model::Category,
    repositories::{
        category_repository::CategoryRepository, dashboard_repository::DashboardRepository,
    },
    types::requests::category::category_request::CategoryRequest,
    utils::locale_utils::{Messages, Namespace},
};
use bson::oid::ObjectId;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

pub struct CategoryService {
    pub category_repository: Arc<CategoryRepository>,
    pub dashboard_repository: Arc<DashboardRepository>,
}

impl CategoryService {
    pub fn new(
        category_repository: Arc<CategoryRepository>,
        dashboard_repository: Arc<DashboardRepository>,
    ) -> Self {
        Self {
            category_repository,
            dashboard_repository,
        }
    }

    fn not_found(messages: &Messages) -> AppError {
        AppError::NotFound(messages.get_str(
            Namespace::Category,
            "fetch.not_found",
            "Category not found.",
        ))
    }

    fn duplicate_name(name: &str, messages: &Messages) -> AppError {
        warn!("Rejected duplicate category name '{}'", name);
        AppError::Conflict(messages.get_str(
            Namespace::Category,
            "create.duplicate",
            "A category with this name already exists.",
        ))
    }

    fn name_write_error(err: mongodb::error::Error, name: &str, messages: &Messages) -> AppError {
        if is_duplicate_key(&err) {
            Self::duplicate_name(name, messages)
        } else {
            AppError::Database(err)
        }
    }

    async fn ensure_name_free(
        &self,
        name: &str,
        except: Option<&ObjectId>,
        messages: &Messages,
    ) -> AppResult<()> {
        if let Some(existing) = self.category_repository.find_by_name(name).await? {
            if existing._id.as_ref() != except {
                return Err(Self::duplicate_name(name, messages));
            }
        }
        Ok(())
    }

    pub async fn create_category(
        &self,
        request: CategoryRequest,
        messages: &Messages,
    ) -> AppResult<Category> {
        let name = request.name.trim().to_string();
        self.ensure_name_free(&name, None, messages).await?;

        let now = Utc::now();
        let category = Category {
            _id: Some(ObjectId::new()),
            name,
            description: request.description,
            is_public: request.is_public,
            dashboards: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let category = self
            .category_repository
            .create_category(&category)
            .await
            .map_err(|err| Self::name_write_error(err, &category.name, messages))?;
        info!("Created category '{}'", category.name);
        Ok(category)
    }

    pub async fn get_all_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.category_repository.find_all().await?)
    }

    pub async fn get_category(&self, id: &ObjectId, messages: &Messages) -> AppResult<Category> {
        self.category_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(messages))
    }

    /// Replaces name, description and visibility. Membership follows the
    /// dashboards' own `category_id`.
    pub async fn update_category(
        &self,
        id: &ObjectId,
        request: CategoryRequest,
        messages: &Messages,
    ) -> AppResult<Category> {
        let name = request.name.trim().to_string();
        self.ensure_name_free(&name, Some(id), messages).await?;

        self.category_repository
            .update_details(
                id,
                &name,
                request.description.as_deref(),
                request.is_public,
                Utc::now(),
            )
            .await
            .map_err(|err| Self::name_write_error(err, &name, messages))?
            .ok_or_else(|| Self::not_found(messages))
    }

    /// Deleting a category leaves its dashboards uncategorized.
    pub async fn delete_category(&self, id: &ObjectId, messages: &Messages) -> AppResult<()> {
        if !self.category_repository.delete_category(id).await? {
            return Err(Self::not_found(messages));
        }
        let detached = self.dashboard_repository.clear_category(id).await?;
        info!("Deleted category {} ({} dashboard(s) detached)", id, detached);
        Ok(())
    }
}
