use crate::constants::PRICING_PLAN_COL_NAME;
use crate::{config::database::get_collection, models::pricing_plan_model::PricingPlan};
use bson::oid::ObjectId;
use futures_util::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection, error::Result};

pub struct PricingPlanRepository {
    pub collection: Collection<PricingPlan>,
}

impl PricingPlanRepository {
    pub async fn new(client: &Client) -> Result<Self> {
        let collection = get_collection(client, (*PRICING_PLAN_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }

    pub async fn create_plan(&self, plan: &PricingPlan) -> Result<PricingPlan> {
        self.collection.insert_one(plan).await?;
        Ok(plan.clone())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PricingPlan>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_all(&self) -> Result<Vec<PricingPlan>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "price_minor": 1, "name": 1 })
            .await?;
        cursor.try_collect().await
    }

    pub async fn find_active(&self) -> Result<Vec<PricingPlan>> {
        let cursor = self
            .collection
            .find(doc! { "is_active": true })
            .sort(doc! { "price_minor": 1, "name": 1 })
            .await?;
        cursor.try_collect().await
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<PricingPlan>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        cursor.try_collect().await
    }

    pub async fn replace_plan(&self, plan: &PricingPlan) -> Result<bool> {
        let result = self
            .collection
            .replace_one(doc! { "_id": plan._id }, plan)
            .await?;
        Ok(result.matched_count > 0)
    }

    pub async fn pull_dashboard(&self, dashboard_id: &ObjectId) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "dashboards": dashboard_id },
                doc! { "$pull": { "dashboards": dashboard_id } },
            )
            .await?;
        Ok(result.modified_count)
    }

    pub async fn delete_plan(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
