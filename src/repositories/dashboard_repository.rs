use crate::constants::DASHBOARD_COL_NAME;
use crate::{config::database::get_collection, models::dashboard_model::Dashboard};
use bson::oid::ObjectId;
use futures_util::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection, error::Result};

pub struct DashboardRepository {
    pub collection: Collection<Dashboard>,
}

impl DashboardRepository {
    pub async fn new(client: &Client) -> Result<Self> {
        let collection = get_collection(client, (*DASHBOARD_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }

    pub async fn create_dashboard(&self, dashboard: &Dashboard) -> Result<Dashboard> {
        self.collection.insert_one(dashboard).await?;
        Ok(dashboard.clone())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Dashboard>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_all(&self) -> Result<Vec<Dashboard>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "name": 1 }).await?;
        cursor.try_collect().await
    }

    pub async fn find_active(&self) -> Result<Vec<Dashboard>> {
        let cursor = self
            .collection
            .find(doc! { "is_active": true })
            .sort(doc! { "name": 1 })
            .await?;
        cursor.try_collect().await
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Dashboard>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        cursor.try_collect().await
    }

    pub async fn count_by_ids(&self, ids: &[ObjectId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.collection
            .count_documents(doc! { "_id": { "$in": ids } })
            .await
    }

    pub async fn replace_dashboard(&self, dashboard: &Dashboard) -> Result<bool> {
        let result = self
            .collection
            .replace_one(doc! { "_id": dashboard._id }, dashboard)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Detaches every dashboard from a deleted category.
    pub async fn clear_category(&self, category_id: &ObjectId) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "category_id": category_id },
                doc! { "$unset": { "category_id": "" } },
            )
            .await?;
        Ok(result.modified_count)
    }

    pub async fn delete_dashboard(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
