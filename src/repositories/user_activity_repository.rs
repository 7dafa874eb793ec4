use crate::constants::USER_ACTIVITY_COL_NAME;
use crate::{config::database::get_collection, models::user_activity_model::UserActivity};
use bson::{Document, oid::ObjectId};
use futures_util::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection, error::Result};

pub struct UserActivityRepository {
    pub collection: Collection<UserActivity>,
}

impl UserActivityRepository {
    pub async fn new(client: &Client) -> Result<Self> {
        let collection = get_collection(client, (*USER_ACTIVITY_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }

    pub async fn create_activity(&self, activity: &UserActivity) -> Result<UserActivity> {
        self.collection.insert_one(activity).await?;
        Ok(activity.clone())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<UserActivity>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    /// Newest first; ObjectIds are time-ordered.
    pub async fn find_recent(
        &self,
        user_id: Option<&ObjectId>,
        limit: i64,
    ) -> Result<Vec<UserActivity>> {
        let mut filter = Document::new();
        if let Some(user_id) = user_id {
            filter.insert("user_id", user_id);
        }

        let cursor = self
            .collection
            .find(filter)
            .sort(doc! { "_id": -1 })
            .limit(limit)
            .await?;
        cursor.try_collect().await
    }

    pub async fn replace_activity(&self, activity: &UserActivity) -> Result<bool> {
        let result = self
            .collection
            .replace_one(doc! { "_id": activity._id }, activity)
            .await?;
        Ok(result.matched_count > 0)
    }
}
