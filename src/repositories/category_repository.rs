use crate::constants::CATEGORY_COL_NAME;
use crate::{config::database::get_collection, models::category_model::Category};
use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::{Client, Collection, error::Result, options::ReturnDocument};

/// Name, description and visibility only; `dashboards` is maintained by
/// `$addToSet`/`$pull` and never rewritten here.
fn details_update(
    name: &str,
    description: Option<&str>,
    is_public: bool,
    now: DateTime<Utc>,
) -> bson::ser::Result<Document> {
    let mut set = doc! { "name": name, "is_public": is_public, "updated_at": to_bson(&now)? };
    let mut update = Document::new();
    match description {
        Some(description) => {
            set.insert("description", description);
        }
        None => {
            update.insert("$unset", doc! { "description": "" });
        }
    }
    update.insert("$set", set);
    Ok(update)
}

pub struct CategoryRepository {
    pub collection: Collection<Category>,
}

impl CategoryRepository {
    pub async fn new(client: &Client) -> Result<Self> {
        let collection = get_collection(client, (*CATEGORY_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }

    pub async fn create_category(&self, category: &Category) -> Result<Category> {
        self.collection.insert_one(category).await?;
        Ok(category.clone())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Category>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.collection.find_one(doc! { "name": name }).await
    }

    pub async fn find_all(&self) -> Result<Vec<Category>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "name": 1 }).await?;
        cursor.try_collect().await
    }

    pub async fn update_details(
        &self,
        id: &ObjectId,
        name: &str,
        description: Option<&str>,
        is_public: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Category>> {
        self.collection
            .find_one_and_update(
                doc! { "_id": id },
                details_update(name, description, is_public, now)?,
            )
            .return_document(ReturnDocument::After)
            .await
    }

    pub async fn add_dashboard(
        &self,
        category_id: &ObjectId,
        dashboard_id: &ObjectId,
    ) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": category_id },
                doc! { "$addToSet": { "dashboards": dashboard_id } },
            )
            .await?;
        Ok(())
    }

    pub async fn remove_dashboard_everywhere(&self, dashboard_id: &ObjectId) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "dashboards": dashboard_id },
                doc! { "$pull": { "dashboards": dashboard_id } },
            )
            .await?;
        Ok(result.modified_count)
    }

    pub async fn delete_category(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
