use crate::constants::USER_COL_NAME;
use crate::{
    config::database::get_collection,
    models::user_model::{DashboardAssignment, User},
};
use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::bson::{Bson, doc, to_bson};
use mongodb::{Client, Collection, error::Result, options::ReturnDocument};

/// Pulls the assignments whose expiry matches one of `expired`. Expiries are
/// compared exactly, so a grant re-issued since the read is left alone.
fn pull_expired_update(
    expired: &[DashboardAssignment],
    now: DateTime<Utc>,
) -> bson::ser::Result<Document> {
    let expiries = expired
        .iter()
        .filter_map(|assignment| assignment.expires_at.as_ref())
        .map(to_bson)
        .collect::<bson::ser::Result<Vec<Bson>>>()?;
    Ok(doc! {
        "$pull": { "dashboard_assignments": { "expires_at": { "$in": expiries } } },
        "$set": { "updated_at": to_bson(&now)? },
    })
}

pub struct UserRepository {
    pub collection: Collection<User>,
}

impl UserRepository {
    pub async fn new(client: &Client) -> Result<Self> {
        let collection = get_collection(client, (*USER_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        self.collection.insert_one(user).await?;
        Ok(user.clone())
    }

    pub async fn find_user(&self, field: &str, value: &str) -> Result<Option<User>> {
        let mut filter = Document::new();
        filter.insert(field, value);
        self.collection.find_one(filter).await
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": 1 }).await?;
        cursor.try_collect().await
    }

    /// Users holding at least one assignment with an expiry date.
    pub async fn find_with_expiring_assignments(&self) -> Result<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! { "dashboard_assignments.expires_at": { "$exists": true } })
            .await?;
        cursor.try_collect().await
    }

    /// Applies a prepared update and returns the stored user afterwards.
    pub async fn update_user(&self, id: &ObjectId, update: Document) -> Result<Option<User>> {
        self.collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await
    }

    /// Replaces the assignment for the same dashboard in place, or appends
    /// it when the user has none.
    pub async fn upsert_assignment(
        &self,
        id: &ObjectId,
        assignment: &DashboardAssignment,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        let value = to_bson(assignment)?;
        let now = to_bson(&now)?;

        for _ in 0..2 {
            let replaced = self
                .collection
                .find_one_and_update(
                    doc! {
                        "_id": id,
                        "dashboard_assignments.dashboard_id": assignment.dashboard_id,
                    },
                    doc! {
                        "$set": {
                            "dashboard_assignments.$": value.clone(),
                            "updated_at": now.clone(),
                        },
                    },
                )
                .return_document(ReturnDocument::After)
                .await?;
            if replaced.is_some() {
                return Ok(replaced);
            }

            let appended = self
                .collection
                .find_one_and_update(
                    doc! {
                        "_id": id,
                        "dashboard_assignments.dashboard_id": { "$ne": assignment.dashboard_id },
                    },
                    doc! {
                        "$push": { "dashboard_assignments": value.clone() },
                        "$set": { "updated_at": now.clone() },
                    },
                )
                .return_document(ReturnDocument::After)
                .await?;
            if appended.is_some() {
                return Ok(appended);
            }
        }
        Ok(None)
    }

    pub async fn remove_assignment(
        &self,
        id: &ObjectId,
        dashboard_id: &ObjectId,
        now: DateTime<Utc>,
    ) -> Result<Option<User>> {
        self.collection
            .find_one_and_update(
                doc! { "_id": id, "dashboard_assignments.dashboard_id": dashboard_id },
                doc! {
                    "$pull": { "dashboard_assignments": { "dashboard_id": dashboard_id } },
                    "$set": { "updated_at": to_bson(&now)? },
                },
            )
            .return_document(ReturnDocument::After)
            .await
    }

    pub async fn pull_expired_assignments(
        &self,
        id: &ObjectId,
        expired: &[DashboardAssignment],
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, pull_expired_update(expired, now)?)
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn pull_dashboard(&self, dashboard_id: &ObjectId) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "dashboard_assignments.dashboard_id": dashboard_id },
                doc! { "$pull": { "dashboard_assignments": { "dashboard_id": dashboard_id } } },
            )
            .await?;
        Ok(result.modified_count)
    }

    pub async fn set_last_login(&self, id: &ObjectId, now: DateTime<Utc>) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "last_login_at": to_bson(&now)? } },
            )
            .await?;
        Ok(())
    }

    pub async fn mark_verified(&self, token: &str, now: DateTime<Utc>) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "verification_token": token },
                doc! {
                    "$set": { "is_verified": true, "updated_at": to_bson(&now)? },
                    "$unset": { "verification_token": "" },
                },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn delete_user(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn cleanup_pulls_exact_expiries_only() {
        let now = Utc::now();
        let expired = vec![
            DashboardAssignment {
                dashboard_id: ObjectId::new(),
                assigned_at: now - Duration::days(10),
                expires_at: Some(now - Duration::hours(2)),
            },
            DashboardAssignment {
                dashboard_id: ObjectId::new(),
                assigned_at: now - Duration::days(10),
                expires_at: Some(now - Duration::minutes(1)),
            },
        ];

        let update = pull_expired_update(&expired, now).unwrap();
        let condition = update
            .get_document("$pull")
            .unwrap()
            .get_document("dashboard_assignments")
            .unwrap()
            .get_document("expires_at")
            .unwrap();
        let expiries = condition.get_array("$in").unwrap();

        assert_eq!(expiries.len(), 2);
        assert!(expiries.contains(&to_bson(&(now - Duration::hours(2))).unwrap()));
        assert!(!expiries.contains(&to_bson(&(now + Duration::days(30))).unwrap()));
        assert!(update.get_document("$set").unwrap().contains_key("updated_at"));
    }
}
