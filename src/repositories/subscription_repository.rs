use crate::constants::SUBSCRIPTION_COL_NAME;
use crate::{config::database::get_collection, models::subscription_model::Subscription};
use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::{Client, Collection, error::Result, options::ReturnDocument};

/// Matches the subscription only while status and period end are still the
/// ones that were read. A renewal in between changes the period end.
fn unchanged_filter(subscription: &Subscription) -> bson::ser::Result<Document> {
    Ok(doc! {
        "_id": subscription._id,
        "status": subscription.status.to_string(),
        "current_period_end": to_bson(&subscription.current_period_end)?,
    })
}

fn cancel_update(now: DateTime<Utc>) -> bson::ser::Result<Document> {
    let now = to_bson(&now)?;
    Ok(doc! {
        "$set": { "status": "canceled", "canceled_at": now.clone(), "updated_at": now },
    })
}

/// Status, period and customer fields as last reported by Stripe. Owner,
/// plan and Stripe ids are never rewritten.
fn stripe_state_update(subscription: &Subscription) -> bson::ser::Result<Document> {
    let mut set = doc! {
        "status": subscription.status.to_string(),
        "is_trial": subscription.is_trial,
        "current_period_start": to_bson(&subscription.current_period_start)?,
        "current_period_end": to_bson(&subscription.current_period_end)?,
        "updated_at": to_bson(&subscription.updated_at)?,
    };
    if let Some(customer) = subscription.stripe_customer_id.as_deref() {
        set.insert("stripe_customer_id", customer);
    }

    let mut update = Document::new();
    match subscription.canceled_at {
        Some(canceled_at) => {
            set.insert("canceled_at", to_bson(&canceled_at)?);
        }
        None => {
            update.insert("$unset", doc! { "canceled_at": "" });
        }
    }
    update.insert("$set", set);
    Ok(update)
}

pub struct SubscriptionRepository {
    pub collection: Collection<Subscription>,
}

impl SubscriptionRepository {
    pub async fn new(client: &Client) -> Result<Self> {
        let collection = get_collection(client, (*SUBSCRIPTION_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }

    pub async fn create_subscription(&self, subscription: &Subscription) -> Result<Subscription> {
        self.collection.insert_one(subscription).await?;
        Ok(subscription.clone())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Subscription>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_stripe_id(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>> {
        self.collection
            .find_one(doc! { "stripe_subscription_id": stripe_subscription_id })
            .await
    }

    pub async fn find_by_user(&self, user_id: &ObjectId) -> Result<Vec<Subscription>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "_id": -1 })
            .await?;
        cursor.try_collect().await
    }

    pub async fn find_by_user_and_plan(
        &self,
        user_id: &ObjectId,
        plan_id: &ObjectId,
    ) -> Result<Vec<Subscription>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id, "plan_id": plan_id })
            .await?;
        cursor.try_collect().await
    }

    /// Subscriptions still marked active or trialing, regardless of period end.
    pub async fn find_live(&self) -> Result<Vec<Subscription>> {
        let cursor = self
            .collection
            .find(doc! { "status": { "$in": ["active", "trialing"] } })
            .await?;
        cursor.try_collect().await
    }

    pub async fn find_all(&self) -> Result<Vec<Subscription>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": -1 }).await?;
        cursor.try_collect().await
    }

    pub async fn apply_stripe_state(&self, subscription: &Subscription) -> Result<bool> {
        let result = self
            .collection
            .update_one(doc! { "_id": subscription._id }, stripe_state_update(subscription)?)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Returns the canceled subscription, or `None` when it is missing or
    /// was already canceled.
    pub async fn cancel(&self, id: &ObjectId, now: DateTime<Utc>) -> Result<Option<Subscription>> {
        self.collection
            .find_one_and_update(
                doc! { "_id": id, "status": { "$ne": "canceled" } },
                cancel_update(now)?,
            )
            .return_document(ReturnDocument::After)
            .await
    }

    /// Cancels `subscription` unless it was modified since it was read.
    pub async fn lapse_if_unchanged(
        &self,
        subscription: &Subscription,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = self
            .collection
            .update_one(unchanged_filter(subscription)?, cancel_update(now)?)
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn delete_by_user(&self, user_id: &ObjectId) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "user_id": user_id })
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::subscription_model::fixtures::subscription,
        types::models::pricing::subscription_status::SubscriptionStatus,
    };
    use chrono::Duration;

    #[test]
    fn lapse_is_conditional_on_the_period_that_was_read() {
        let read = subscription(
            ObjectId::new(),
            ObjectId::new(),
            SubscriptionStatus::Active,
            Duration::minutes(-1),
        );
        let filter = unchanged_filter(&read).unwrap();

        assert_eq!(filter.get_object_id("_id").unwrap(), read._id.unwrap());
        assert_eq!(filter.get_str("status").unwrap(), "active");
        assert_eq!(
            filter.get("current_period_end"),
            Some(&to_bson(&read.current_period_end).unwrap())
        );

        let mut renewed = read.clone();
        renewed.current_period_end = read.current_period_end + Duration::days(30);
        assert_ne!(
            to_bson(&renewed).unwrap().as_document().unwrap().get("current_period_end"),
            filter.get("current_period_end")
        );
    }

    #[test]
    fn lapse_sets_only_cancellation_fields() {
        let update = cancel_update(Utc::now()).unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("status").unwrap(), "canceled");
        assert!(set.contains_key("canceled_at"));
        assert!(!set.contains_key("current_period_end"));
    }

    #[test]
    fn stripe_state_keeps_owner_and_plan() {
        let mut synced = subscription(
            ObjectId::new(),
            ObjectId::new(),
            SubscriptionStatus::Trialing,
            Duration::days(3),
        );
        synced.stripe_customer_id = Some("cus_123".to_string());
        let update = stripe_state_update(&synced).unwrap();
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("status").unwrap(), "trialing");
        assert_eq!(set.get_str("stripe_customer_id").unwrap(), "cus_123");
        assert!(!set.contains_key("user_id"));
        assert!(!set.contains_key("plan_id"));
        assert!(update.get_document("$unset").unwrap().contains_key("canceled_at"));
    }

    #[test]
    fn stripe_cancellation_records_the_time() {
        let mut synced = subscription(
            ObjectId::new(),
            ObjectId::new(),
            SubscriptionStatus::Active,
            Duration::days(3),
        );
        synced.status = SubscriptionStatus::Canceled;
        synced.canceled_at = Some(Utc::now());
        let update = stripe_state_update(&synced).unwrap();

        assert!(update.get_document("$set").unwrap().contains_key("canceled_at"));
        assert!(!update.contains_key("$unset"));
    }
}
