use crate::constants::TICKET_COL_NAME;
use crate::{
    config::database::get_collection,
    models::ticket_model::{Ticket, TicketReply},
    types::models::ticket::{ticket_priority::TicketPriority, ticket_status::TicketStatus},
};
use bson::{Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, to_bson};
use mongodb::{Client, Collection, error::Result, options::ReturnDocument};

/// Matches the ticket only while it still has the status the reply was
/// computed from.
fn reply_filter(id: &ObjectId, expected: TicketStatus) -> Document {
    doc! { "_id": id, "status": expected.to_string() }
}

fn reply_update(
    reply: &TicketReply,
    next: TicketStatus,
    now: DateTime<Utc>,
) -> bson::ser::Result<Document> {
    Ok(doc! {
        "$push": { "replies": to_bson(reply)? },
        "$set": { "status": next.to_string(), "updated_at": to_bson(&now)? },
    })
}

fn status_update(status: TicketStatus, now: DateTime<Utc>) -> bson::ser::Result<Document> {
    Ok(doc! { "$set": { "status": status.to_string(), "updated_at": to_bson(&now)? } })
}

pub struct TicketRepository {
    pub collection: Collection<Ticket>,
}

impl TicketRepository {
    pub async fn new(client: &Client) -> Result<Self> {
        let collection = get_collection(client, (*TICKET_COL_NAME).as_str()).await?;
        Ok(Self { collection })
    }

    pub async fn create_ticket(&self, ticket: &Ticket) -> Result<Ticket> {
        self.collection.insert_one(ticket).await?;
        Ok(ticket.clone())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Ticket>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    pub async fn find_by_user(&self, user_id: &ObjectId) -> Result<Vec<Ticket>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "_id": -1 })
            .await?;
        cursor.try_collect().await
    }

    pub async fn find_filtered(
        &self,
        status: Option<TicketStatus>,
        priority: Option<TicketPriority>,
    ) -> Result<Vec<Ticket>> {
        let mut filter = Document::new();
        if let Some(status) = status {
            filter.insert("status", status.to_string());
        }
        if let Some(priority) = priority {
            filter.insert("priority", priority.to_string());
        }

        let cursor = self.collection.find(filter).sort(doc! { "_id": -1 }).await?;
        cursor.try_collect().await
    }

    /// Appends `reply` and moves the ticket to `next` in one write. Returns
    /// `None` when the ticket no longer has the `expected` status.
    pub async fn push_reply(
        &self,
        id: &ObjectId,
        expected: TicketStatus,
        reply: &TicketReply,
        next: TicketStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>> {
        self.collection
            .find_one_and_update(reply_filter(id, expected), reply_update(reply, next, now)?)
            .return_document(ReturnDocument::After)
            .await
    }

    pub async fn set_status(
        &self,
        id: &ObjectId,
        status: TicketStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Ticket>> {
        self.collection
            .find_one_and_update(doc! { "_id": id }, status_update(status, now)?)
            .return_document(ReturnDocument::After)
            .await
    }

    pub async fn delete_ticket(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::models::ticket::reply_author::ReplyAuthor;

    fn reply() -> TicketReply {
        TicketReply {
            id: "5d0c4a4e-8f1b-4c56-9a57-0d3f3f1b2c11".to_string(),
            author: ReplyAuthor::User,
            author_id: ObjectId::new(),
            message: "Still broken".to_string(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn reply_is_pushed_not_written_over_the_list() {
        let update = reply_update(&reply(), TicketStatus::Open, Utc::now()).unwrap();

        let pushed = update.get_document("$push").unwrap();
        assert_eq!(
            pushed.get_document("replies").unwrap().get_str("message").unwrap(),
            "Still broken"
        );

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("status").unwrap(), "open");
        assert!(!set.contains_key("replies"));
    }

    #[test]
    fn reply_only_lands_on_the_status_it_was_computed_from() {
        let id = ObjectId::new();
        let filter = reply_filter(&id, TicketStatus::Pending);
        assert_eq!(filter.get_object_id("_id").unwrap(), id);
        assert_eq!(filter.get_str("status").unwrap(), "pending");
    }

    #[test]
    fn status_change_touches_only_status_and_timestamp() {
        let update = status_update(TicketStatus::Resolved, Utc::now()).unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("status").unwrap(), "resolved");
        assert_eq!(set.keys().count(), 2);
        assert_eq!(update.keys().count(), 1);
    }
}
