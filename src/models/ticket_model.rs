use crate::types::models::ticket::{
    reply_author::ReplyAuthor, ticket_category::TicketCategory, ticket_priority::TicketPriority,
    ticket_status::TicketStatus,
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File metadata only; the bytes live in external storage.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Attachment {
    /// Hyphenated UUID v4.
    pub id: String,
    pub file_name: String,
    pub url: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TicketReply {
    pub id: String,
    pub author: ReplyAuthor,
    pub author_id: ObjectId,
    pub message: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Ticket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub user_id: ObjectId,

    pub subject: String,

    pub message: String,

    #[serde(default)]
    pub priority: TicketPriority,

    #[serde(default)]
    pub category: TicketCategory,

    pub status: TicketStatus,

    #[serde(default)]
    pub attachments: Vec<Attachment>,

    #[serde(default)]
    pub replies: Vec<TicketReply>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_visible_to(&self, user_id: &ObjectId, is_admin: bool) -> bool {
        is_admin || &self.user_id == user_id
    }
}
