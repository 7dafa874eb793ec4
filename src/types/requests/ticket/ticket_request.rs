use serde::Deserialize;
use validator::Validate;

use crate::types::models::ticket::{
    ticket_category::TicketCategory, ticket_priority::TicketPriority, ticket_status::TicketStatus,
};

#[derive(Debug, Deserialize, Validate)]
pub struct AttachmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,

    #[validate(url)]
    pub url: String,

    #[serde(default)]
    pub size_bytes: u64,

    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 3, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 10000))]
    pub message: String,

    #[serde(default)]
    pub priority: TicketPriority,

    #[serde(default)]
    pub category: TicketCategory,

    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<AttachmentRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TicketReplyRequest {
    #[validate(length(min = 1, max = 10000))]
    pub message: String,

    #[serde(default)]
    #[validate(nested)]
    pub attachments: Vec<AttachmentRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}
