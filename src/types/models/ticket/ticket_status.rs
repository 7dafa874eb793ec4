use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::reply_author::ReplyAuthor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn accepts_replies(self) -> bool {
        self != TicketStatus::Closed
    }

    /// Status after a reply is appended. An admin answer puts the ticket in
    /// `pending` (waiting on the user); a user answer reopens it.
    pub fn after_reply(self, author: ReplyAuthor) -> TicketStatus {
        match (author, self) {
            (ReplyAuthor::Admin, TicketStatus::Open) => TicketStatus::Pending,
            (ReplyAuthor::User, TicketStatus::Pending | TicketStatus::Resolved) => {
                TicketStatus::Open
            }
            (_, status) => status,
        }
    }
}
