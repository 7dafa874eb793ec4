//! In-process fan-out of ticket changes to WebSocket sessions.

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;

use crate::{
    models::ticket_model::{Ticket, TicketReply},
    types::models::ticket::ticket_status::TicketStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TicketEventKind {
    Created,
    Replied,
    StatusChanged,
    Deleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketEvent {
    pub kind: TicketEventKind,
    pub ticket_id: String,
    pub user_id: String,
    pub subject: String,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<TicketReply>,
    pub at: DateTime<Utc>,
}

impl TicketEvent {
    pub fn new(kind: TicketEventKind, ticket: &Ticket, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            ticket_id: ticket._id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: ticket.user_id.to_hex(),
            subject: ticket.subject.clone(),
            status: ticket.status,
            reply: None,
            at: now,
        }
    }

    pub fn with_reply(mut self, reply: TicketReply) -> Self {
        self.reply = Some(reply);
        self
    }

    /// Admins see every event; users only those on their own tickets.
    pub fn visible_to(&self, user_id: &str, is_admin: bool) -> bool {
        is_admin || self.user_id == user_id
    }
}

pub struct TicketEventHub {
    sender: broadcast::Sender<TicketEvent>,
}

impl TicketEventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: TicketEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!("Ticket event delivered to {} session(s)", receivers),
            Err(_) => debug!("Ticket event dropped; no open sessions"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::models::ticket::{
        ticket_category::TicketCategory, ticket_priority::TicketPriority,
    };
    use bson::oid::ObjectId;
    use tokio::sync::broadcast::error::RecvError;

    fn ticket(user_id: ObjectId) -> Ticket {
        let now = Utc::now();
        Ticket {
            _id: Some(ObjectId::new()),
            user_id,
            subject: "Cannot open report".to_string(),
            message: "The iframe stays blank".to_string(),
            priority: TicketPriority::High,
            category: TicketCategory::Access,
            status: TicketStatus::Open,
            attachments: Vec::new(),
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn users_only_see_their_own_ticket_events() {
        let owner = ObjectId::new();
        let event = TicketEvent::new(TicketEventKind::Created, &ticket(owner), Utc::now());

        assert!(event.visible_to(&owner.to_hex(), false));
        assert!(!event.visible_to(&ObjectId::new().to_hex(), false));
        assert!(event.visible_to(&ObjectId::new().to_hex(), true));
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let hub = TicketEventHub::new(8);
        let mut receiver = hub.subscribe();
        let owner = ObjectId::new();
        hub.publish(TicketEvent::new(TicketEventKind::StatusChanged, &ticket(owner), Utc::now()));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.kind, TicketEventKind::StatusChanged);
        assert_eq!(serde_json::to_value(&event).unwrap()["kind"], "status_changed");
    }

    #[tokio::test]
    async fn slow_receivers_skip_missed_events() {
        let hub = TicketEventHub::new(2);
        let mut receiver = hub.subscribe();
        let owner = ObjectId::new();
        for _ in 0..5 {
            hub.publish(TicketEvent::new(TicketEventKind::Replied, &ticket(owner), Utc::now()));
        }

        assert!(matches!(receiver.recv().await, Err(RecvError::Lagged(3))));
        assert!(receiver.recv().await.is_ok());
    }

    #[test]
    fn publishing_without_sessions_is_harmless() {
        let hub = TicketEventHub::new(4);
        let owner = ObjectId::new();
        hub.publish(TicketEvent::new(TicketEventKind::Deleted, &ticket(owner), Utc::now()));
    }
}
