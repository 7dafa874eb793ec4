use crate::{
    errors::{AppError, AppResult},
    middleware::auth_middleware::AuthUser,
    models::ticket_model::{Attachment, Ticket, TicketReply},
    repositories::ticket_repository::TicketRepository,
    services::ticket_events::{TicketEvent, TicketEventHub, TicketEventKind},
    types::{
        models::ticket::{reply_author::ReplyAuthor, ticket_status::TicketStatus},
        requests::ticket::ticket_request::{
            AttachmentRequest, CreateTicketRequest, TicketQuery, TicketReplyRequest,
        },
    },
    utils::locale_utils::{Messages, Namespace},
};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_ATTACHMENTS: usize = 10;

fn to_attachments(requests: Vec<AttachmentRequest>) -> Vec<Attachment> {
    requests
        .into_iter()
        .map(|attachment| Attachment {
            id: Uuid::new_v4().to_string(),
            file_name: attachment.file_name.trim().to_string(),
            url: attachment.url,
            size_bytes: attachment.size_bytes,
            content_type: attachment.content_type,
        })
        .collect()
}

/// Concurrent writers get this many tries before the reply is refused.
const REPLY_ATTEMPTS: usize = 3;

/// Status a ticket moves to when `author` replies, or `None` if it is closed.
pub fn status_after_reply(status: TicketStatus, author: ReplyAuthor) -> Option<TicketStatus> {
    status.accepts_replies().then(|| status.after_reply(author))
}

pub struct TicketService {
    pub ticket_repository: Arc<TicketRepository>,
    pub events: Arc<TicketEventHub>,
}

impl TicketService {
    pub fn new(ticket_repository: Arc<TicketRepository>, events: Arc<TicketEventHub>) -> Self {
        Self {
            ticket_repository,
            events,
        }
    }

    fn not_found(messages: &Messages) -> AppError {
        AppError::NotFound(messages.get_str(
            Namespace::Ticket,
            "fetch.not_found",
            "Ticket not found.",
        ))
    }

    fn check_attachments(count: usize, messages: &Messages) -> AppResult<()> {
        if count > MAX_ATTACHMENTS {
            return Err(AppError::BadRequest(messages.get_str(
                Namespace::Ticket,
                "create.too_many_attachments",
                "A message may carry at most 10 attachments.",
            )));
        }
        Ok(())
    }

    pub async fn create_ticket(
        &self,
        user: &AuthUser,
        request: CreateTicketRequest,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<Ticket> {
        Self::check_attachments(request.attachments.len(), messages)?;

        let ticket = Ticket {
            _id: Some(ObjectId::new()),
            user_id: user.id,
            subject: request.subject.trim().to_string(),
            message: request.message,
            priority: request.priority,
            category: request.category,
            status: TicketStatus::Open,
            attachments: to_attachments(request.attachments),
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let ticket = self.ticket_repository.create_ticket(&ticket).await?;
        info!("Ticket '{}' opened by {} ({})", ticket.subject, user.email, ticket.priority);
        self.events.publish(TicketEvent::new(TicketEventKind::Created, &ticket, now));
        Ok(ticket)
    }

    pub async fn get_user_tickets(&self, user_id: &ObjectId) -> AppResult<Vec<Ticket>> {
        Ok(self.ticket_repository.find_by_user(user_id).await?)
    }

    pub async fn get_tickets(&self, query: &TicketQuery) -> AppResult<Vec<Ticket>> {
        Ok(self
            .ticket_repository
            .find_filtered(query.status, query.priority)
            .await?)
    }

    /// Other users' tickets read as not found.
    pub async fn get_ticket(
        &self,
        id: &ObjectId,
        user: &AuthUser,
        messages: &Messages,
    ) -> AppResult<Ticket> {
        self.ticket_repository
            .find_by_id(id)
            .await?
            .filter(|ticket| ticket.is_visible_to(&user.id, user.is_admin()))
            .ok_or_else(|| Self::not_found(messages))
    }

    /// Appends a reply in a single conditional write. The write only lands
    /// if the ticket still has the status the transition was computed from;
    /// otherwise the ticket is re-read and the transition recomputed.
    pub async fn reply_to_ticket(
        &self,
        id: &ObjectId,
        user: &AuthUser,
        request: TicketReplyRequest,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<Ticket> {
        Self::check_attachments(request.attachments.len(), messages)?;

        let reply = TicketReply {
            id: Uuid::new_v4().to_string(),
            author: ReplyAuthor::from(user.role),
            author_id: user.id,
            message: request.message,
            attachments: to_attachments(request.attachments),
            created_at: now,
        };

        for _ in 0..REPLY_ATTEMPTS {
            let current = self.get_ticket(id, user, messages).await?;
            let Some(next) = status_after_reply(current.status, reply.author) else {
                warn!("Reply to closed ticket {} by {} refused", id, user.email);
                return Err(AppError::Conflict(messages.get_str(
                    Namespace::Ticket,
                    "reply.closed",
                    "Closed tickets cannot receive replies.",
                )));
            };

            if let Some(ticket) = self
                .ticket_repository
                .push_reply(id, current.status, &reply, next, now)
                .await?
            {
                self.events.publish(
                    TicketEvent::new(TicketEventKind::Replied, &ticket, now).with_reply(reply),
                );
                return Ok(ticket);
            }
            debug!("Ticket {} changed while replying; retrying", id);
        }

        warn!("Reply to ticket {} by {} gave up after {} attempts", id, user.email, REPLY_ATTEMPTS);
        Err(AppError::Conflict(messages.get_str(
            Namespace::Ticket,
            "reply.retry",
            "The ticket changed while replying. Please try again.",
        )))
    }

    pub async fn update_status(
        &self,
        id: &ObjectId,
        status: TicketStatus,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<Ticket> {
        let ticket = self
            .ticket_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(messages))?;
        if ticket.status == status {
            return Ok(ticket);
        }

        let ticket = self
            .ticket_repository
            .set_status(id, status, now)
            .await?
            .ok_or_else(|| Self::not_found(messages))?;
        info!("Ticket {} moved to {}", id, status);
        self.events
            .publish(TicketEvent::new(TicketEventKind::StatusChanged, &ticket, now));
        Ok(ticket)
    }

    pub async fn delete_ticket(
        &self,
        id: &ObjectId,
        now: DateTime<Utc>,
        messages: &Messages,
    ) -> AppResult<()> {
        let ticket = self
            .ticket_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| Self::not_found(messages))?;

        self.ticket_repository.delete_ticket(id).await?;
        self.events.publish(TicketEvent::new(TicketEventKind::Deleted, &ticket, now));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_drive_status_back_and_forth() {
        let after_admin = status_after_reply(TicketStatus::Open, ReplyAuthor::Admin);
        assert_eq!(after_admin, Some(TicketStatus::Pending));

        let after_user = status_after_reply(TicketStatus::Pending, ReplyAuthor::User);
        assert_eq!(after_user, Some(TicketStatus::Open));
        assert_eq!(
            status_after_reply(TicketStatus::Resolved, ReplyAuthor::Admin),
            Some(TicketStatus::Resolved)
        );
    }

    #[test]
    fn closed_ticket_rejects_replies() {
        assert_eq!(status_after_reply(TicketStatus::Closed, ReplyAuthor::Admin), None);
        assert_eq!(status_after_reply(TicketStatus::Closed, ReplyAuthor::User), None);
    }

    #[test]
    fn attachments_get_fresh_ids() {
        let attachments = to_attachments(vec![
            AttachmentRequest {
                file_name: " screenshot.png ".to_string(),
                url: "https://files.example.com/a.png".to_string(),
                size_bytes: 2048,
                content_type: Some("image/png".to_string()),
            },
            AttachmentRequest {
                file_name: "log.txt".to_string(),
                url: "https://files.example.com/log.txt".to_string(),
                size_bytes: 10,
                content_type: None,
            },
        ]);

        assert_eq!(attachments[0].file_name, "screenshot.png");
        assert_ne!(attachments[0].id, attachments[1].id);
    }

    #[test]
    fn attachment_count_is_capped() {
        let messages = Messages::new(crate::utils::locale_utils::Lang::En);
        assert!(TicketService::check_attachments(MAX_ATTACHMENTS, &messages).is_ok());
        assert!(matches!(
            TicketService::check_attachments(MAX_ATTACHMENTS + 1, &messages),
            Err(AppError::BadRequest(_))
        ));
    }
}
