use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use futures_util::StreamExt;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    middleware::auth_middleware::AuthUser,
    services::ticket_events::{TicketEvent, TicketEventHub},
};

/// The text frame sent for `event`, or `None` when the viewer may not see it.
fn frame_for(event: &TicketEvent, viewer: &str, is_admin: bool) -> Option<String> {
    if !event.visible_to(viewer, is_admin) {
        return None;
    }
    serde_json::to_string(event).ok()
}

/// Upgrades to a WebSocket and streams ticket events the caller may see.
pub async fn ticket_events_handler(
    req: HttpRequest,
    body: web::Payload,
    user: AuthUser,
    hub: web::Data<Arc<TicketEventHub>>,
) -> Result<HttpResponse, actix_web::Error> {
    let (response, mut session, mut stream) = actix_ws::handle(&req, body)?;
    let mut events = hub.subscribe();
    let viewer = user.id.to_hex();
    let is_admin = user.is_admin();

    actix_rt::spawn(async move {
        debug!("Ticket event session opened for {}", user.email);
        loop {
            tokio::select! {
                incoming = stream.next() => match incoming {
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        let _ = session.close(reason).await;
                        debug!("Ticket event session closed by {}", user.email);
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!("Ticket event session error for {}: {}", user.email, err);
                        break;
                    }
                    None => break,
                },
                event = events.recv() => match event {
                    Ok(event) => {
                        let Some(text) = frame_for(&event, &viewer, is_admin) else {
                            continue;
                        };
                        if session.text(text).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            "Ticket event session for {} skipped {} event(s)",
                            user.email, skipped
                        );
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        let _ = session.close(None).await;
    });

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::app_config::AppConfig,
        models::ticket_model::Ticket,
        services::ticket_events::TicketEventKind,
        types::models::{
            ticket::{
                ticket_category::TicketCategory, ticket_priority::TicketPriority,
                ticket_status::TicketStatus,
            },
            user::role::Role,
        },
        utils::auth_utils::generate_jwt,
    };
    use actix_web::{App, http::StatusCode, http::header, test};
    use bson::oid::ObjectId;
    use chrono::Utc;

    fn ticket(user_id: ObjectId) -> Ticket {
        let now = Utc::now();
        Ticket {
            _id: Some(ObjectId::new()),
            user_id,
            subject: "Report is empty".to_string(),
            message: "No rows since Monday".to_string(),
            priority: TicketPriority::Medium,
            category: TicketCategory::Technical,
            status: TicketStatus::Open,
            attachments: Vec::new(),
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn sessions_only_forward_visible_events() {
        let hub = TicketEventHub::new(8);
        let mut events = hub.subscribe();
        let viewer = ObjectId::new();
        let stranger = ObjectId::new();
        hub.publish(TicketEvent::new(TicketEventKind::Created, &ticket(stranger), Utc::now()));
        hub.publish(TicketEvent::new(TicketEventKind::Created, &ticket(viewer), Utc::now()));

        let first = events.recv().await.unwrap();
        assert!(frame_for(&first, &viewer.to_hex(), false).is_none());
        assert!(frame_for(&first, &viewer.to_hex(), true).is_some());

        let second = events.recv().await.unwrap();
        let frame: serde_json::Value =
            serde_json::from_str(&frame_for(&second, &viewer.to_hex(), false).unwrap()).unwrap();
        assert_eq!(frame["user_id"], viewer.to_hex());
        assert_eq!(frame["kind"], "created");
    }

    fn upgrade() -> test::TestRequest {
        test::TestRequest::get()
            .uri("/tickets/events")
            .insert_header((header::UPGRADE, "websocket"))
            .insert_header((header::CONNECTION, "Upgrade"))
            .insert_header((header::SEC_WEBSOCKET_VERSION, "13"))
            .insert_header((header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ=="))
    }

    #[actix_web::test]
    async fn upgrade_requires_a_session() {
        let config = AppConfig::for_tests();
        let token = generate_jwt(
            &ObjectId::new().to_hex(),
            "Ada",
            "ada@example.com",
            Role::User,
            &config.jwt_secret,
            1,
        )
        .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(Arc::new(TicketEventHub::new(8))))
                .route("/tickets/events", web::get().to(ticket_events_handler)),
        )
        .await;

        let resp = test::call_service(&app, upgrade().to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = upgrade()
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SWITCHING_PROTOCOLS);
    }
}
