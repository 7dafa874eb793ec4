use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    errors::AppResult,
    middleware::auth_middleware::{AdminUser, AuthUser},
    services::{activity_service::ActivityService, ticket_service::TicketService},
    types::{
        models::activity::activity_action::ActivityAction,
        requests::ticket::ticket_request::{
            CreateTicketRequest, TicketQuery, TicketReplyRequest, UpdateTicketStatusRequest,
        },
        responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Namespace, request_messages},
        request_utils::{RequestMeta, parse_object_id},
        validation_utils::validate_request,
    },
};

pub async fn create_ticket_handler(
    req: HttpRequest,
    user: AuthUser,
    ticket_service: web::Data<Arc<TicketService>>,
    activity_service: web::Data<Arc<ActivityService>>,
    body: web::Json<CreateTicketRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let data = body.into_inner();
    validate_request(&data, &messages, Namespace::Ticket, "create.invalid")?;

    let now = Utc::now();
    let ticket = ticket_service.create_ticket(&user, data, now, &messages).await?;

    let mut activity = ActivityService::start(
        user.id,
        ActivityAction::CreateTicket,
        &RequestMeta::from_request(&req),
        now,
    );
    activity.ticket_id = ticket._id;
    activity_service.record(activity).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::Ticket, "create.success", "Ticket created."),
        ticket,
    )))
}

pub async fn get_my_tickets_handler(
    req: HttpRequest,
    user: AuthUser,
    ticket_service: web::Data<Arc<TicketService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let tickets = ticket_service.get_user_tickets(&user.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Ticket, "fetch.all_success", "Tickets fetched."),
        tickets,
    )))
}

pub async fn get_ticket_handler(
    req: HttpRequest,
    user: AuthUser,
    ticket_service: web::Data<Arc<TicketService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "ticket")?;
    let ticket = ticket_service.get_ticket(&id, &user, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Ticket, "fetch.success", "Ticket fetched."),
        ticket,
    )))
}

pub async fn reply_ticket_handler(
    req: HttpRequest,
    user: AuthUser,
    ticket_service: web::Data<Arc<TicketService>>,
    activity_service: web::Data<Arc<ActivityService>>,
    id: web::Path<String>,
    body: web::Json<TicketReplyRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "ticket")?;
    let data = body.into_inner();
    validate_request(&data, &messages, Namespace::Ticket, "reply.invalid")?;

    let now = Utc::now();
    let ticket = ticket_service.reply_to_ticket(&id, &user, data, now, &messages).await?;

    let mut activity = ActivityService::start(
        user.id,
        ActivityAction::ReplyTicket,
        &RequestMeta::from_request(&req),
        now,
    );
    activity.ticket_id = Some(id);
    activity_service.record(activity).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::Ticket, "reply.success", "Reply added."),
        ticket,
    )))
}

pub async fn get_all_tickets_handler(
    req: HttpRequest,
    _admin: AdminUser,
    ticket_service: web::Data<Arc<TicketService>>,
    query: web::Query<TicketQuery>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let tickets = ticket_service.get_tickets(&query).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Ticket, "fetch.all_success", "Tickets fetched."),
        tickets,
    )))
}

pub async fn update_ticket_status_handler(
    req: HttpRequest,
    _admin: AdminUser,
    ticket_service: web::Data<Arc<TicketService>>,
    id: web::Path<String>,
    body: web::Json<UpdateTicketStatusRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "ticket")?;
    let ticket = ticket_service
        .update_status(&id, body.status, Utc::now(), &messages)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Ticket, "status.success", "Ticket status updated."),
        ticket,
    )))
}

pub async fn delete_ticket_handler(
    req: HttpRequest,
    _admin: AdminUser,
    ticket_service: web::Data<Arc<TicketService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "ticket")?;
    ticket_service.delete_ticket(&id, Utc::now(), &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Ticket, "delete.success", "Ticket deleted."),
        None::<()>,
    )))
}
