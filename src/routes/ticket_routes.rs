use actix_web::web;

use crate::handlers::{
    ticket_handler::{
        create_ticket_handler, get_my_tickets_handler, get_ticket_handler, reply_ticket_handler,
    },
    ticket_ws_handler::ticket_events_handler,
};

pub fn configure_ticket_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tickets")
            .route("", web::get().to(get_my_tickets_handler))
            .route("", web::post().to(create_ticket_handler))
            .route("/events", web::get().to(ticket_events_handler))
            .route("/{id}", web::get().to(get_ticket_handler))
            .route("/{id}/replies", web::post().to(reply_ticket_handler)),
    );
}
