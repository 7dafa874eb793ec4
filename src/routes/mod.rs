pub mod admin_routes;
pub mod auth_routes;
pub mod category_routes;
pub mod dashboard_routes;
pub mod pricing_routes;
pub mod ticket_routes;

use actix_web::web;

use crate::handlers::admin_handler::health_handler;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_handler))
            .configure(auth_routes::configure_auth_routes)
            .configure(admin_routes::configure_admin_routes)
            .configure(dashboard_routes::configure_dashboard_routes)
            .configure(category_routes::configure_category_routes)
            .configure(pricing_routes::configure_pricing_routes)
            .configure(ticket_routes::configure_ticket_routes),
    );
}
