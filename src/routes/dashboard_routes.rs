use actix_web::web;

use crate::handlers::dashboard_handler::{
    create_dashboard_handler, delete_dashboard_handler, end_activity_handler,
    get_all_dashboards_handler, get_dashboard_handler, get_public_dashboards_handler,
    get_user_dashboards_handler, update_dashboard_handler, view_dashboard_handler,
};

pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboards")
            .route("", web::get().to(get_all_dashboards_handler))
            .route("", web::post().to(create_dashboard_handler))
            .route("/public", web::get().to(get_public_dashboards_handler))
            .route("/{id}", web::get().to(get_dashboard_handler))
            .route("/{id}", web::put().to(update_dashboard_handler))
            .route("/{id}", web::delete().to(delete_dashboard_handler)),
    )
    .service(
        web::scope("/user")
            .route("/dashboards", web::get().to(get_user_dashboards_handler))
            .route("/dashboards/{id}/view", web::post().to(view_dashboard_handler))
            .route("/activity/{id}/end", web::post().to(end_activity_handler)),
    );
}
