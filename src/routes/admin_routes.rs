use actix_web::web;

use crate::handlers::{
    admin_handler::{cleanup_stats_handler, get_activity_handler, run_cleanup_handler},
    pricing_handler::{
        create_plan_handler, delete_plan_handler, get_all_plans_handler,
        get_all_subscriptions_handler, grant_subscription_handler, update_plan_handler,
    },
    ticket_handler::{
        delete_ticket_handler, get_all_tickets_handler, update_ticket_status_handler,
    },
    user_handler::{
        assign_dashboard_handler, create_user_handler, delete_user_handler,
        get_all_users_handler, get_user_assignments_handler, get_user_handler,
        remove_assignment_handler, update_user_handler,
    },
};

pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/users", web::get().to(get_all_users_handler))
            .route("/users", web::post().to(create_user_handler))
            .route("/users/{id}", web::get().to(get_user_handler))
            .route("/users/{id}", web::put().to(update_user_handler))
            .route("/users/{id}", web::delete().to(delete_user_handler))
            .route("/users/{id}/dashboards", web::get().to(get_user_assignments_handler))
            .route("/users/{id}/dashboards", web::post().to(assign_dashboard_handler))
            .route(
                "/users/{id}/dashboards/{dashboard_id}",
                web::delete().to(remove_assignment_handler),
            )
            .route("/pricing/plans", web::get().to(get_all_plans_handler))
            .route("/pricing/plans", web::post().to(create_plan_handler))
            .route("/pricing/plans/{id}", web::put().to(update_plan_handler))
            .route("/pricing/plans/{id}", web::delete().to(delete_plan_handler))
            .route("/subscriptions", web::get().to(get_all_subscriptions_handler))
            .route("/subscriptions", web::post().to(grant_subscription_handler))
            .route("/tickets", web::get().to(get_all_tickets_handler))
            .route("/tickets/{id}/status", web::patch().to(update_ticket_status_handler))
            .route("/tickets/{id}", web::delete().to(delete_ticket_handler))
            .route("/activity", web::get().to(get_activity_handler))
            .route("/cleanup", web::post().to(run_cleanup_handler))
            .route("/cleanup/stats", web::get().to(cleanup_stats_handler)),
    );
}
