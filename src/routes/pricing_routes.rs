use actix_web::web;

use crate::handlers::{
    pricing_handler::{
        cancel_subscription_handler, get_active_plans_handler, get_plan_handler,
        get_user_subscriptions_handler, start_trial_handler,
    },
    webhook_handler::stripe_webhook_handler,
};

pub fn configure_pricing_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pricing")
            .route("/plans", web::get().to(get_active_plans_handler))
            .route("/plans/{id}", web::get().to(get_plan_handler))
            .route("/trial", web::post().to(start_trial_handler))
            .route("/subscriptions", web::get().to(get_user_subscriptions_handler))
            .route("/subscriptions/{id}/cancel", web::post().to(cancel_subscription_handler))
            .route("/webhook", web::post().to(stripe_webhook_handler)),
    );
}
