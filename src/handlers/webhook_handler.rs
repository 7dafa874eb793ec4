use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::{
    config::app_config::AppConfig,
    constants::STRIPE_SIGNATURE_TOLERANCE_SECS,
    errors::{AppError, AppResult},
    models::{subscription_model::Subscription, user_activity_model::UserActivity},
    services::{
        activity_service::ActivityService,
        subscription_service::{StripeChange, SubscriptionService, WebhookOutcome},
    },
    types::{
        models::activity::activity_action::ActivityAction,
        requests::pricing::stripe_event::StripeEvent, responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Namespace, request_messages},
        request_utils::RequestMeta,
        stripe_signature::verify_signature,
    },
};

/// The request came from Stripe, not the subscriber, so no client metadata
/// is recorded.
fn subscribe_activity(subscription: &Subscription, now: DateTime<Utc>) -> UserActivity {
    let mut activity = ActivityService::start(
        subscription.user_id,
        ActivityAction::Subscribe,
        &RequestMeta::default(),
        now,
    );
    activity.plan_id = Some(subscription.plan_id);
    activity.subscription_id = subscription._id;
    activity
}

/// Stripe posts raw JSON; the signature covers the exact bytes, so the body
/// is taken as `Bytes` and parsed only after verification.
pub async fn stripe_webhook_handler(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    subscription_service: web::Data<Arc<SubscriptionService>>,
    activity_service: web::Data<Arc<ActivityService>>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);

    let secret = config.stripe_webhook_secret.as_deref().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("STRIPE_WEBHOOK_SECRET is not configured"))
    })?;
    let header = req
        .headers()
        .get("Stripe-Signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let now = Utc::now();
    verify_signature(&body, header, secret, now.timestamp(), STRIPE_SIGNATURE_TOLERANCE_SECS)
        .map_err(|err| {
            warn!("Rejected Stripe webhook: {}", err);
            AppError::BadRequest(messages.get_str(
                Namespace::Pricing,
                "webhook.invalid_signature",
                "Invalid webhook signature.",
            ))
        })?;

    let event: StripeEvent = serde_json::from_slice(&body).map_err(|err| {
        warn!("Unparseable Stripe event: {}", err);
        AppError::BadRequest(messages.get_str(
            Namespace::Pricing,
            "webhook.invalid_payload",
            "Invalid webhook payload.",
        ))
    })?;
    let event_id = event.id.clone();
    info!("Stripe event {} ({})", event_id, event.event_type);

    let change = StripeChange::from_event(event)?;
    let outcome = subscription_service.apply_stripe_event(change, now).await?;
    if let WebhookOutcome::Subscribed(subscription) = outcome {
        activity_service
            .record(subscribe_activity(&subscription, now))
            .await;
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "webhook.received", "Event received."),
        serde_json::json!({ "event_id": event_id }),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::subscription_model::fixtures::subscription,
        repositories::{
            pricing_plan_repository::PricingPlanRepository,
            subscription_repository::SubscriptionRepository,
            user_activity_repository::UserActivityRepository, user_repository::UserRepository,
        },
        services::stripe_service::StripeService,
        types::models::pricing::subscription_status::SubscriptionStatus,
        utils::stripe_signature::sign,
    };
    use actix_web::{App, dev::ServiceResponse, http::StatusCode, test};
    use bson::oid::ObjectId;
    use chrono::Duration;

    // The driver connects lazily; these requests never reach the database.
    async fn call(config: AppConfig, req: test::TestRequest) -> ServiceResponse {
        let client = mongodb::Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .unwrap();
        let users = Arc::new(UserRepository::new(&client).await.unwrap());
        let subscriptions = Arc::new(SubscriptionRepository::new(&client).await.unwrap());
        let plans = Arc::new(PricingPlanRepository::new(&client).await.unwrap());
        let activity = Arc::new(UserActivityRepository::new(&client).await.unwrap());
        let subscription_service = Arc::new(SubscriptionService::new(
            subscriptions,
            plans,
            users,
            Arc::new(StripeService::new(None)),
        ));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(config))
                .app_data(web::Data::new(subscription_service))
                .app_data(web::Data::new(Arc::new(ActivityService::new(activity))))
                .route("/webhooks/stripe", web::post().to(stripe_webhook_handler)),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }

    fn signed(body: &str, secret: &str) -> test::TestRequest {
        let now = Utc::now().timestamp();
        test::TestRequest::post()
            .uri("/webhooks/stripe")
            .insert_header((
                "Stripe-Signature",
                format!("t={},v1={}", now, sign(body.as_bytes(), now, secret)),
            ))
            .set_payload(body.to_string())
    }

    const UNKNOWN_EVENT: &str =
        r#"{"id":"evt_9","type":"invoice.paid","data":{"object":{"id":"in_9"}}}"#;

    #[actix_web::test]
    async fn bad_signature_is_rejected() {
        let resp = call(AppConfig::for_tests(), signed(UNKNOWN_EVENT, "whsec_other")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid webhook signature.");
    }

    #[actix_web::test]
    async fn unknown_event_is_acknowledged() {
        let resp = call(AppConfig::for_tests(), signed(UNKNOWN_EVENT, "whsec_test")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["event_id"], "evt_9");
    }

    #[actix_web::test]
    async fn missing_secret_is_a_server_error() {
        let mut config = AppConfig::for_tests();
        config.stripe_webhook_secret = None;
        let resp = call(config, signed(UNKNOWN_EVENT, "whsec_test")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[::core::prelude::v1::test]
    fn subscribe_activity_carries_no_client_metadata() {
        let sub = subscription(
            ObjectId::new(),
            ObjectId::new(),
            SubscriptionStatus::Active,
            Duration::days(30),
        );
        let activity = subscribe_activity(&sub, Utc::now());

        assert_eq!(activity.action, ActivityAction::Subscribe);
        assert_eq!(activity.plan_id, Some(sub.plan_id));
        assert_eq!(activity.subscription_id, sub._id);
        assert!(activity.ip_address.is_none());
        assert!(activity.user_agent.is_none());
    }
}
