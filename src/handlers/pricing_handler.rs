use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth_middleware::{AdminUser, AuthUser},
    services::{
        activity_service::ActivityService, pricing_service::PricingService,
        subscription_service::SubscriptionService,
    },
    types::{
        models::activity::activity_action::ActivityAction,
        requests::pricing::{
            grant_subscription_request::GrantSubscriptionRequest,
            pricing_plan_request::PricingPlanRequest,
            start_trial_request::StartTrialRequest,
        },
        responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Messages, Namespace, request_messages},
        request_utils::{RequestMeta, parse_object_id},
        validation_utils::validate_pricing_plan_data,
    },
};

fn validated(data: &PricingPlanRequest, messages: &Messages) -> AppResult<()> {
    validate_pricing_plan_data(data, messages).map_err(|errors| {
        AppError::validation(
            messages.get_str(Namespace::Pricing, "plans.invalid", "Invalid pricing plan data."),
            errors,
        )
    })
}

pub async fn get_active_plans_handler(
    req: HttpRequest,
    pricing_service: web::Data<Arc<PricingService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let plans = pricing_service.get_active_plans().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "plans.fetch_success", "Pricing plans fetched."),
        plans,
    )))
}

pub async fn get_all_plans_handler(
    req: HttpRequest,
    _admin: AdminUser,
    pricing_service: web::Data<Arc<PricingService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let plans = pricing_service.get_all_plans().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "plans.fetch_success", "Pricing plans fetched."),
        plans,
    )))
}

pub async fn get_plan_handler(
    req: HttpRequest,
    pricing_service: web::Data<Arc<PricingService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "plan")?;
    let plan = pricing_service.get_plan(&id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "plans.fetch_one_success", "Pricing plan fetched."),
        plan,
    )))
}

pub async fn create_plan_handler(
    req: HttpRequest,
    _admin: AdminUser,
    pricing_service: web::Data<Arc<PricingService>>,
    body: web::Json<PricingPlanRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let data = body.into_inner();
    validated(&data, &messages)?;

    let plan = pricing_service.create_plan(data, &messages).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "plans.create_success", "Pricing plan created."),
        plan,
    )))
}

pub async fn update_plan_handler(
    req: HttpRequest,
    _admin: AdminUser,
    pricing_service: web::Data<Arc<PricingService>>,
    id: web::Path<String>,
    body: web::Json<PricingPlanRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "plan")?;
    let data = body.into_inner();
    validated(&data, &messages)?;

    let plan = pricing_service.update_plan(&id, data, &messages).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "plans.update_success", "Pricing plan updated."),
        plan,
    )))
}

pub async fn delete_plan_handler(
    req: HttpRequest,
    _admin: AdminUser,
    pricing_service: web::Data<Arc<PricingService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "plan")?;
    pricing_service.delete_plan(&id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "plans.delete_success", "Pricing plan deleted."),
        None::<()>,
    )))
}

pub async fn start_trial_handler(
    req: HttpRequest,
    user: AuthUser,
    subscription_service: web::Data<Arc<SubscriptionService>>,
    activity_service: web::Data<Arc<ActivityService>>,
    body: web::Json<StartTrialRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let plan_id = parse_object_id(&body.plan_id, "plan")?;
    let now = Utc::now();

    let subscription = subscription_service
        .start_trial(&user.id, &plan_id, now, &messages)
        .await?;

    let mut activity = ActivityService::start(
        user.id,
        ActivityAction::StartTrial,
        &RequestMeta::from_request(&req),
        now,
    );
    activity.plan_id = Some(plan_id);
    activity.subscription_id = subscription._id;
    activity_service.record(activity).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::Pricing, "trial.success", "Trial started."),
        subscription,
    )))
}

pub async fn get_user_subscriptions_handler(
    req: HttpRequest,
    user: AuthUser,
    subscription_service: web::Data<Arc<SubscriptionService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let subscriptions = subscription_service.get_user_subscriptions(&user.id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::Pricing,
            "subscriptions.fetch_success",
            "Subscriptions fetched.",
        ),
        subscriptions,
    )))
}

pub async fn cancel_subscription_handler(
    req: HttpRequest,
    user: AuthUser,
    subscription_service: web::Data<Arc<SubscriptionService>>,
    activity_service: web::Data<Arc<ActivityService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "subscription")?;
    let now = Utc::now();

    let subscription = subscription_service
        .cancel_subscription(&id, &user, now, &messages)
        .await?;

    let mut activity = ActivityService::start(
        user.id,
        ActivityAction::CancelSubscription,
        &RequestMeta::from_request(&req),
        now,
    );
    activity.plan_id = Some(subscription.plan_id);
    activity.subscription_id = subscription._id;
    activity_service.record(activity).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::Pricing,
            "subscriptions.cancel_success",
            "Subscription canceled.",
        ),
        subscription,
    )))
}

pub async fn get_all_subscriptions_handler(
    req: HttpRequest,
    _admin: AdminUser,
    subscription_service: web::Data<Arc<SubscriptionService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let subscriptions = subscription_service.get_all_subscriptions().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::Admin,
            "subscriptions.fetch_success",
            "All subscriptions fetched.",
        ),
        subscriptions,
    )))
}

pub async fn grant_subscription_handler(
    req: HttpRequest,
    _admin: AdminUser,
    subscription_service: web::Data<Arc<SubscriptionService>>,
    body: web::Json<GrantSubscriptionRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let subscription = subscription_service
        .grant_subscription(body.into_inner(), Utc::now(), &messages)
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(
            Namespace::Pricing,
            "subscriptions.grant_success",
            "Subscription granted.",
        ),
        subscription,
    )))
}
