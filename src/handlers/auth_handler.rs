use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::{
    config::app_config::AppConfig,
    errors::{AppError, AppResult},
    middleware::auth_middleware::AuthUser,
    services::{activity_service::ActivityService, user_service::UserService},
    types::{
        models::activity::activity_action::ActivityAction,
        requests::auth::{login_request::LoginRequest, register_request::RegisterRequest},
        responses::{
            api_response::ApiResponse,
            user_response::{LoginResponse, UserResponse},
        },
    },
    utils::{
        auth_utils::{expired_cookie, generate_cookie},
        locale_utils::{Namespace, request_messages},
        request_utils::RequestMeta,
        validation_utils::{validate_login_data, validate_register_data},
    },
};

pub async fn register_user_handler(
    req: HttpRequest,
    user_service: web::Data<Arc<UserService>>,
    new_user: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let data = new_user.into_inner();

    validate_register_data(&data, &messages).map_err(|errors| {
        AppError::validation(
            messages.get_validation_message("register", "Invalid registration data."),
            errors,
        )
    })?;

    let user = user_service.register_user(data, &messages).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::Auth, "register.success", "Registration successful."),
        UserResponse::from_user(user, Utc::now()),
    )))
}

pub async fn jwt_login_handler(
    req: HttpRequest,
    config: web::Data<AppConfig>,
    user_service: web::Data<Arc<UserService>>,
    activity_service: web::Data<Arc<ActivityService>>,
    credentials: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let data = credentials.into_inner();

    validate_login_data(&data, &messages).map_err(|errors| {
        AppError::validation(
            messages.get_validation_message("login", "Invalid login data."),
            errors,
        )
    })?;

    let (user, token) = user_service
        .authenticate_user(&data.email, &data.password, &messages)
        .await?;
    info!("User {} successfully logged in.", user.email);

    let now = Utc::now();
    if let Some(id) = user._id {
        activity_service
            .record(ActivityService::start(
                id,
                ActivityAction::Login,
                &RequestMeta::from_request(&req),
                now,
            ))
            .await;
    }

    let cookie = generate_cookie(&config.cookie_name, token.clone(), config.jwt_ttl_hours);
    Ok(HttpResponse::Ok().cookie(cookie).json(ApiResponse::success(
        messages.get_str(Namespace::Auth, "login.success", "Login successful."),
        LoginResponse {
            user: UserResponse::from_user(user, now),
            token,
        },
    )))
}

pub async fn logout_user_handler(
    req: HttpRequest,
    user: Option<AuthUser>,
    config: web::Data<AppConfig>,
    activity_service: web::Data<Arc<ActivityService>>,
) -> HttpResponse {
    let messages = request_messages(&req);

    if let Some(user) = user {
        let mut activity = ActivityService::start(
            user.id,
            ActivityAction::Logout,
            &RequestMeta::from_request(&req),
            Utc::now(),
        );
        activity.finish(activity.started_at);
        activity_service.record(activity).await;
    }

    HttpResponse::Ok()
        .cookie(expired_cookie(&config.cookie_name))
        .json(ApiResponse::success(
            messages.get_str(Namespace::Auth, "logout.success", "Logged out successfully."),
            None::<()>,
        ))
}

pub async fn me_handler(
    req: HttpRequest,
    user: AuthUser,
    user_service: web::Data<Arc<UserService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let current = user_service.get_user(&user.id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Auth, "me.success", "Current user fetched."),
        UserResponse::from_user(current, Utc::now()),
    )))
}

pub async fn verify_email_handler(
    req: HttpRequest,
    user_service: web::Data<Arc<UserService>>,
    token: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    user_service.verify_email(&token, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Auth, "verify.success", "Email verified."),
        None::<()>,
    )))
}
