use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::{
    errors::AppResult,
    middleware::auth_middleware::AdminUser,
    services::{activity_service::ActivityService, cleanup_service::CleanupService},
    types::{
        requests::activity::activity_query::ActivityQuery, responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Namespace, request_messages},
        request_utils::parse_object_id,
    },
};

pub async fn get_activity_handler(
    req: HttpRequest,
    _admin: AdminUser,
    activity_service: web::Data<Arc<ActivityService>>,
    query: web::Query<ActivityQuery>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let user_id = query
        .user_id
        .as_deref()
        .map(|raw| parse_object_id(raw, "user"))
        .transpose()?;
    let activity = activity_service
        .list_activity(user_id.as_ref(), query.limit)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Admin, "activity.fetch_success", "Activity fetched."),
        activity,
    )))
}

pub async fn run_cleanup_handler(
    req: HttpRequest,
    AdminUser(admin): AdminUser,
    cleanup_service: web::Data<Arc<CleanupService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    log::info!("Manual cleanup triggered by {}", admin.email);
    let report = cleanup_service.run(Utc::now()).await?;

    let message = if report.is_empty() {
        messages.get_str(Namespace::Admin, "cleanup.nothing_to_do", "Nothing to clean up.")
    } else {
        messages.get_str(Namespace::Admin, "cleanup.success", "Cleanup completed.")
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(message, report)))
}

pub async fn cleanup_stats_handler(
    req: HttpRequest,
    _admin: AdminUser,
    cleanup_service: web::Data<Arc<CleanupService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let stats = cleanup_service.stats(Utc::now()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Admin, "cleanup.stats_success", "Cleanup statistics fetched."),
        stats,
    )))
}

pub async fn health_handler(req: HttpRequest) -> HttpResponse {
    let messages = request_messages(&req);
    HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Admin, "health.ok", "Service is healthy."),
        json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::app_config::AppConfig, types::models::user::role::Role,
        utils::auth_utils::generate_jwt,
    };
    use actix_web::{App, http::StatusCode, http::header, test};

    #[actix_web::test]
    async fn health_reports_ok() {
        let app =
            test::init_service(App::new().route("/health", web::get().to(health_handler))).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["message"], "Service is healthy.");
    }

    #[actix_web::test]
    async fn admin_routes_require_a_session() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppConfig::for_tests()))
                .route("/admin/cleanup/stats", web::get().to(cleanup_stats_handler)),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/admin/cleanup/stats").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn manual_cleanup_is_admin_only() {
        let config = AppConfig::for_tests();
        let token = generate_jwt(
            "64b7f0c2a1b2c3d4e5f60718",
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
                .route("/admin/cleanup", web::post().to(run_cleanup_handler)),
        )
        .await;

        let anonymous = test::TestRequest::post().uri("/admin/cleanup").to_request();
        assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::UNAUTHORIZED);

        let user = test::TestRequest::post()
            .uri("/admin/cleanup")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, user).await.status(), StatusCode::FORBIDDEN);
    }
}
