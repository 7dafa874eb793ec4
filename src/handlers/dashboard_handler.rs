use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth_middleware::{AdminUser, AuthUser},
    services::{
        access_service::AccessService, activity_service::ActivityService,
        dashboard_service::DashboardService,
    },
    types::{
        requests::dashboard::dashboard_request::DashboardRequest,
        responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Messages, Namespace, request_messages},
        request_utils::{RequestMeta, parse_object_id},
        validation_utils::validate_dashboard_data,
    },
};

fn validated(data: &DashboardRequest, messages: &Messages) -> AppResult<()> {
    validate_dashboard_data(data, messages).map_err(|errors| {
        AppError::validation(
            messages.get_str(Namespace::Dashboard, "create.invalid", "Invalid dashboard data."),
            errors,
        )
    })
}

pub async fn get_all_dashboards_handler(
    req: HttpRequest,
    _admin: AdminUser,
    dashboard_service: web::Data<Arc<DashboardService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let dashboards = dashboard_service.get_all_dashboards().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::Dashboard,
            "fetch.all_success",
            "Dashboards fetched successfully.",
        ),
        dashboards,
    )))
}

pub async fn get_public_dashboards_handler(
    req: HttpRequest,
    dashboard_service: web::Data<Arc<DashboardService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let dashboards = dashboard_service.get_public_dashboards().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::Dashboard,
            "fetch.public_success",
            "Public dashboards fetched successfully.",
        ),
        dashboards,
    )))
}

pub async fn create_dashboard_handler(
    req: HttpRequest,
    _admin: AdminUser,
    dashboard_service: web::Data<Arc<DashboardService>>,
    body: web::Json<DashboardRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let data = body.into_inner();
    validated(&data, &messages)?;

    let dashboard = dashboard_service.create_dashboard(data, &messages).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::Dashboard, "create.success", "Dashboard created."),
        dashboard,
    )))
}

pub async fn get_dashboard_handler(
    req: HttpRequest,
    _admin: AdminUser,
    dashboard_service: web::Data<Arc<DashboardService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "dashboard")?;
    let dashboard = dashboard_service.get_dashboard(&id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Dashboard, "fetch.success", "Dashboard fetched successfully."),
        dashboard,
    )))
}

pub async fn update_dashboard_handler(
    req: HttpRequest,
    _admin: AdminUser,
    dashboard_service: web::Data<Arc<DashboardService>>,
    id: web::Path<String>,
    body: web::Json<DashboardRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "dashboard")?;
    let data = body.into_inner();
    validated(&data, &messages)?;

    let dashboard = dashboard_service.update_dashboard(&id, data, &messages).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Dashboard, "update.success", "Dashboard updated."),
        dashboard,
    )))
}

pub async fn delete_dashboard_handler(
    req: HttpRequest,
    _admin: AdminUser,
    dashboard_service: web::Data<Arc<DashboardService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "dashboard")?;
    dashboard_service.delete_dashboard(&id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Dashboard, "delete.success", "Dashboard deleted."),
        None::<()>,
    )))
}

/// The caller's dashboards, grouped by category and annotated with access.
pub async fn get_user_dashboards_handler(
    req: HttpRequest,
    user: AuthUser,
    access_service: web::Data<Arc<AccessService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let categories = access_service
        .dashboards_for_user(&user.id, Utc::now(), &messages)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Dashboard, "user.fetch_success", "Your dashboards."),
        categories,
    )))
}

pub async fn view_dashboard_handler(
    req: HttpRequest,
    user: AuthUser,
    access_service: web::Data<Arc<AccessService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "dashboard")?;
    let view = access_service
        .view_dashboard(&user, &id, &RequestMeta::from_request(&req), Utc::now(), &messages)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Dashboard, "view.success", "Dashboard ready."),
        view,
    )))
}

pub async fn end_activity_handler(
    req: HttpRequest,
    user: AuthUser,
    activity_service: web::Data<Arc<ActivityService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "activity")?;
    let activity = activity_service.finish(&id, &user, Utc::now(), &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Dashboard, "activity.end_success", "Activity closed."),
        activity,
    )))
}
