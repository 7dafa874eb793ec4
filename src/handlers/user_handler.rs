use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth_middleware::AdminUser,
    services::user_service::UserService,
    types::{
        requests::user::{
            assign_dashboard_request::AssignDashboardRequest,
            create_user_request::CreateUserRequest, update_user_request::UpdateUserRequest,
        },
        responses::{
            api_response::ApiResponse,
            user_response::{AssignmentResponse, UserResponse},
        },
    },
    utils::{
        locale_utils::{Namespace, request_messages},
        request_utils::parse_object_id,
        validation_utils::{validate_create_user_data, validate_update_user_data},
    },
};

pub async fn get_all_users_handler(
    req: HttpRequest,
    _admin: AdminUser,
    user_service: web::Data<Arc<UserService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let now = Utc::now();
    let users: Vec<UserResponse> = user_service
        .get_all_users()
        .await?
        .into_iter()
        .map(|user| UserResponse::from_user(user, now))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::User, "fetch.all_success", "All users fetched successfully."),
        users,
    )))
}

pub async fn create_user_handler(
    req: HttpRequest,
    _admin: AdminUser,
    user_service: web::Data<Arc<UserService>>,
    new_user: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let data = new_user.into_inner();

    validate_create_user_data(&data, &messages).map_err(|errors| {
        AppError::validation(messages.get_validation_message("user", "Invalid user data."), errors)
    })?;

    let user = user_service.create_user(data, &messages).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::User, "create.success", "User successfully created."),
        UserResponse::from_user(user, Utc::now()),
    )))
}

pub async fn get_user_handler(
    req: HttpRequest,
    _admin: AdminUser,
    user_service: web::Data<Arc<UserService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "user")?;
    let user = user_service.get_user(&id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::User, "fetch.success", "User fetched successfully."),
        UserResponse::from_user(user, Utc::now()),
    )))
}

pub async fn update_user_handler(
    req: HttpRequest,
    _admin: AdminUser,
    user_service: web::Data<Arc<UserService>>,
    id: web::Path<String>,
    updated_user: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "user")?;
    let data = updated_user.into_inner();

    validate_update_user_data(&data, &messages).map_err(|errors| {
        AppError::validation(messages.get_validation_message("user", "Invalid user data."), errors)
    })?;

    let user = user_service.update_user(&id, data, &messages).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::User, "update.success", "User updated successfully."),
        UserResponse::from_user(user, Utc::now()),
    )))
}

pub async fn delete_user_handler(
    req: HttpRequest,
    AdminUser(admin): AdminUser,
    user_service: web::Data<Arc<UserService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "user")?;
    user_service.delete_user(&id, &admin.id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::User, "delete.success", "User deleted successfully."),
        None::<()>,
    )))
}

pub async fn get_user_assignments_handler(
    req: HttpRequest,
    _admin: AdminUser,
    user_service: web::Data<Arc<UserService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "user")?;
    let now = Utc::now();
    let assignments: Vec<AssignmentResponse> = user_service
        .list_assignments(&id, &messages)
        .await?
        .iter()
        .map(|assignment| AssignmentResponse::from_assignment(assignment, now))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::User,
            "assignments.fetch_success",
            "Dashboard assignments fetched.",
        ),
        assignments,
    )))
}

pub async fn assign_dashboard_handler(
    req: HttpRequest,
    _admin: AdminUser,
    user_service: web::Data<Arc<UserService>>,
    id: web::Path<String>,
    assignment: web::Json<AssignDashboardRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let user_id = parse_object_id(&id, "user")?;
    let dashboard_id = parse_object_id(&assignment.dashboard_id, "dashboard")?;
    let now = Utc::now();

    let user = user_service
        .assign_dashboard(&user_id, dashboard_id, &assignment, now, &messages)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::User, "assignments.assign_success", "Dashboard assigned."),
        UserResponse::from_user(user, now),
    )))
}

pub async fn remove_assignment_handler(
    req: HttpRequest,
    _admin: AdminUser,
    user_service: web::Data<Arc<UserService>>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let (user_id, dashboard_id) = path.into_inner();
    let user_id = parse_object_id(&user_id, "user")?;
    let dashboard_id = parse_object_id(&dashboard_id, "dashboard")?;

    let user = user_service
        .remove_assignment(&user_id, &dashboard_id, &messages)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::User,
            "assignments.remove_success",
            "Dashboard assignment removed.",
        ),
        UserResponse::from_user(user, Utc::now()),
    )))
}
