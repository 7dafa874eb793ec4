use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;

use crate::{
    errors::AppResult,
    middleware::auth_middleware::AdminUser,
    services::category_service::CategoryService,
    types::{
        requests::category::category_request::CategoryRequest, responses::api_response::ApiResponse,
    },
    utils::{
        locale_utils::{Namespace, request_messages},
        request_utils::parse_object_id,
        validation_utils::validate_request,
    },
};

pub async fn get_all_categories_handler(
    req: HttpRequest,
    category_service: web::Data<Arc<CategoryService>>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let categories = category_service.get_all_categories().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(
            Namespace::Category,
            "fetch.all_success",
            "Categories fetched successfully.",
        ),
        categories,
    )))
}

pub async fn get_category_handler(
    req: HttpRequest,
    category_service: web::Data<Arc<CategoryService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "category")?;
    let category = category_service.get_category(&id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Category, "fetch.success", "Category fetched successfully."),
        category,
    )))
}

pub async fn create_category_handler(
    req: HttpRequest,
    _admin: AdminUser,
    category_service: web::Data<Arc<CategoryService>>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let data = body.into_inner();
    validate_request(&data, &messages, Namespace::Category, "create.invalid")?;

    let category = category_service.create_category(data, &messages).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(
        messages.get_str(Namespace::Category, "create.success", "Category created."),
        category,
    )))
}

pub async fn update_category_handler(
    req: HttpRequest,
    _admin: AdminUser,
    category_service: web::Data<Arc<CategoryService>>,
    id: web::Path<String>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "category")?;
    let data = body.into_inner();
    validate_request(&data, &messages, Namespace::Category, "create.invalid")?;

    let category = category_service.update_category(&id, data, &messages).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Category, "update.success", "Category updated."),
        category,
    )))
}

pub async fn delete_category_handler(
    req: HttpRequest,
    _admin: AdminUser,
    category_service: web::Data<Arc<CategoryService>>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let messages = request_messages(&req);
    let id = parse_object_id(&id, "category")?;
    category_service.delete_category(&id, &messages).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        messages.get_str(Namespace::Category, "delete.success", "Category deleted."),
        None::<()>,
    )))
}
