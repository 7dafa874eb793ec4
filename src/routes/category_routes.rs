use actix_web::web;

use crate::handlers::category_handler::{
    create_category_handler, delete_category_handler, get_all_categories_handler,
    get_category_handler, update_category_handler,
};

pub fn configure_category_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            .route("", web::get().to(get_all_categories_handler))
            .route("", web::post().to(create_category_handler))
            .route("/{id}", web::get().to(get_category_handler))
            .route("/{id}", web::put().to(update_category_handler))
            .route("/{id}", web::delete().to(delete_category_handler)),
    );
}
