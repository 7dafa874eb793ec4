use actix_cors::Cors;
use actix_web::http::header;

pub fn configure_cors(frontend_origin: &str) -> Cors {
    let cors = if frontend_origin == "*" {
        Cors::default().allow_any_origin()
    } else {
        Cors::default().allowed_origin(frontend_origin)
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}
