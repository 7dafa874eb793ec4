use actix_web::web;

use crate::handlers::auth_handler::{
    jwt_login_handler, logout_user_handler, me_handler, register_user_handler, verify_email_handler,
};

pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(jwt_login_handler))
            .route("/logout", web::delete().to(logout_user_handler))
            .route("/register", web::post().to(register_user_handler))
            .route("/me", web::get().to(me_handler))
            .route("/verify/{token}", web::post().to(verify_email_handler)),
    );
}
