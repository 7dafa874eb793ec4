//! Request extractors that authenticate the caller from the session JWT.
//!
//! The token is read from `Authorization: Bearer <jwt>` first and from the
//! session cookie otherwise. Handlers take `AuthUser` for any signed-in user
//! and `AdminUser` for admin-only routes.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use bson::oid::ObjectId;
use std::future::{Ready, ready};

use crate::{
    config::app_config::AppConfig,
    errors::AppError,
    types::models::user::role::Role,
    utils::{
        auth_utils::decode_jwt,
        locale_utils::{Namespace, request_messages},
    },
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn session_token(req: &HttpRequest, config: &AppConfig) -> Option<String> {
    bearer_token(req).or_else(|| {
        req.cookie(&config.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let messages = request_messages(req);
    let unauthorized = || {
        AppError::Unauthorized(messages.get_str(
            Namespace::Auth,
            "unauthorized",
            "Authentication required.",
        ))
    };

    let config = req.app_data::<web::Data<AppConfig>>().ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("AppConfig is not registered as app data"))
    })?;

    let token = session_token(req, config).ok_or_else(unauthorized)?;
    let claims = decode_jwt(&token, &config.jwt_secret).map_err(|err| {
        log::debug!("Rejected session token: {}", err);
        unauthorized()
    })?;
    let id = ObjectId::parse_str(&claims.sub).map_err(|_| unauthorized())?;

    Ok(AuthUser {
        id,
        name: claims.name,
        email: claims.email,
        role: claims.role,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            if user.is_admin() {
                Ok(AdminUser(user))
            } else {
                log::warn!("User {} attempted an admin-only route {}", user.email, req.path());
                Err(AppError::Forbidden(request_messages(req).get_str(
                    Namespace::Auth,
                    "forbidden",
                    "Administrator access required.",
                )))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::auth_utils::generate_jwt;
    use actix_web::{cookie::Cookie, test::TestRequest};

    const USER_ID: &str = "64b7f0c2a1b2c3d4e5f60718";

    fn token(role: Role, secret: &str) -> String {
        generate_jwt(USER_ID, "Ada", "ada@example.com", role, secret, 1).unwrap()
    }

    fn request() -> TestRequest {
        TestRequest::default().app_data(web::Data::new(AppConfig::for_tests()))
    }

    #[actix_web::test]
    async fn accepts_bearer_token() {
        let config = AppConfig::for_tests();
        let (req, mut payload) = request()
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", token(Role::User, &config.jwt_secret)),
            ))
            .to_http_parts();

        let user = AuthUser::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(user.id.to_hex(), USER_ID);
        assert_eq!(user.role, Role::User);
    }

    #[actix_web::test]
    async fn falls_back_to_session_cookie() {
        let config = AppConfig::for_tests();
        let (req, mut payload) = request()
            .cookie(Cookie::new(config.cookie_name.clone(), token(Role::Admin, &config.jwt_secret)))
            .to_http_parts();

        let admin = AdminUser::from_request(&req, &mut payload).await.unwrap();
        assert!(admin.0.is_admin());
    }

    #[actix_web::test]
    async fn missing_or_forged_token_is_unauthorized() {
        let (req, mut payload) = request().to_http_parts();
        assert!(matches!(
            AuthUser::from_request(&req, &mut payload).await,
            Err(AppError::Unauthorized(_))
        ));

        let (req, mut payload) = request()
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", token(Role::User, "some-other-secret-value")),
            ))
            .to_http_parts();
        assert!(matches!(
            AuthUser::from_request(&req, &mut payload).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn non_admin_is_forbidden_on_admin_routes() {
        let config = AppConfig::for_tests();
        let (req, mut payload) = request()
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", token(Role::User, &config.jwt_secret)),
            ))
            .to_http_parts();

        assert!(matches!(
            AdminUser::from_request(&req, &mut payload).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
