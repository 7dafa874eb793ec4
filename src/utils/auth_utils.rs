use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

use crate::{constants::VERIFICATION_TOKEN_LENGTH, types::models::user::role::Role};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User id (hex ObjectId).
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn generate_jwt(
    user_id: &str,
    name: &str,
    email: &str,
    role: Role,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

pub fn generate_cookie(name: &str, token: String, ttl_hours: i64) -> Cookie<'static> {
    Cookie::build(name.to_string(), token)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(CookieDuration::hours(ttl_hours))
        .finish()
}

pub fn expired_cookie(name: &str) -> Cookie<'static> {
    Cookie::build(name.to_string(), "")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(CookieDuration::new(0, 0))
        .finish()
}

pub fn generate_verification_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-with-enough-length";

    #[test]
    fn password_hash_verifies_only_original_password() {
        let hash = hash_password("Sup3r$ecret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Sup3r$ecret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn jwt_carries_role_and_rejects_foreign_secret() {
        let user_id = "64b7f0c2a1b2c3d4e5f60718";
        let token =
            generate_jwt(user_id, "Ada", "ada@example.com", Role::Admin, SECRET, 1).unwrap();

        let claims = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.sub, user_id);
        assert!(decode_jwt(&token, "another-secret-key-entirely").is_err());
    }

    #[test]
    fn expired_jwt_is_rejected() {
        let token = generate_jwt("id", "Ada", "ada@example.com", Role::User, SECRET, -2).unwrap();
        assert!(decode_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn session_cookie_is_locked_down() {
        let cookie = generate_cookie("session", "abc".to_string(), 2);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(2)));
        assert_eq!(expired_cookie("session").max_age(), Some(CookieDuration::ZERO));
    }

    #[test]
    fn verification_tokens_are_random_alphanumeric() {
        let first = generate_verification_token();
        let second = generate_verification_token();
        assert_eq!(first.len(), VERIFICATION_TOKEN_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
