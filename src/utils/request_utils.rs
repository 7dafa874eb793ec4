use actix_web::{HttpRequest, http::header};
use bson::oid::ObjectId;

use crate::errors::{AppError, AppResult};

pub fn parse_object_id(raw: &str, what: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} id '{}'", what, raw)))
}

pub fn parse_object_ids(raw: &[String], what: &str) -> AppResult<Vec<ObjectId>> {
    let mut ids = Vec::with_capacity(raw.len());
    for value in raw {
        let id = parse_object_id(value, what)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Client metadata stored with audit records.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    /// The address is the socket peer; forwarding headers are client-controlled
    /// and not recorded.
    pub fn from_request(req: &HttpRequest) -> Self {
        let ip_address = req.peer_addr().map(|addr| addr.ip().to_string());
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.chars().take(512).collect());

        Self {
            ip_address,
            user_agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn rejects_malformed_object_ids() {
        assert!(parse_object_id("64b7f0c2a1b2c3d4e5f60718", "user").is_ok());
        assert!(matches!(
            parse_object_id("nope", "user"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn deduplicates_id_lists() {
        let raw = vec![
            "64b7f0c2a1b2c3d4e5f60718".to_string(),
            "64b7f0c2a1b2c3d4e5f60718".to_string(),
        ];
        assert_eq!(parse_object_ids(&raw, "dashboard").unwrap().len(), 1);
    }

    #[test]
    fn captures_peer_ip_and_agent() {
        let req = TestRequest::default()
            .peer_addr("198.51.100.20:443".parse().unwrap())
            .insert_header((header::USER_AGENT, "portal-test"))
            .to_http_request();
        let meta = RequestMeta::from_request(&req);
        assert_eq!(meta.ip_address.as_deref(), Some("198.51.100.20"));
        assert_eq!(meta.user_agent.as_deref(), Some("portal-test"));
    }

    #[test]
    fn ignores_spoofed_forwarding_headers() {
        let req = TestRequest::default()
            .peer_addr("198.51.100.20:443".parse().unwrap())
            .insert_header(("X-Forwarded-For", "203.0.113.7"))
            .insert_header(("Forwarded", "for=203.0.113.8"))
            .to_http_request();
        let meta = RequestMeta::from_request(&req);
        assert_eq!(meta.ip_address.as_deref(), Some("198.51.100.20"));
    }
}
