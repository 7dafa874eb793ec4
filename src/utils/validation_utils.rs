use serde_json::json;
use std::{borrow::Cow, collections::HashMap};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    errors::AppError,
    types::requests::{
        auth::{login_request::LoginRequest, register_request::RegisterRequest},
        dashboard::dashboard_request::DashboardRequest,
        pricing::pricing_plan_request::PricingPlanRequest,
        user::{create_user_request::CreateUserRequest, update_user_request::UpdateUserRequest},
    },
    utils::locale_utils::{Messages, Namespace},
    validations::{
        common::{validate_currency, validate_https_url, validate_optional_phone},
        email::validate_email,
        name::validate_name,
        password::validate_password,
    },
};

fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_register_data(
    data: &RegisterRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_name(&data.name, messages) {
        errors.add("name", e);
    }
    if let Err(e) = validate_email(&data.email, messages) {
        errors.add("email", e);
    }
    if let Err(e) = validate_password(&data.password, messages) {
        errors.add("password", e);
    }
    if let Err(e) = validate_optional_phone(data.phone.as_deref(), messages) {
        errors.add("phone", e);
    }

    into_result(errors)
}

pub fn validate_login_data(
    data: &LoginRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_email(&data.email, messages) {
        errors.add("email", e);
    }
    if data.password.is_empty() {
        errors.add(
            "password",
            add_error(
                "password.empty",
                messages.get_validation_message("password.empty", "Password must not be empty"),
                "",
            ),
        );
    }

    into_result(errors)
}

pub fn validate_create_user_data(
    data: &CreateUserRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_name(&data.name, messages) {
        errors.add("name", e);
    }
    if let Err(e) = validate_email(&data.email, messages) {
        errors.add("email", e);
    }
    if let Err(e) = validate_password(&data.password, messages) {
        errors.add("password", e);
    }
    if let Err(e) = validate_optional_phone(data.phone.as_deref(), messages) {
        errors.add("phone", e);
    }
    if let Some(avatar_url) = data.avatar_url.as_deref() {
        if let Err(e) = validate_https_url(avatar_url, messages) {
            errors.add("avatar_url", e);
        }
    }

    into_result(errors)
}

pub fn validate_update_user_data(
    data: &UpdateUserRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Some(name) = data.name.as_deref() {
        if let Err(e) = validate_name(name, messages) {
            errors.add("name", e);
        }
    }
    if let Some(email) = data.email.as_deref() {
        if let Err(e) = validate_email(email, messages) {
            errors.add("email", e);
        }
    }
    if let Some(password) = data.password.as_deref() {
        if let Err(e) = validate_password(password, messages) {
            errors.add("password", e);
        }
    }
    if let Err(e) = validate_optional_phone(data.phone.as_deref(), messages) {
        errors.add("phone", e);
    }
    if let Some(avatar_url) = data.avatar_url.as_deref() {
        if let Err(e) = validate_https_url(avatar_url, messages) {
            errors.add("avatar_url", e);
        }
    }

    into_result(errors)
}

/// Derived field rules plus the https-only embed URL rule.
pub fn validate_dashboard_data(
    data: &DashboardRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = data.validate().err().unwrap_or_default();
    if let Err(e) = validate_https_url(&data.embed_url, messages) {
        errors.add("embed_url", e);
    }
    into_result(errors)
}

pub fn validate_pricing_plan_data(
    data: &PricingPlanRequest,
    messages: &Messages,
) -> Result<(), ValidationErrors> {
    let mut errors = data.validate().err().unwrap_or_default();
    if let Err(e) = validate_currency(&data.currency, messages) {
        errors.add("currency", e);
    }
    into_result(errors)
}

/// Runs derived `Validate` rules and turns failures into a 400 `AppError`.
pub fn validate_request<T: Validate>(
    data: &T,
    messages: &Messages,
    namespace: Namespace,
    key: &str,
) -> Result<(), AppError> {
    data.validate().map_err(|errors| {
        AppError::validation(
            messages.get_str(namespace, key, "Invalid request data"),
            errors,
        )
    })
}

pub fn add_error(code: &'static str, message: String, field_value: &str) -> ValidationError {
    ValidationError {
        code: code.into(),
        message: Some(Cow::Owned(message)),
        params: {
            let mut params = HashMap::new();
            params.insert("value".into(), json!(field_value));
            params
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::locale_utils::Lang;

    #[test]
    fn register_data_collects_errors_per_field() {
        let messages = Messages::new(Lang::En);
        let data = RegisterRequest {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            password: "Str0ng!Pass".to_string(),
            phone: None,
        };

        let errors = validate_register_data(&data, &messages).unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn dashboard_embed_url_must_be_https() {
        let messages = Messages::new(Lang::En);
        let mut data = DashboardRequest {
            name: "Revenue".to_string(),
            description: None,
            embed_url: "http://app.powerbi.com/view?r=abc".to_string(),
            is_active: None,
            is_public: None,
            category_id: None,
        };
        let errors = validate_dashboard_data(&data, &messages).unwrap_err();
        assert!(errors.errors().contains_key("embed_url"));

        data.embed_url = "https://app.powerbi.com/view?r=abc".to_string();
        assert!(validate_dashboard_data(&data, &messages).is_ok());
    }

    #[test]
    fn update_data_only_checks_present_fields() {
        let messages = Messages::new(Lang::En);
        assert!(validate_update_user_data(&UpdateUserRequest::default(), &messages).is_ok());

        let data = UpdateUserRequest {
            password: Some("short".to_string()),
            ..Default::default()
        };
        let errors = validate_update_user_data(&data, &messages).unwrap_err();
        assert!(errors.errors().contains_key("password"));
    }
}
