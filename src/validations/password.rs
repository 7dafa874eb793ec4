use validator::ValidationError;

use super::run_rules;
use crate::{types::validations::ValidationResult, utils::locale_utils::Messages};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

fn has_valid_length(password: &str, messages: &Messages) -> ValidationResult {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(messages.get_validation_message(
            "password.too_short",
            &format!("Password must be at least {} characters long", MIN_PASSWORD_LENGTH),
        ));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(messages.get_validation_message(
            "password.too_long",
            &format!("Password must be no more than {} characters long", MAX_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

fn has_no_whitespace(password: &str, messages: &Messages) -> ValidationResult {
    if password.chars().any(char::is_whitespace) {
        return Err(messages.get_validation_message(
            "password.contains_space",
            "Password must not contain spaces",
        ));
    }
    Ok(())
}

fn has_mixed_case(password: &str, messages: &Messages) -> ValidationResult {
    let upper = password.chars().any(|c| c.is_uppercase());
    let lower = password.chars().any(|c| c.is_lowercase());
    if !(upper && lower) {
        return Err(messages.get_validation_message(
            "password.mixed_case",
            "Password must contain both uppercase and lowercase letters",
        ));
    }
    Ok(())
}

fn has_digit(password: &str, messages: &Messages) -> ValidationResult {
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(messages.get_validation_message(
            "password.missing_digit",
            "Password must contain at least one digit",
        ));
    }
    Ok(())
}

fn has_special_char(password: &str, messages: &Messages) -> ValidationResult {
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        return Err(messages.get_validation_message(
            "password.missing_special_char",
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

/// The password itself is never echoed back in the error params.
pub fn validate_password(password: &str, messages: &Messages) -> Result<(), ValidationError> {
    run_rules(
        password,
        messages,
        &[
            has_valid_length,
            has_no_whitespace,
            has_mixed_case,
            has_digit,
            has_special_char,
        ],
        "password.invalid",
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::locale_utils::Lang;

    #[test]
    fn accepts_strong_password() {
        let messages = Messages::new(Lang::En);
        assert!(validate_password("Sup3r$ecret", &messages).is_ok());
    }

    #[test]
    fn reports_every_failed_rule_without_echoing_value() {
        let messages = Messages::new(Lang::En);
        let err = validate_password("weak", &messages).unwrap_err();
        let message = err.message.unwrap().to_string();

        assert!(message.contains("at least 8"));
        assert!(message.contains("digit"));
        assert_eq!(err.params["value"], serde_json::json!(""));
    }
}
