use email_address::EmailAddress;
use validator::ValidationError;

use super::run_rules;
use crate::{types::validations::ValidationResult, utils::locale_utils::Messages};

const MIN_EMAIL_LENGTH: usize = 5;
const MAX_EMAIL_LENGTH: usize = 254;
const MIN_TLD_LENGTH: usize = 2;

fn domain_of(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

fn has_valid_length(email: &str, messages: &Messages) -> ValidationResult {
    let length = email.len();
    if length < MIN_EMAIL_LENGTH {
        return Err(messages.get_validation_message(
            "email.too_short",
            &format!("Email must be at least {} characters", MIN_EMAIL_LENGTH),
        ));
    }
    if length > MAX_EMAIL_LENGTH {
        return Err(messages.get_validation_message(
            "email.too_long",
            &format!("Email must be less than {} characters", MAX_EMAIL_LENGTH),
        ));
    }
    Ok(())
}

fn has_no_invalid_chars(email: &str, messages: &Messages) -> ValidationResult {
    if email.chars().any(|c| c.is_whitespace() || !c.is_ascii()) {
        return Err(messages.get_validation_message(
            "email.invalid_chars",
            "Email must not contain spaces or non-ASCII characters",
        ));
    }
    Ok(())
}

fn has_no_dot_errors(email: &str, messages: &Messages) -> ValidationResult {
    if email.contains("..") || email.starts_with('.') || email.ends_with('.') {
        return Err(messages.get_validation_message(
            "email.dots",
            "Email must not start or end with a dot or contain consecutive dots",
        ));
    }
    Ok(())
}

fn has_valid_domain(email: &str, messages: &Messages) -> ValidationResult {
    let Some(domain) = domain_of(email) else {
        return Err(messages.get_validation_message(
            "email.missing_domain",
            "Email must have a domain part after '@'",
        ));
    };

    let tld_ok = domain
        .rsplit_once('.')
        .map(|(host, tld)| {
            !host.is_empty()
                && !host.starts_with('.')
                && tld.len() >= MIN_TLD_LENGTH
                && tld.chars().all(|c| c.is_ascii_alphabetic())
        })
        .unwrap_or(false);

    if !tld_ok {
        return Err(messages.get_validation_message(
            "email.invalid_domain",
            "The domain part of the email is invalid",
        ));
    }
    Ok(())
}

fn is_rfc_compliant(email: &str, messages: &Messages) -> ValidationResult {
    if !EmailAddress::is_valid(email) {
        return Err(messages.get_validation_message("email.invalid", "Invalid email format"));
    }
    Ok(())
}

pub fn validate_email(email: &str, messages: &Messages) -> Result<(), ValidationError> {
    run_rules(
        email,
        messages,
        &[
            has_valid_length,
            has_no_invalid_chars,
            has_no_dot_errors,
            has_valid_domain,
            is_rfc_compliant,
        ],
        "email.invalid",
        true,
    )
}
