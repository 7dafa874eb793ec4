use validator::ValidationError;

use super::run_rules;
use crate::{types::validations::ValidationResult, utils::locale_utils::Messages};

const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 100;

fn is_not_empty(name: &str, messages: &Messages) -> ValidationResult {
    if name.trim().is_empty() {
        Err(messages.get_validation_message("name.empty", "Name must not be empty"))
    } else {
        Ok(())
    }
}

fn has_valid_length(name: &str, messages: &Messages) -> ValidationResult {
    let length = name.trim().chars().count();
    if length < MIN_NAME_LENGTH {
        Err(messages.get_validation_message(
            "name.too_short",
            &format!("Name must be at least {} characters long", MIN_NAME_LENGTH),
        ))
    } else if length > MAX_NAME_LENGTH {
        Err(messages.get_validation_message(
            "name.too_long",
            &format!("Name must be less than {} characters", MAX_NAME_LENGTH),
        ))
    } else {
        Ok(())
    }
}

fn has_valid_chars(name: &str, messages: &Messages) -> ValidationResult {
    let allowed = |c: char| c.is_alphabetic() || c.is_whitespace() || matches!(c, '\'' | '-' | '.');
    if !name.chars().all(allowed) {
        Err(messages.get_validation_message(
            "name.invalid_chars",
            "Name can only contain letters, spaces, apostrophes, hyphens and dots",
        ))
    } else {
        Ok(())
    }
}

pub fn validate_name(name: &str, messages: &Messages) -> Result<(), ValidationError> {
    run_rules(
        name,
        messages,
        &[is_not_empty, has_valid_length, has_valid_chars],
        "name.invalid",
        true,
    )
}
