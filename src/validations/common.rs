use once_cell::sync::Lazy;
use phonenumber::Mode;
use regex::Regex;
use validator::ValidationError;

use crate::utils::{locale_utils::Messages, validation_utils::add_error};

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{3}$").expect("valid regex"));
static HTTPS_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://[A-Za-z0-9.-]+(:\d+)?(/\S*)?$").expect("valid regex"));

/// Phone numbers must be in international format (`+4930123456`).
pub fn validate_optional_phone(
    phone: Option<&str>,
    messages: &Messages,
) -> Result<(), ValidationError> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    match phonenumber::parse(None, phone) {
        Ok(number) if phonenumber::is_valid(&number) => Ok(()),
        _ => Err(add_error(
            "phone.invalid",
            messages.get_validation_message(
                "phone.invalid",
                "Phone number must be a valid international number (e.g. +14155550123)",
            ),
            phone,
        )),
    }
}

/// Normalizes a valid number to E.164.
pub fn normalize_phone(phone: &str) -> Option<String> {
    phonenumber::parse(None, phone.trim())
        .ok()
        .filter(phonenumber::is_valid)
        .map(|number| number.format().mode(Mode::E164).to_string())
}

pub fn validate_https_url(url: &str, messages: &Messages) -> Result<(), ValidationError> {
    if HTTPS_URL_RE.is_match(url.trim()) {
        Ok(())
    } else {
        Err(add_error(
            "url.https_required",
            messages
                .get_validation_message("url.https_required", "URL must be an https:// address"),
            url,
        ))
    }
}

pub fn validate_currency(currency: &str, messages: &Messages) -> Result<(), ValidationError> {
    if CURRENCY_RE.is_match(currency) {
        Ok(())
    } else {
        Err(add_error(
            "currency.invalid",
            messages.get_validation_message(
                "currency.invalid",
                "Currency must be a lowercase three-letter ISO code",
            ),
            currency,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::locale_utils::Lang;

    #[test]
    fn phone_is_optional_but_must_be_valid_when_present() {
        let messages = Messages::new(Lang::En);
        assert!(validate_optional_phone(None, &messages).is_ok());
        assert!(validate_optional_phone(Some("  "), &messages).is_ok());
        assert!(validate_optional_phone(Some("+14155552671"), &messages).is_ok());
        assert!(validate_optional_phone(Some("12345"), &messages).is_err());
    }

    #[test]
    fn normalizes_phone_to_e164() {
        assert_eq!(normalize_phone("+49 30 901820").as_deref(), Some("+4930901820"));
        assert_eq!(normalize_phone(" +1 415 555 2671 ").as_deref(), Some("+14155552671"));
        assert_eq!(normalize_phone("nope"), None);
    }

    #[test]
    fn only_https_urls_pass() {
        let messages = Messages::new(Lang::En);
        let embed = "https://app.powerbi.com/reportEmbed?reportId=1";
        assert!(validate_https_url(embed, &messages).is_ok());
        assert!(validate_https_url("http://app.powerbi.com/report", &messages).is_err());
        assert!(validate_https_url("javascript:alert(1)", &messages).is_err());
    }

    #[test]
    fn currency_codes_are_lowercase_iso() {
        let messages = Messages::new(Lang::En);
        assert!(validate_currency("usd", &messages).is_ok());
        assert!(validate_currency("USD", &messages).is_err());
        assert!(validate_currency("euro", &messages).is_err());
    }
}
