pub mod auth_utils;
pub mod locale_utils;
pub mod request_utils;
pub mod stripe_signature;
pub mod validation_utils;
