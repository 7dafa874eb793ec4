use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    En,
    Id,
    De,
    Ja,
}

impl Lang {
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "id" => Self::Id,
            "de" => Self::De,
            "ja" | "jp" => Self::Ja,
            _ => Self::En,
        }
    }

    fn folder(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::De => "de",
            Lang::Id => "id",
            Lang::Ja => "ja",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Validation,
    Auth,
    User,
    Dashboard,
    Category,
    Pricing,
    Ticket,
    Admin,
}

impl Namespace {
    fn as_str(&self) -> &'static str {
        match self {
            Namespace::Validation => "validation",
            Namespace::Auth => "auth",
            Namespace::User => "user",
            Namespace::Dashboard => "dashboard",
            Namespace::Category => "category",
            Namespace::Pricing => "pricing",
            Namespace::Ticket => "ticket",
            Namespace::Admin => "admin",
        }
    }
}

static CATALOG: Lazy<RwLock<HashMap<(Lang, Namespace), Arc<Value>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn read_message_file(lang: Lang, namespace: Namespace) -> Option<Value> {
    let file_path = Path::new("locales")
        .join(lang.folder())
        .join(format!("{}.json", namespace.as_str()));

    let content = fs::read_to_string(&file_path).ok()?;
    match serde_json::from_str(&content) {
        Ok(json) => {
            log::debug!("Loaded messages from {:?}", file_path);
            Some(json)
        }
        Err(err) => {
            log::error!("Failed to parse JSON from {:?}: {}", file_path, err);
            None
        }
    }
}

/// Missing translations fall back to the English file.
fn load_message_file(lang: Lang, namespace: Namespace) -> Arc<Value> {
    if let Ok(catalog) = CATALOG.read() {
        if let Some(cached) = catalog.get(&(lang, namespace)) {
            return Arc::clone(cached);
        }
    }

    let value = read_message_file(lang, namespace)
        .or_else(|| {
            (lang != Lang::En)
                .then(|| read_message_file(Lang::En, namespace))
                .flatten()
        })
        .unwrap_or_else(|| {
            log::warn!(
                "No message file for namespace '{}' ({:?})",
                namespace.as_str(),
                lang
            );
            Value::Null
        });

    let value = Arc::new(value);
    if let Ok(mut catalog) = CATALOG.write() {
        catalog.insert((lang, namespace), Arc::clone(&value));
    }
    value
}

#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub lang: Lang,
}

impl Messages {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn get(&self, namespace: Namespace, path: &str) -> Option<Value> {
        let root = load_message_file(self.lang, namespace);

        let mut current = root.as_ref();
        for key in path.split('.') {
            match current.get(key) {
                Some(next) => current = next,
                None => {
                    log::debug!(
                        "Key '{}' not found in path '{}.{}'",
                        key,
                        namespace.as_str(),
                        path
                    );
                    return None;
                }
            }
        }

        Some(current.clone())
    }

    pub fn get_str(&self, namespace: Namespace, path: &str, fallback: &str) -> String {
        self.get(namespace, path)
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    }

    pub fn get_validation_message(&self, path: &str, fallback: &str) -> String {
        self.get_str(Namespace::Validation, path, fallback)
    }
}

pub fn get_lang(req: &actix_web::HttpRequest) -> Lang {
    req.headers()
        .get("Accept-Language")
        .and_then(|value| value.to_str().ok())
        .and_then(|header| {
            header
                .split(',')
                .next()
                .and_then(|tag| tag.split(['-', ';']).next())
        })
        .map(|code| Lang::from_code(code.trim()))
        .unwrap_or(Lang::En)
}

pub fn request_messages(req: &actix_web::HttpRequest) -> Messages {
    Messages::new(get_lang(req))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn resolves_language_from_header() {
        let req = TestRequest::default()
            .insert_header(("Accept-Language", "de-DE,de;q=0.9,en;q=0.8"))
            .to_http_request();
        assert_eq!(get_lang(&req), Lang::De);

        let req = TestRequest::default().to_http_request();
        assert_eq!(get_lang(&req), Lang::En);
    }

    #[test]
    fn unknown_codes_default_to_english() {
        assert_eq!(Lang::from_code("fr"), Lang::En);
        assert_eq!(Lang::from_code("JP"), Lang::Ja);
    }

    #[test]
    fn looks_up_nested_keys_with_fallback() {
        let messages = Messages::new(Lang::En);
        assert_eq!(
            messages.get_str(Namespace::Auth, "login.success", "fallback"),
            "Login successful."
        );
        assert_eq!(
            messages.get_str(Namespace::Auth, "does.not.exist", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn missing_translation_falls_back_to_english() {
        let messages = Messages::new(Lang::Ja);
        assert_eq!(
            messages.get_str(Namespace::Ticket, "create.success", "fallback"),
            "Ticket created."
        );
    }
}
