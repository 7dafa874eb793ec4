use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,

    pub email: String,

    pub password: String,

    #[serde(default)]
    pub phone: Option<String>,
}
