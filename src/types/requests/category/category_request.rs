use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 2, max = 80))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_public: bool,
}
