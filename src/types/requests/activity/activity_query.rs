use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
}
