use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StartTrialRequest {
    pub plan_id: String,
}
