use serde::{Deserialize, Serialize};

use crate::validation::{Issues, Validate};

#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub model: Option<String>,
}

impl Validate for CheckRequest {
    fn validate(&self, _issues: &mut Issues) {}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub allowed: bool,
    pub remaining: i32,
    pub reset_at: String,
}
