use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::services::{resolve_tier, Tier};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    validation::{Issues, ValidatedJson, Validate},
};

#[derive(Debug, Deserialize)]
pub struct ValidateLicenseRequest {
    #[serde(default)]
    pub license: Option<String>,
}

impl Validate for ValidateLicenseRequest {
    fn validate(&self, _issues: &mut Issues) {}
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateLicenseResponse {
    pub success: bool,
    pub valid: bool,
    pub premium: bool,
    pub premium_ai: bool,
}

impl From<Tier> for ValidateLicenseResponse {
    fn from(tier: Tier) -> Self {
        Self {
            success: true,
            valid: tier.is_premium(),
            premium: tier.is_premium(),
            premium_ai: tier == Tier::PremiumAi,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/license/validate", post(validate_license))
}

#[instrument(skip(state, payload))]
pub async fn validate_license(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<ValidateLicenseRequest>,
) -> ApiResult<Json<ValidateLicenseResponse>> {
    let license = payload
        .license
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("License key is required".into()))?;

    let tier = resolve_tier(Some(&license), &state.config.license);
    info!(%user_id, ?tier, "license validated");
    Ok(Json(tier.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_flags_follow_tier() {
        let json = serde_json::to_value(ValidateLicenseResponse::from(Tier::Premium)).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["premium"], true);
        assert_eq!(json["premiumAi"], false);

        let free = ValidateLicenseResponse::from(Tier::Free);
        assert!(!free.valid && !free.premium && !free.premium_ai);
    }
}
