use serde::Serialize;
use uuid::Uuid;

use crate::{config::LicenseConfig, settings::repo as settings_repo, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Free,
    Premium,
    PremiumAi,
}

impl Tier {
    pub fn is_premium(self) -> bool {
        !matches!(self, Tier::Free)
    }
}

/// Maps a license string to its tier. Unset secrets never match.
pub fn resolve_tier(license: Option<&str>, cfg: &LicenseConfig) -> Tier {
    let Some(license) = license.filter(|l| !l.is_empty()) else {
        return Tier::Free;
    };
    if matches_secret(license, cfg.premium_ai_key.as_deref()) {
        Tier::PremiumAi
    } else if matches_secret(license, cfg.premium_key.as_deref()) {
        Tier::Premium
    } else {
        Tier::Free
    }
}

fn matches_secret(candidate: &str, secret: Option<&str>) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return false;
    };
    candidate.len() == secret.len()
        && candidate
            .bytes()
            .zip(secret.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

pub async fn tier_for_user(state: &AppState, user_id: Uuid) -> sqlx::Result<Tier> {
    let license = settings_repo::license_of(&state.db, user_id).await?;
    Ok(resolve_tier(license.as_deref(), &state.config.license))
}
