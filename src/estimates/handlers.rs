use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use super::{
    dto::{CheckRequest, CheckResponse},
    services::{check, quota_for, DEFAULT_MODEL},
};
use crate::{
    auth::AuthUser, clock, error::ApiResult, license::resolve_tier, settings,
    state::AppState, validation::ValidatedJson,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/estimates/check", post(check_estimate))
}

/// Charges one estimate against today's credits when it fits.
#[instrument(skip(state, body))]
pub async fn check_estimate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<CheckRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let model = body
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let today = clock::today();

    let mut tx = state.db.begin().await?;
    let current = settings::repo::lock(&mut *tx, user_id).await?;
    let tier = resolve_tier(current.license.as_deref(), &state.config.license);
    let quota = quota_for(tier, &model);
    let decision = check(
        quota,
        current.estimation_count,
        current.estimation_date.as_deref(),
        &today,
    );

    if decision.allowed {
        settings::repo::save_estimation(&mut *tx, user_id, decision.used, &today).await?;
        info!(%user_id, %model, ?tier, used = decision.used, "estimate charged");
    } else {
        warn!(%user_id, %model, ?tier, "estimate quota exhausted");
    }
    tx.commit().await?;

    Ok(Json(CheckResponse {
        allowed: decision.allowed,
        remaining: decision.remaining,
        reset_at: today,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use axum::http::StatusCode;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn charges_an_existing_user(pool: PgPool) {
        let state = AppState::with_pool(pool.clone());
        let user = User::create(&pool, "credits@example.com", "hash").await.unwrap();

        let Json(res) = check_estimate(
            State(state),
            AuthUser(user.id),
            ValidatedJson(CheckRequest::default()),
        )
        .await
        .unwrap();
        assert!(res.allowed);
        assert_eq!(res.reset_at, clock::today());
    }

    #[sqlx::test]
    async fn deleted_account_gets_unauthorized(pool: PgPool) {
        let state = AppState::with_pool(pool.clone());
        let user = User::create(&pool, "gone@example.com", "hash").await.unwrap();
        assert!(User::delete(&pool, user.id).await.unwrap());

        let err = check_estimate(
            State(state),
            AuthUser(user.id),
            ValidatedJson(CheckRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "User not found");
    }
}
