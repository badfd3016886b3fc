use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        ConsentRequest, GettingStartedRequest, ResetRequest, ResetResponse, ResetType,
        SettingsResponse, UpdateSettingsRequest,
    },
    repo::{self, Settings},
    services::{record_consent, ConsentKind},
};
use crate::{
    auth::{repo::User, AuthUser},
    clock, diary,
    envelope::Ack,
    error::{ApiError, ApiResult},
    lab_values,
    license::resolve_tier,
    own_food,
    state::AppState,
    validation::ValidatedJson,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings/update", post(update_settings))
        .route("/settings/consent", post(update_consent))
        .route("/settings/getting-started", post(getting_started))
        .route("/settings/reset", post(reset))
        .route("/settings/delete-account", post(delete_account))
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<SettingsResponse>> {
    let settings = repo::find(&state.db, user_id).await?.unwrap_or_default();
    let tier = resolve_tier(settings.license.as_deref(), &state.config.license);
    Ok(Json(SettingsResponse {
        success: true,
        settings,
        tier,
    }))
}

#[instrument(skip(state, body))]
pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateSettingsRequest>,
) -> ApiResult<Json<Ack>> {
    let mut tx = state.db.begin().await?;
    repo::lock(&mut *tx, user_id).await?;
    repo::update(&mut *tx, user_id, &body).await?;
    tx.commit().await?;

    info!(%user_id, license_changed = body.license.is_some(), "settings updated");
    Ok(Json(Ack::ok()))
}

#[instrument(skip(state, body))]
pub async fn update_consent(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<ConsentRequest>,
) -> ApiResult<Json<Ack>> {
    let today = clock::today();
    let mut tx = state.db.begin().await?;
    let current: Settings = repo::lock(&mut *tx, user_id).await?;

    let health_data = match body.health_data_consent {
        Some(granted) => record_consent(current.health_data(), ConsentKind::HealthData, granted, &today),
        None => current.health_data(),
    };
    let email = match body.email_consent {
        Some(granted) => record_consent(current.email(), ConsentKind::Email, granted, &today),
        None => current.email(),
    };

    repo::save_consent(&mut *tx, user_id, &health_data, &email).await?;
    tx.commit().await?;

    info!(
        %user_id,
        health_data = ?body.health_data_consent,
        email = ?body.email_consent,
        "consent recorded"
    );
    Ok(Json(Ack::ok()))
}

#[instrument(skip(state, body))]
pub async fn getting_started(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<GettingStartedRequest>,
) -> ApiResult<Json<Ack>> {
    repo::set_getting_started(&state.db, user_id, body.completed).await?;
    Ok(Json(Ack::ok()))
}

#[instrument(skip(state, body))]
pub async fn reset(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<ResetRequest>,
) -> ApiResult<Json<ResetResponse>> {
    let removed = match body.kind {
        ResetType::Diary => diary::repo::delete_all_days(&state.db, user_id).await?,
        ResetType::LabValues => lab_values::repo::delete_all(&state.db, user_id).await?,
        ResetType::OwnFood => own_food::repo::delete_all(&state.db, user_id).await?,
    };

    warn!(%user_id, kind = ?body.kind, removed, "user data reset");
    Ok(Json(ResetResponse {
        success: true,
        kind: body.kind,
    }))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Ack>> {
    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }
    warn!(%user_id, "account deleted");
    Ok(Json(Ack::ok()))
}
