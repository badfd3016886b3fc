use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{LabValueData, LabValuesResponse, UpdateLabValueRequest},
    repo,
};
use crate::{
    auth::AuthUser,
    envelope::{duplicate_date, parse_key, EntryKeyRequest, KeyAck, DUPLICATE_DATE_MESSAGE},
    error::{ApiError, ApiResult},
    state::AppState,
    validation::ValidatedJson,
};

const ENTRY_NOT_FOUND: &str = "Lab value entry not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lab-values", get(list_lab_values))
        .route("/lab-values/save", post(save_lab_value))
        .route("/lab-values/update", post(update_lab_value))
        .route("/lab-values/delete", post(delete_lab_value))
}

#[instrument(skip(state))]
pub async fn list_lab_values(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<LabValuesResponse>> {
    let lab_values = repo::list(&state.db, user_id).await?;
    Ok(Json(LabValuesResponse {
        success: true,
        lab_values,
    }))
}

#[instrument(skip(state, body))]
pub async fn save_lab_value(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<LabValueData>,
) -> ApiResult<Json<KeyAck>> {
    if repo::date_taken(&state.db, user_id, &body.date, None).await? {
        warn!(%user_id, date = %body.date, "lab value already exists");
        return Err(ApiError::Conflict(DUPLICATE_DATE_MESSAGE.into()));
    }
    let id = repo::insert(&state.db, user_id, &body)
        .await
        .map_err(duplicate_date)?;

    info!(%user_id, key = %id, "lab value saved");
    Ok(Json(KeyAck::new(id)))
}

#[instrument(skip(state, body))]
pub async fn update_lab_value(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateLabValueRequest>,
) -> ApiResult<Json<KeyAck>> {
    let id = parse_key(&body.entry_key, ENTRY_NOT_FOUND)?;
    let current = repo::find(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(ENTRY_NOT_FOUND.into()))?;

    let data = body.data;
    if data.date != current.date && repo::date_taken(&state.db, user_id, &data.date, Some(id)).await? {
        warn!(%user_id, date = %data.date, "lab value date change collides");
        return Err(ApiError::Conflict(DUPLICATE_DATE_MESSAGE.into()));
    }
    if !repo::update(&state.db, user_id, id, &data)
        .await
        .map_err(duplicate_date)?
    {
        return Err(ApiError::NotFound(ENTRY_NOT_FOUND.into()));
    }

    info!(%user_id, key = %id, "lab value updated");
    Ok(Json(KeyAck::new(id)))
}

#[instrument(skip(state, body))]
pub async fn delete_lab_value(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<EntryKeyRequest>,
) -> ApiResult<Json<KeyAck>> {
    let id = parse_key(&body.entry_key, ENTRY_NOT_FOUND)?;
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound(ENTRY_NOT_FOUND.into()));
    }
    info!(%user_id, key = %id, "lab value deleted");
    Ok(Json(KeyAck::new(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;
    use uuid::Uuid;

    async fn save(state: &AppState, user_id: Uuid, date: &str, phe: f64) -> ApiResult<Json<KeyAck>> {
        let body: LabValueData = serde_json::from_value(json!({ "date": date, "phe": phe })).unwrap();
        save_lab_value(State(state.clone()), AuthUser(user_id), ValidatedJson(body)).await
    }

    #[sqlx::test]
    async fn one_entry_per_date(pool: PgPool) {
        let state = AppState::with_pool(pool.clone());
        let user = User::create(&pool, "labs@example.com", "hash").await.unwrap();

        save(&state, user.id, "2025-02-10", 4.2).await.unwrap();
        let err = save(&state, user.id, "2025-02-10", 5.0).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), DUPLICATE_DATE_MESSAGE);

        let Json(listed) = list_lab_values(State(state), AuthUser(user.id)).await.unwrap();
        assert_eq!(listed.lab_values.len(), 1);
    }

    #[sqlx::test]
    async fn update_onto_taken_date_conflicts(pool: PgPool) {
        let state = AppState::with_pool(pool.clone());
        let user = User::create(&pool, "labs@example.com", "hash").await.unwrap();

        save(&state, user.id, "2025-02-10", 4.2).await.unwrap();
        let Json(second) = save(&state, user.id, "2025-02-11", 3.9).await.unwrap();

        let body: UpdateLabValueRequest = serde_json::from_value(json!({
            "entryKey": second.key.to_string(),
            "data": { "date": "2025-02-10", "phe": 3.9 }
        }))
        .unwrap();
        let err = update_lab_value(State(state), AuthUser(user.id), ValidatedJson(body))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
