use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use sqlx::PgConnection;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        OwnFoodData, OwnFoodWriteResponse, OwnFoodsResponse, SaveOwnFoodRequest,
        UpdateOwnFoodRequest,
    },
    repo,
    services::{share_change, ShareChange},
};
use crate::{
    auth::AuthUser,
    community::{self, Language},
    envelope::{parse_key, EntryKeyRequest, KeyAck},
    error::{ApiError, ApiResult},
    state::AppState,
    validation::ValidatedJson,
};

const ENTRY_NOT_FOUND: &str = "Own food entry not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/own-food", get(list_own_foods))
        .route("/own-food/save", post(save_own_food))
        .route("/own-food/update", post(update_own_food))
        .route("/own-food/delete", post(delete_own_food))
}

/// Brings the community copy in line with the food's sharing flag.
/// Returns the key of the community food when one exists afterwards.
async fn apply_share_change(
    conn: &mut PgConnection,
    user_id: Uuid,
    own_food_id: Uuid,
    change: ShareChange,
    data: &OwnFoodData,
    locale: Option<Language>,
) -> sqlx::Result<Option<Uuid>> {
    let fields = data.shared_fields();
    match change {
        ShareChange::Create => {
            let key = community::repo::share(
                &mut *conn,
                own_food_id,
                user_id,
                fields,
                locale.unwrap_or_default(),
            )
            .await?;
            info!(%user_id, %own_food_id, community_food_key = %key, "own food shared");
            Ok(Some(key))
        }
        ShareChange::Sync => {
            if let Some(key) =
                community::repo::sync_shared(&mut *conn, own_food_id, fields, locale).await?
            {
                return Ok(Some(key));
            }
            let key = community::repo::share(
                &mut *conn,
                own_food_id,
                user_id,
                fields,
                locale.unwrap_or_default(),
            )
            .await?;
            Ok(Some(key))
        }
        ShareChange::Remove => {
            community::repo::unshare(&mut *conn, own_food_id).await?;
            info!(%user_id, %own_food_id, "own food unshared");
            Ok(None)
        }
        ShareChange::Keep => Ok(None),
    }
}

#[instrument(skip(state))]
pub async fn list_own_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<OwnFoodsResponse>> {
    let own_foods = repo::list(&state.db, user_id).await?;
    Ok(Json(OwnFoodsResponse {
        success: true,
        own_foods,
    }))
}

#[instrument(skip(state, body))]
pub async fn save_own_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<SaveOwnFoodRequest>,
) -> ApiResult<Json<OwnFoodWriteResponse>> {
    let mut tx = state.db.begin().await?;
    let id = repo::insert(&mut *tx, user_id, &body.data).await?;
    let change = share_change(false, body.data.shared);
    let community_food_key =
        apply_share_change(&mut *tx, user_id, id, change, &body.data, body.locale).await?;
    tx.commit().await?;

    info!(%user_id, key = %id, shared = body.data.shared, "own food saved");
    Ok(Json(OwnFoodWriteResponse {
        success: true,
        key: id,
        community_food_key,
    }))
}

#[instrument(skip(state, body))]
pub async fn update_own_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<UpdateOwnFoodRequest>,
) -> ApiResult<Json<OwnFoodWriteResponse>> {
    let id = parse_key(&body.entry_key, ENTRY_NOT_FOUND)?;

    let mut tx = state.db.begin().await?;
    let was_shared = repo::shared_for_update(&mut *tx, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(ENTRY_NOT_FOUND.into()))?;

    repo::update(&mut *tx, user_id, id, &body.data).await?;
    let change = share_change(was_shared, body.data.shared);
    let community_food_key =
        apply_share_change(&mut *tx, user_id, id, change, &body.data, body.locale).await?;
    tx.commit().await?;

    info!(%user_id, key = %id, ?change, "own food updated");
    Ok(Json(OwnFoodWriteResponse {
        success: true,
        key: id,
        community_food_key,
    }))
}

#[instrument(skip(state, body))]
pub async fn delete_own_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<EntryKeyRequest>,
) -> ApiResult<Json<KeyAck>> {
    let id = parse_key(&body.entry_key, ENTRY_NOT_FOUND)?;
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound(ENTRY_NOT_FOUND.into()));
    }
    info!(%user_id, key = %id, "own food deleted");
    Ok(Json(KeyAck::new(id)))
}
