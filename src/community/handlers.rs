use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CommunityFoodsResponse, ListQuery, VoteRequest, VoteResponse},
    repo,
    services::{apply_vote, ensure_not_contributor, Vote},
};
use crate::{
    auth::AuthUser,
    envelope::parse_key,
    error::{ApiError, ApiResult},
    state::AppState,
    validation::ValidatedJson,
};

const FOOD_NOT_FOUND: &str = "Community food not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/community-foods", get(list_foods))
        .route("/community-food/vote", post(vote))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<CommunityFoodsResponse>> {
    let foods = repo::list(&state.db, query.language, query.include_hidden).await?;
    Ok(Json(CommunityFoodsResponse {
        success: true,
        foods: foods.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state, body))]
pub async fn vote(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<VoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let food_id = parse_key(&body.community_food_key, FOOD_NOT_FOUND)?;
    let vote = Vote::from_value(body.vote)
        .ok_or_else(|| ApiError::BadRequest("Vote must be 1 or -1".into()))?;

    let mut tx = state.db.begin().await?;
    let food = repo::find_for_update(&mut *tx, food_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(FOOD_NOT_FOUND.into()))?;

    ensure_not_contributor(food.contributor_id, user_id).map_err(|e| {
        warn!(%user_id, %food_id, "self vote rejected");
        e
    })?;

    let previous = repo::vote_of(&mut *tx, food_id, user_id).await?;
    let (tally, stored) = apply_vote(food.tally(), previous, vote);
    repo::store_vote(&mut *tx, food_id, user_id, stored).await?;
    repo::save_tally(&mut *tx, food_id, tally).await?;
    tx.commit().await?;

    info!(%user_id, %food_id, ?previous, ?stored, score = tally.score(), "community vote recorded");
    Ok(Json(VoteResponse {
        success: true,
        likes: tally.likes,
        dislikes: tally.dislikes,
        score: tally.score(),
        hidden: tally.hidden(),
    }))
}
