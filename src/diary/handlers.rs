use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        AddFoodItemRequest, CreateDayRequest, DayWriteResponse, DaysResponse,
        DeleteFoodItemRequest, FoodItemDeletedResponse, LogItem, UpdateDayRequest,
        UpdateFoodItemRequest,
    },
    repo,
    services::{check_day_limit, initial_log, remove_item, replace_item, updated_log},
};
use crate::{
    auth::AuthUser,
    clock,
    community,
    envelope::{duplicate_date, parse_key, KeyAck, DUPLICATE_DATE_MESSAGE},
    error::{ApiError, ApiResult},
    license::tier_for_user,
    state::AppState,
    validation::ValidatedJson,
};

const DAY_NOT_FOUND: &str = "Diary entry not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/diary/days", get(list_days).post(create_day))
        .route("/diary/days/:key", put(update_day).delete(delete_day))
        .route("/diary/days/:key/food-items", post(append_food_item))
        .route("/diary/food-items", post(add_food_item))
        .route(
            "/diary/food-items/:key",
            put(update_food_item).delete(delete_food_item),
        )
}

/// Bumps the community food's usage counter without holding up the response.
fn track_usage(db: PgPool, community_food_key: Uuid) {
    tokio::spawn(async move {
        if let Err(e) = community::repo::increment_usage(&db, community_food_key).await {
            debug!(error = %e, %community_food_key, "usage tracking failed");
        }
    });
}

#[instrument(skip(state))]
pub async fn list_days(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<DaysResponse>> {
    let days = repo::list_days(&state.db, user_id).await?;
    Ok(Json(DaysResponse {
        success: true,
        days,
    }))
}

#[instrument(skip(state, body))]
pub async fn create_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<CreateDayRequest>,
) -> ApiResult<Json<KeyAck>> {
    let tier = tier_for_user(&state, user_id).await?;
    let mut tx = state.db.begin().await?;

    if repo::date_taken(&mut *tx, user_id, &body.date, None).await? {
        warn!(%user_id, date = %body.date, "diary day already exists");
        return Err(ApiError::Conflict(DUPLICATE_DATE_MESSAGE.into()));
    }
    let existing = repo::count_days(&mut *tx, user_id).await?;
    check_day_limit(tier, existing, state.config.limits.free_diary_days)?;

    let day = repo::insert_day(&mut *tx, user_id, &body.date, initial_log(body.phe, body.kcal))
        .await
        .map_err(duplicate_date)?;
    tx.commit().await?;

    info!(%user_id, key = %day.id, date = %day.date, "diary day created");
    Ok(Json(KeyAck::new(day.id)))
}

#[instrument(skip(state, body))]
pub async fn update_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(key): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateDayRequest>,
) -> ApiResult<Json<DayWriteResponse>> {
    let id = parse_key(&key, DAY_NOT_FOUND)?;
    let mut tx = state.db.begin().await?;

    let day = repo::find_day_for_update(&mut *tx, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(DAY_NOT_FOUND.into()))?;

    let date = match body.date {
        Some(date) if date != day.date => {
            if repo::date_taken(&mut *tx, user_id, &date, Some(id)).await? {
                warn!(%user_id, %date, "diary date change collides");
                return Err(ApiError::Conflict(DUPLICATE_DATE_MESSAGE.into()));
            }
            date
        }
        _ => day.date,
    };
    let log = updated_log(day.log.0, body.log, body.phe, body.kcal);

    repo::save_day(&mut *tx, user_id, id, &date, log)
        .await
        .map_err(duplicate_date)?;
    tx.commit().await?;

    info!(%user_id, key = %id, "diary day updated");
    Ok(Json(DayWriteResponse {
        success: true,
        key: id,
        updated: true,
    }))
}

#[instrument(skip(state))]
pub async fn delete_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(key): Path<String>,
) -> ApiResult<Json<KeyAck>> {
    let id = parse_key(&key, DAY_NOT_FOUND)?;
    if !repo::delete_day(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound(DAY_NOT_FOUND.into()));
    }
    info!(%user_id, key = %id, "diary day deleted");
    Ok(Json(KeyAck::new(id)))
}

/// Adds an item to the day matching `date`, creating the day if needed.
#[instrument(skip(state, body))]
pub async fn add_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(body): ValidatedJson<AddFoodItemRequest>,
) -> ApiResult<Json<DayWriteResponse>> {
    let date = body.date.unwrap_or_else(clock::today);
    let item = body.item;
    let community_food_key = item.community_food_key;

    let mut tx = state.db.begin().await?;
    let existing_day = repo::find_day_by_date_for_update(&mut *tx, user_id, &date).await?;
    let (key, updated) = match existing_day {
        Some(day) => {
            let mut log = day.log.0;
            log.push(item);
            repo::save_day(&mut *tx, user_id, day.id, &day.date, log).await?;
            (day.id, true)
        }
        None => {
            let tier = tier_for_user(&state, user_id).await?;
            let existing = repo::count_days(&mut *tx, user_id).await?;
            check_day_limit(tier, existing, state.config.limits.free_diary_days)?;
            let day = repo::insert_day(&mut *tx, user_id, &date, vec![item])
                .await
                .map_err(duplicate_date)?;
            (day.id, false)
        }
    };
    tx.commit().await?;

    if let Some(food) = community_food_key {
        track_usage(state.db.clone(), food);
    }

    info!(%user_id, %key, %date, updated, "food item added");
    Ok(Json(DayWriteResponse {
        success: true,
        key,
        updated,
    }))
}

/// Appends an item to a specific day.
#[instrument(skip(state, item))]
pub async fn append_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(key): Path<String>,
    ValidatedJson(item): ValidatedJson<LogItem>,
) -> ApiResult<Json<DayWriteResponse>> {
    let id = parse_key(&key, DAY_NOT_FOUND)?;
    let community_food_key = item.community_food_key;

    let mut tx = state.db.begin().await?;
    let day = repo::find_day_for_update(&mut *tx, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(DAY_NOT_FOUND.into()))?;
    let mut log = day.log.0;
    log.push(item);
    repo::save_day(&mut *tx, user_id, id, &day.date, log).await?;
    tx.commit().await?;

    if let Some(food) = community_food_key {
        track_usage(state.db.clone(), food);
    }

    info!(%user_id, key = %id, "food item appended");
    Ok(Json(DayWriteResponse {
        success: true,
        key: id,
        updated: true,
    }))
}

#[instrument(skip(state, body))]
pub async fn update_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(key): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateFoodItemRequest>,
) -> ApiResult<Json<KeyAck>> {
    let id = parse_key(&key, DAY_NOT_FOUND)?;
    let mut tx = state.db.begin().await?;

    let day = repo::find_day_for_update(&mut *tx, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(DAY_NOT_FOUND.into()))?;
    let mut log = day.log.0;
    replace_item(&mut log, body.log_index, body.entry)?;
    repo::save_day(&mut *tx, user_id, id, &day.date, log).await?;
    tx.commit().await?;

    info!(%user_id, key = %id, log_index = body.log_index, "food item updated");
    Ok(Json(KeyAck::new(id)))
}

#[instrument(skip(state, body))]
pub async fn delete_food_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(key): Path<String>,
    ValidatedJson(body): ValidatedJson<DeleteFoodItemRequest>,
) -> ApiResult<Json<FoodItemDeletedResponse>> {
    let id = parse_key(&key, DAY_NOT_FOUND)?;
    let mut tx = state.db.begin().await?;

    let day = repo::find_day_for_update(&mut *tx, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(DAY_NOT_FOUND.into()))?;
    let mut log = day.log.0;
    remove_item(&mut log, body.log_index)?;
    repo::save_day(&mut *tx, user_id, id, &day.date, log).await?;
    tx.commit().await?;

    info!(%user_id, key = %id, log_index = body.log_index, "food item deleted");
    Ok(Json(FoodItemDeletedResponse {
        success: true,
        key: id,
        deleted_log_index: body.log_index as usize,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn setup(pool: &PgPool) -> (AppState, Uuid) {
        let user = User::create(pool, "diary@example.com", "hash").await.unwrap();
        (AppState::with_pool(pool.clone()), user.id)
    }

    fn new_day(date: &str) -> CreateDayRequest {
        serde_json::from_value(json!({ "date": date, "phe": 0, "kcal": 0 })).unwrap()
    }

    fn add_item(date: &str, name: &str, phe: f64) -> AddFoodItemRequest {
        serde_json::from_value(json!({
            "date": date,
            "name": name,
            "weight": 100,
            "phe": phe,
            "kcal": 50
        }))
        .unwrap()
    }

    #[sqlx::test]
    async fn second_day_on_same_date_conflicts(pool: PgPool) {
        let (state, user_id) = setup(&pool).await;

        create_day(State(state.clone()), AuthUser(user_id), ValidatedJson(new_day("2025-03-01")))
            .await
            .unwrap();
        let err = create_day(State(state), AuthUser(user_id), ValidatedJson(new_day("2025-03-01")))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), DUPLICATE_DATE_MESSAGE);
    }

    #[sqlx::test]
    async fn moving_a_day_onto_a_taken_date_conflicts(pool: PgPool) {
        let (state, user_id) = setup(&pool).await;

        create_day(State(state.clone()), AuthUser(user_id), ValidatedJson(new_day("2025-03-01")))
            .await
            .unwrap();
        let Json(second) = create_day(
            State(state.clone()),
            AuthUser(user_id),
            ValidatedJson(new_day("2025-03-02")),
        )
        .await
        .unwrap();

        let body: UpdateDayRequest =
            serde_json::from_value(json!({ "date": "2025-03-01", "phe": 0, "kcal": 0 })).unwrap();
        let err = update_day(
            State(state.clone()),
            AuthUser(user_id),
            Path(second.key.to_string()),
            ValidatedJson(body),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let days = repo::list_days(&pool, user_id).await.unwrap();
        assert!(days.iter().any(|d| d.id == second.key && d.date == "2025-03-02"));
    }

    #[sqlx::test]
    async fn add_item_creates_then_appends(pool: PgPool) {
        let (state, user_id) = setup(&pool).await;

        let Json(first) = add_food_item(
            State(state.clone()),
            AuthUser(user_id),
            ValidatedJson(add_item("2025-03-05", "Apple", 12.0)),
        )
        .await
        .unwrap();
        assert!(!first.updated);

        let Json(second) = add_food_item(
            State(state.clone()),
            AuthUser(user_id),
            ValidatedJson(add_item("2025-03-05", "Rice", 30.0)),
        )
        .await
        .unwrap();
        assert!(second.updated);
        assert_eq!(second.key, first.key);

        let days = repo::list_days(&pool, user_id).await.unwrap();
        assert_eq!(days.len(), 1);
        let day = &days[0];
        let names: Vec<&str> = day.log.0.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Apple", "Rice"]);
        assert_eq!(day.phe, 42.0);
        assert_eq!(day.kcal, 100.0);
    }
}
