use serde::Serialize;
use sqlx::{types::Json, FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::{dto::LogItem, services::totals};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DiaryDay {
    #[serde(rename = "key")]
    pub id: Uuid,
    pub date: String,
    pub phe: f64,
    pub kcal: f64,
    pub log: Json<Vec<LogItem>>,
}

pub async fn list_days(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<DiaryDay>> {
    sqlx::query_as::<_, DiaryDay>(
        r#"
        SELECT id, date, phe, kcal, log
        FROM diary_days
        WHERE user_id = $1
        ORDER BY date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn count_days(conn: &mut PgConnection, user_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM diary_days WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(conn)
        .await
}

/// Loads a day and locks its row until the surrounding transaction ends.
pub async fn find_day_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
) -> sqlx::Result<Option<DiaryDay>> {
    sqlx::query_as::<_, DiaryDay>(
        r#"
        SELECT id, date, phe, kcal, log
        FROM diary_days
        WHERE id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn find_day_by_date_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    date: &str,
) -> sqlx::Result<Option<DiaryDay>> {
    sqlx::query_as::<_, DiaryDay>(
        r#"
        SELECT id, date, phe, kcal, log
        FROM diary_days
        WHERE user_id = $1 AND date = $2
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(conn)
    .await
}

/// Whether a day other than `except` already uses `date`.
pub async fn date_taken(
    conn: &mut PgConnection,
    user_id: Uuid,
    date: &str,
    except: Option<Uuid>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM diary_days
            WHERE user_id = $1 AND date = $2 AND ($3::uuid IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(except)
    .fetch_one(conn)
    .await
}

pub async fn insert_day(
    conn: &mut PgConnection,
    user_id: Uuid,
    date: &str,
    log: Vec<LogItem>,
) -> sqlx::Result<DiaryDay> {
    let sum = totals(&log);
    sqlx::query_as::<_, DiaryDay>(
        r#"
        INSERT INTO diary_days (user_id, date, phe, kcal, log)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, date, phe, kcal, log
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(sum.phe)
    .bind(sum.kcal)
    .bind(Json(log))
    .fetch_one(conn)
    .await
}

/// Writes date and log back, recomputing the stored totals from the log.
pub async fn save_day(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
    date: &str,
    log: Vec<LogItem>,
) -> sqlx::Result<DiaryDay> {
    let sum = totals(&log);
    sqlx::query_as::<_, DiaryDay>(
        r#"
        UPDATE diary_days
        SET date = $3, log = $4, phe = $5, kcal = $6, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING id, date, phe, kcal, log
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(date)
    .bind(Json(log))
    .bind(sum.phe)
    .bind(sum.kcal)
    .fetch_one(conn)
    .await
}

pub async fn delete_day(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM diary_days WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_all_days(db: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM diary_days WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
