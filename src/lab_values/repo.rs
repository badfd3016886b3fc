use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::dto::LabValueData;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LabValue {
    #[serde(rename = "key")]
    pub id: Uuid,
    pub date: String,
    pub phe: Option<f64>,
    pub tyrosine: Option<f64>,
}

pub async fn list(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<LabValue>> {
    sqlx::query_as::<_, LabValue>(
        r#"
        SELECT id, date, phe, tyrosine
        FROM lab_values
        WHERE user_id = $1
        ORDER BY date DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<Option<LabValue>> {
    sqlx::query_as::<_, LabValue>(
        "SELECT id, date, phe, tyrosine FROM lab_values WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Whether an entry other than `except` already uses `date`.
pub async fn date_taken(
    db: &PgPool,
    user_id: Uuid,
    date: &str,
    except: Option<Uuid>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM lab_values
            WHERE user_id = $1 AND date = $2 AND ($3::uuid IS NULL OR id <> $3)
        )
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(except)
    .fetch_one(db)
    .await
}

pub async fn insert(db: &PgPool, user_id: Uuid, data: &LabValueData) -> sqlx::Result<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO lab_values (user_id, date, phe, tyrosine)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&data.date)
    .bind(data.phe)
    .bind(data.tyrosine)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    data: &LabValueData,
) -> sqlx::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE lab_values
        SET date = $3, phe = $4, tyrosine = $5, updated_at = now()
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&data.date)
    .bind(data.phe)
    .bind(data.tyrosine)
    .execute(db)
    .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM lab_values WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_all(db: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM lab_values WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
