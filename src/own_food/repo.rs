use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::dto::OwnFoodData;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OwnFood {
    #[serde(rename = "key")]
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub phe: f64,
    pub kcal: f64,
    pub note: Option<String>,
    pub shared: bool,
    pub community_food_key: Option<Uuid>,
}

pub async fn list(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<OwnFood>> {
    sqlx::query_as::<_, OwnFood>(
        r#"
        SELECT o.id, o.name, o.icon, o.phe, o.kcal, o.note, o.shared,
               c.id AS community_food_key
        FROM own_foods o
        LEFT JOIN community_foods c ON c.own_food_id = o.id
        WHERE o.user_id = $1
        ORDER BY o.name ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Returns whether the food is currently shared, locking its row.
pub async fn shared_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
) -> sqlx::Result<Option<bool>> {
    sqlx::query_scalar::<_, bool>(
        "SELECT shared FROM own_foods WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

pub async fn insert(
    conn: &mut PgConnection,
    user_id: Uuid,
    data: &OwnFoodData,
) -> sqlx::Result<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO own_foods (user_id, name, icon, phe, kcal, note, shared)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&data.name)
    .bind(&data.icon)
    .bind(data.phe)
    .bind(data.kcal)
    .bind(&data.note)
    .bind(data.shared)
    .fetch_one(conn)
    .await
}

pub async fn update(
    conn: &mut PgConnection,
    user_id: Uuid,
    id: Uuid,
    data: &OwnFoodData,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE own_foods
        SET name = $3, icon = $4, phe = $5, kcal = $6, note = $7, shared = $8, updated_at = now()
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&data.name)
    .bind(&data.icon)
    .bind(data.phe)
    .bind(data.kcal)
    .bind(&data.note)
    .bind(data.shared)
    .execute(conn)
    .await?;
    Ok(())
}

/// Deletes the food; its community copy goes with it via `ON DELETE CASCADE`.
pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM own_foods WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn delete_all(db: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM own_foods WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
