use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    dto::Language,
    services::{Tally, Vote, COMMUNITY_FOOD_HIDE_THRESHOLD},
};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommunityFood {
    #[serde(rename = "key")]
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub phe: f64,
    pub kcal: f64,
    pub note: Option<String>,
    pub language: String,
    pub contributor_id: Uuid,
    #[serde(rename = "ownFoodKey")]
    pub own_food_id: Uuid,
    pub likes: i32,
    pub dislikes: i32,
    pub score: i32,
    pub usage_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CommunityFood {
    pub fn tally(&self) -> Tally {
        Tally {
            likes: self.likes,
            dislikes: self.dislikes,
        }
    }
}

/// Fields copied from an own food when it is shared.
#[derive(Debug, Clone, Copy)]
pub struct SharedFields<'a> {
    pub name: &'a str,
    pub icon: Option<&'a str>,
    pub phe: f64,
    pub kcal: f64,
    pub note: Option<&'a str>,
}

const COLUMNS: &str = "id, name, icon, phe, kcal, note, language, contributor_id, own_food_id, \
                       likes, dislikes, score, usage_count, created_at, updated_at";

pub async fn list(
    db: &PgPool,
    language: Option<Language>,
    include_hidden: bool,
) -> sqlx::Result<Vec<CommunityFood>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM community_foods
        WHERE ($1::text IS NULL OR language = $1)
          AND ($2 OR score >= $3)
        ORDER BY score DESC, usage_count DESC, name ASC
        "#
    );
    sqlx::query_as::<_, CommunityFood>(&sql)
        .bind(language.map(Language::as_str))
        .bind(include_hidden)
        .bind(COMMUNITY_FOOD_HIDE_THRESHOLD)
        .fetch_all(db)
        .await
}

pub async fn find_for_update(
    conn: &mut PgConnection,
    id: Uuid,
) -> sqlx::Result<Option<CommunityFood>> {
    let sql = format!("SELECT {COLUMNS} FROM community_foods WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, CommunityFood>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn vote_of(
    conn: &mut PgConnection,
    food_id: Uuid,
    voter_id: Uuid,
) -> sqlx::Result<Option<Vote>> {
    let vote = sqlx::query_scalar::<_, i16>(
        "SELECT vote FROM community_votes WHERE community_food_id = $1 AND voter_id = $2",
    )
    .bind(food_id)
    .bind(voter_id)
    .fetch_optional(conn)
    .await?;
    Ok(vote.and_then(|v| Vote::from_value(v.into())))
}

/// Stores the voter's vote, or clears it when `vote` is `None`.
pub async fn store_vote(
    conn: &mut PgConnection,
    food_id: Uuid,
    voter_id: Uuid,
    vote: Option<Vote>,
) -> sqlx::Result<()> {
    match vote {
        Some(vote) => {
            sqlx::query(
                r#"
                INSERT INTO community_votes (community_food_id, voter_id, vote)
                VALUES ($1, $2, $3)
                ON CONFLICT (community_food_id, voter_id) DO UPDATE SET vote = EXCLUDED.vote
                "#,
            )
            .bind(food_id)
            .bind(voter_id)
            .bind(vote.value())
            .execute(conn)
            .await?;
        }
        None => {
            sqlx::query(
                "DELETE FROM community_votes WHERE community_food_id = $1 AND voter_id = $2",
            )
            .bind(food_id)
            .bind(voter_id)
            .execute(conn)
            .await?;
        }
    }
    Ok(())
}

pub async fn save_tally(conn: &mut PgConnection, id: Uuid, tally: Tally) -> sqlx::Result<()> {
    sqlx::query("UPDATE community_foods SET likes = $2, dislikes = $3, score = $4 WHERE id = $1")
        .bind(id)
        .bind(tally.likes)
        .bind(tally.dislikes)
        .bind(tally.score())
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn increment_usage(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("UPDATE community_foods SET usage_count = usage_count + 1 WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn share(
    conn: &mut PgConnection,
    own_food_id: Uuid,
    contributor_id: Uuid,
    fields: SharedFields<'_>,
    language: Language,
) -> sqlx::Result<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO community_foods
            (own_food_id, contributor_id, name, icon, phe, kcal, note, language)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(own_food_id)
    .bind(contributor_id)
    .bind(fields.name)
    .bind(fields.icon)
    .bind(fields.phe)
    .bind(fields.kcal)
    .bind(fields.note)
    .bind(language.as_str())
    .fetch_one(conn)
    .await
}

/// Copies edited fields onto the shared copy, returning its key if one exists.
pub async fn sync_shared(
    conn: &mut PgConnection,
    own_food_id: Uuid,
    fields: SharedFields<'_>,
    language: Option<Language>,
) -> sqlx::Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE community_foods
        SET name = $2, icon = $3, phe = $4, kcal = $5, note = $6,
            language = COALESCE($7, language), updated_at = now()
        WHERE own_food_id = $1
        RETURNING id
        "#,
    )
    .bind(own_food_id)
    .bind(fields.name)
    .bind(fields.icon)
    .bind(fields.phe)
    .bind(fields.kcal)
    .bind(fields.note)
    .bind(language.map(Language::as_str))
    .fetch_optional(conn)
    .await
}

pub async fn unshare(conn: &mut PgConnection, own_food_id: Uuid) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM community_foods WHERE own_food_id = $1")
        .bind(own_food_id)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}
