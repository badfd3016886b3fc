use serde::Serialize;
use sqlx::{types::Json, FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    dto::UpdateSettingsRequest,
    services::{Consent, ConsentEvent},
};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub max_phe: Option<f64>,
    pub max_kcal: Option<f64>,
    pub lab_unit: String,
    pub license: Option<String>,
    pub health_data_consent: bool,
    pub health_data_consent_date: Option<String>,
    pub health_data_consent_history: Json<Vec<ConsentEvent>>,
    pub email_consent: bool,
    pub email_consent_date: Option<String>,
    pub email_consent_history: Json<Vec<ConsentEvent>>,
    pub getting_started_completed: bool,
    #[serde(skip)]
    pub estimation_count: i32,
    #[serde(skip)]
    pub estimation_date: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_phe: None,
            max_kcal: None,
            lab_unit: "mgdl".into(),
            license: None,
            health_data_consent: false,
            health_data_consent_date: None,
            health_data_consent_history: Json(Vec::new()),
            email_consent: false,
            email_consent_date: None,
            email_consent_history: Json(Vec::new()),
            getting_started_completed: false,
            estimation_count: 0,
            estimation_date: None,
        }
    }
}

impl Settings {
    pub fn health_data(&self) -> Consent {
        Consent {
            granted: self.health_data_consent,
            date: self.health_data_consent_date.clone(),
            history: self.health_data_consent_history.0.clone(),
        }
    }

    pub fn email(&self) -> Consent {
        Consent {
            granted: self.email_consent,
            date: self.email_consent_date.clone(),
            history: self.email_consent_history.0.clone(),
        }
    }
}

const COLUMNS: &str = "max_phe, max_kcal, lab_unit, license, \
                       health_data_consent, health_data_consent_date, health_data_consent_history, \
                       email_consent, email_consent_date, email_consent_history, \
                       getting_started_completed, estimation_count, estimation_date";

pub async fn find(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Settings>> {
    let sql = format!("SELECT {COLUMNS} FROM settings WHERE user_id = $1");
    sqlx::query_as::<_, Settings>(&sql)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn license_of(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<String>> {
    let license = sqlx::query_scalar::<_, Option<String>>(
        "SELECT license FROM settings WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(license.flatten())
}

/// Creates the row if missing, then locks and returns it.
pub async fn lock(conn: &mut PgConnection, user_id: Uuid) -> sqlx::Result<Settings> {
    sqlx::query("INSERT INTO settings (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let sql = format!("SELECT {COLUMNS} FROM settings WHERE user_id = $1 FOR UPDATE");
    sqlx::query_as::<_, Settings>(&sql)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
}

/// Writes only the fields present in the request.
pub async fn update(
    conn: &mut PgConnection,
    user_id: Uuid,
    req: &UpdateSettingsRequest,
) -> sqlx::Result<()> {
    let mut qb = QueryBuilder::<Postgres>::new("UPDATE settings SET updated_at = now()");
    if let Some(max_phe) = req.max_phe {
        qb.push(", max_phe = ").push_bind(max_phe);
    }
    if let Some(max_kcal) = req.max_kcal {
        qb.push(", max_kcal = ").push_bind(max_kcal);
    }
    if let Some(unit) = req.lab_unit {
        qb.push(", lab_unit = ").push_bind(unit.as_str());
    }
    if let Some(license) = &req.license {
        qb.push(", license = ").push_bind(license.clone());
    }
    qb.push(" WHERE user_id = ").push_bind(user_id);
    qb.build().execute(conn).await?;
    Ok(())
}

pub async fn save_consent(
    conn: &mut PgConnection,
    user_id: Uuid,
    health_data: &Consent,
    email: &Consent,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE settings
        SET health_data_consent = $2, health_data_consent_date = $3, health_data_consent_history = $4,
            email_consent = $5, email_consent_date = $6, email_consent_history = $7,
            updated_at = now()
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(health_data.granted)
    .bind(&health_data.date)
    .bind(Json(&health_data.history))
    .bind(email.granted)
    .bind(&email.date)
    .bind(Json(&email.history))
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_getting_started(db: &PgPool, user_id: Uuid, completed: bool) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (user_id, getting_started_completed)
        VALUES ($1, $2)
        ON CONFLICT (user_id)
        DO UPDATE SET getting_started_completed = EXCLUDED.getting_started_completed, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(completed)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn save_estimation(
    conn: &mut PgConnection,
    user_id: Uuid,
    count: i32,
    date: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE settings SET estimation_count = $2, estimation_date = $3, updated_at = now() WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(count)
    .bind(date)
    .execute(conn)
    .await?;
    Ok(())
}
