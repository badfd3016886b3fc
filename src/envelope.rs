//! Success envelopes shared by most handlers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{is_unique_violation, ApiError},
    validation::{Issues, Validate},
};

pub const DUPLICATE_DATE_MESSAGE: &str =
    "An entry with this date already exists. Please edit the existing entry instead.";

#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct KeyAck {
    pub success: bool,
    pub key: Uuid,
}

impl KeyAck {
    pub fn new(key: Uuid) -> Self {
        Self { success: true, key }
    }
}

/// Maps the per-user unique date constraint to the 409 clients expect.
pub fn duplicate_date(e: sqlx::Error) -> ApiError {
    if is_unique_violation(&e) {
        ApiError::Conflict(DUPLICATE_DATE_MESSAGE.into())
    } else {
        e.into()
    }
}

/// `{entryKey}` body of the delete endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryKeyRequest {
    #[serde(default)]
    pub entry_key: String,
}

impl Validate for EntryKeyRequest {
    fn validate(&self, _issues: &mut Issues) {}
}

/// Parses a record key sent by the client. A key that is not a UUID cannot
/// name an existing record, so it is reported as `not_found`.
pub fn parse_key(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("Entry key is required".into()));
    }
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(not_found.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn parse_key_outcomes() {
        let id = Uuid::new_v4();
        assert_eq!(parse_key(&id.to_string(), "x").unwrap(), id);
        assert_eq!(
            parse_key("  ", "x").unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
        let err = parse_key("-NxYz123", "Diary entry not found").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Diary entry not found");
    }

    #[test]
    fn key_ack_shape() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(KeyAck::new(id)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["key"], id.to_string());
    }
}
