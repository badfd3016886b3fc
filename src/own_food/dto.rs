use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::OwnFood;
use crate::{
    community::{repo::SharedFields, Language},
    validation::{coerce, Issues, Validate},
};

const MAX_NAME_CHARS: usize = 200;
const MAX_NOTE_CHARS: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct OwnFoodData {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(deserialize_with = "coerce::number")]
    pub phe: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub kcal: f64,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub shared: bool,
}

impl OwnFoodData {
    pub fn shared_fields(&self) -> SharedFields<'_> {
        SharedFields {
            name: &self.name,
            icon: self.icon.as_deref(),
            phe: self.phe,
            kcal: self.kcal,
            note: self.note.as_deref(),
        }
    }
}

impl Validate for OwnFoodData {
    fn validate(&self, issues: &mut Issues) {
        issues.check(!self.name.trim().is_empty(), "name", "Food name is required");
        issues.max_chars(&self.name, MAX_NAME_CHARS, "name", "Food name is too long");
        issues.non_negative(self.phe, "phe", "Phe value must be non-negative");
        issues.non_negative(self.kcal, "kcal", "Kcal value must be non-negative");
        if let Some(note) = &self.note {
            issues.max_chars(note, MAX_NOTE_CHARS, "note", "Note is too long");
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveOwnFoodRequest {
    #[serde(flatten)]
    pub data: OwnFoodData,
    #[serde(default)]
    pub locale: Option<Language>,
}

impl Validate for SaveOwnFoodRequest {
    fn validate(&self, issues: &mut Issues) {
        self.data.validate(issues);
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOwnFoodRequest {
    #[serde(default)]
    pub entry_key: String,
    #[serde(default)]
    pub locale: Option<Language>,
    pub data: OwnFoodData,
}

impl Validate for UpdateOwnFoodRequest {
    fn validate(&self, issues: &mut Issues) {
        issues.check(
            !self.entry_key.trim().is_empty(),
            "entryKey",
            "Entry key is required",
        );
        issues.nested("data", &self.data);
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnFoodsResponse {
    pub success: bool,
    pub own_foods: Vec<OwnFood>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnFoodWriteResponse {
    pub success: bool,
    pub key: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_food_key: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn save_reads_locale_and_defaults_shared() {
        let req: SaveOwnFoodRequest = serde_json::from_value(serde_json::json!({
            "name": "Low protein bread",
            "phe": "12",
            "kcal": 240,
            "locale": "fr"
        }))
        .unwrap();
        assert!(!req.data.shared);
        assert_eq!(req.locale, Some(Language::Fr));
        assert_eq!(req.data.phe, 12.0);
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn unknown_locale_is_rejected() {
        let res = serde_json::from_value::<SaveOwnFoodRequest>(serde_json::json!({
            "name": "x", "phe": 1, "kcal": 1, "locale": "pt"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn update_reports_nested_paths() {
        let req: UpdateOwnFoodRequest = serde_json::from_value(serde_json::json!({
            "entryKey": "abc",
            "data": {"name": "", "phe": -1, "kcal": 5, "note": "n".repeat(501)}
        }))
        .unwrap();
        assert_eq!(
            validate(&req).unwrap_err().to_string(),
            "Validation failed: data.name: Food name is required, data.phe: Phe value must be non-negative, data.note: Note is too long"
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        let data: OwnFoodData = serde_json::from_value(serde_json::json!({
            "name": "   ", "phe": 1, "kcal": 1
        }))
        .unwrap();
        assert_eq!(
            validate(&data).unwrap_err().to_string(),
            "Validation failed: name: Food name is required"
        );
    }

    #[test]
    fn shared_fields_borrow_data() {
        let data: OwnFoodData = serde_json::from_value(serde_json::json!({
            "name": "Rice", "icon": "rice", "phe": 1.5, "kcal": 130, "shared": true
        }))
        .unwrap();
        let fields = data.shared_fields();
        assert_eq!(fields.name, "Rice");
        assert_eq!(fields.icon, Some("rice"));
        assert_eq!(fields.note, None);
    }
}
