use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::DiaryDay;
use crate::validation::{coerce, Issues, Validate};

pub const MAX_NAME_CHARS: usize = 200;
pub const MAX_NOTE_CHARS: usize = 500;
pub const MAX_WEIGHT_G: f64 = 10_000.0;

/// One food logged on a diary day. Stored verbatim in the day's `log` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(
        default,
        deserialize_with = "coerce::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub phe_reference: Option<f64>,
    #[serde(
        default,
        deserialize_with = "coerce::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub kcal_reference: Option<f64>,
    #[serde(deserialize_with = "coerce::number")]
    pub weight: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub phe: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub kcal: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_food_key: Option<Uuid>,
}

impl Validate for LogItem {
    fn validate(&self, issues: &mut Issues) {
        issues.check(!self.name.trim().is_empty(), "name", "Food name is required");
        issues.max_chars(&self.name, MAX_NAME_CHARS, "name", "Food name is too long");
        if let Some(v) = self.phe_reference {
            issues.non_negative(v, "pheReference", "Phe reference must be non-negative");
        }
        if let Some(v) = self.kcal_reference {
            issues.non_negative(v, "kcalReference", "Kcal reference must be non-negative");
        }
        issues.positive(self.weight, "weight", "Weight must be a positive number");
        issues.check(self.weight <= MAX_WEIGHT_G, "weight", "Weight is too large");
        issues.non_negative(self.phe, "phe", "Phe value must be non-negative");
        issues.non_negative(self.kcal, "kcal", "Kcal value must be non-negative");
        if let Some(note) = &self.note {
            issues.max_chars(note, MAX_NOTE_CHARS, "note", "Note is too long");
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateDayRequest {
    pub date: String,
    #[serde(deserialize_with = "coerce::number")]
    pub phe: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub kcal: f64,
}

impl Validate for CreateDayRequest {
    fn validate(&self, issues: &mut Issues) {
        issues.iso_date(&self.date, "date");
        issues.non_negative(self.phe, "phe", "Phe value must be non-negative");
        issues.non_negative(self.kcal, "kcal", "Kcal value must be non-negative");
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDayRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(deserialize_with = "coerce::number")]
    pub phe: f64,
    #[serde(deserialize_with = "coerce::number")]
    pub kcal: f64,
    #[serde(default)]
    pub log: Option<Vec<LogItem>>,
}

impl Validate for UpdateDayRequest {
    fn validate(&self, issues: &mut Issues) {
        if let Some(date) = &self.date {
            issues.iso_date(date, "date");
        }
        issues.non_negative(self.phe, "phe", "Phe value must be non-negative");
        issues.non_negative(self.kcal, "kcal", "Kcal value must be non-negative");
        for (i, item) in self.log.iter().flatten().enumerate() {
            issues.nested(&format!("log.{i}"), item);
        }
    }
}

/// A log item plus the day it belongs to (today when omitted).
#[derive(Debug, Deserialize)]
pub struct AddFoodItemRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(flatten)]
    pub item: LogItem,
}

impl Validate for AddFoodItemRequest {
    fn validate(&self, issues: &mut Issues) {
        if let Some(date) = &self.date {
            issues.iso_date(date, "date");
        }
        self.item.validate(issues);
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodItemRequest {
    pub log_index: i64,
    pub entry: LogItem,
}

impl Validate for UpdateFoodItemRequest {
    fn validate(&self, issues: &mut Issues) {
        issues.check(self.log_index >= 0, "logIndex", "Log index must be non-negative");
        issues.nested("entry", &self.entry);
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFoodItemRequest {
    pub log_index: i64,
}

impl Validate for DeleteFoodItemRequest {
    fn validate(&self, issues: &mut Issues) {
        issues.check(self.log_index >= 0, "logIndex", "Valid log index is required");
    }
}

#[derive(Debug, Serialize)]
pub struct DaysResponse {
    pub success: bool,
    pub days: Vec<DiaryDay>,
}

#[derive(Debug, Serialize)]
pub struct DayWriteResponse {
    pub success: bool,
    pub key: Uuid,
    pub updated: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemDeletedResponse {
    pub success: bool,
    pub key: Uuid,
    pub deleted_log_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn item_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Apple",
            "emoji": "🍎",
            "pheReference": 12,
            "kcalReference": "52",
            "weight": 150,
            "phe": 18,
            "kcal": 78
        })
    }

    #[test]
    fn log_item_parses_and_skips_absent_optionals() {
        let item: LogItem = serde_json::from_value(item_json()).unwrap();
        assert_eq!(item.kcal_reference, Some(52.0));
        assert!(validate(&item).is_ok());

        let back = serde_json::to_value(&item).unwrap();
        assert!(back.get("note").is_none());
        assert!(back.get("communityFoodKey").is_none());
        assert_eq!(back["pheReference"], 12.0);
    }

    #[test]
    fn blank_item_name_is_rejected() {
        let mut json = item_json();
        json["name"] = "  ".into();
        let item: LogItem = serde_json::from_value(json).unwrap();
        assert_eq!(
            validate(&item).unwrap_err().to_string(),
            "Validation failed: name: Food name is required"
        );
    }

    #[test]
    fn log_item_rejects_bad_values() {
        let mut json = item_json();
        json["name"] = "".into();
        json["weight"] = 0.into();
        json["kcal"] = (-1).into();
        let item: LogItem = serde_json::from_value(json).unwrap();
        let err = validate(&item).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: name: Food name is required, weight: Weight must be a positive number, kcal: Kcal value must be non-negative"
        );
    }

    #[test]
    fn weight_upper_bound() {
        let mut json = item_json();
        json["weight"] = 10_001.into();
        let item: LogItem = serde_json::from_value(json).unwrap();
        assert!(validate(&item)
            .unwrap_err()
            .to_string()
            .contains("Weight is too large"));
    }

    #[test]
    fn add_food_item_flattens_date() {
        let mut json = item_json();
        json["date"] = "2024-03-01".into();
        json["communityFoodKey"] = uuid::Uuid::nil().to_string().into();
        let req: AddFoodItemRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.date.as_deref(), Some("2024-03-01"));
        assert_eq!(req.item.community_food_key, Some(uuid::Uuid::nil()));
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn update_day_reports_nested_log_paths() {
        let req: UpdateDayRequest = serde_json::from_value(serde_json::json!({
            "date": "2024-13-01",
            "phe": 10,
            "kcal": 10,
            "log": [item_json(), {"name": "x", "weight": -5, "phe": 1, "kcal": 1}]
        }))
        .unwrap();
        let err = validate(&req).unwrap_err().to_string();
        assert!(err.contains("date: Invalid date format"));
        assert!(err.contains("log.1.weight: Weight must be a positive number"));
    }

    #[test]
    fn negative_log_index_is_rejected() {
        let req: DeleteFoodItemRequest =
            serde_json::from_value(serde_json::json!({"logIndex": -1})).unwrap();
        assert_eq!(
            validate(&req).unwrap_err().to_string(),
            "Validation failed: logIndex: Valid log index is required"
        );
    }
}
