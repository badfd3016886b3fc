use serde::{Deserialize, Serialize};

use super::repo::Settings;
use crate::{
    license::Tier,
    validation::{coerce, double_option, Issues, Validate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabUnit {
    Mgdl,
    Umoll,
}

impl LabUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            LabUnit::Mgdl => "mgdl",
            LabUnit::Umoll => "umoll",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub settings: Settings,
    pub tier: Tier,
}

/// Absent fields are left alone; an explicit `null` clears the value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[serde(default, deserialize_with = "coerce::double_opt_number")]
    pub max_phe: Option<Option<f64>>,
    #[serde(default, deserialize_with = "coerce::double_opt_number")]
    pub max_kcal: Option<Option<f64>>,
    #[serde(default)]
    pub lab_unit: Option<LabUnit>,
    #[serde(default, deserialize_with = "double_option")]
    pub license: Option<Option<String>>,
}

impl Validate for UpdateSettingsRequest {
    fn validate(&self, issues: &mut Issues) {
        if let Some(Some(v)) = self.max_phe {
            issues.non_negative(v, "maxPhe", "Max Phe must be non-negative");
        }
        if let Some(Some(v)) = self.max_kcal {
            issues.non_negative(v, "maxKcal", "Max Kcal must be non-negative");
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRequest {
    #[serde(default)]
    pub health_data_consent: Option<bool>,
    #[serde(default)]
    pub email_consent: Option<bool>,
}

impl Validate for ConsentRequest {
    fn validate(&self, _issues: &mut Issues) {}
}

#[derive(Debug, Deserialize)]
pub struct GettingStartedRequest {
    pub completed: bool,
}

impl Validate for GettingStartedRequest {
    fn validate(&self, _issues: &mut Issues) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetType {
    Diary,
    LabValues,
    OwnFood,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(rename = "type")]
    pub kind: ResetType,
}

impl Validate for ResetRequest {
    fn validate(&self, _issues: &mut Issues) {}
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: ResetType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn update_distinguishes_null_from_absent() {
        let req: UpdateSettingsRequest = serde_json::from_value(serde_json::json!({
            "maxPhe": null,
            "maxKcal": "1800",
            "license": null
        }))
        .unwrap();
        assert_eq!(req.max_phe, Some(None));
        assert_eq!(req.max_kcal, Some(Some(1800.0)));
        assert_eq!(req.lab_unit, None);
        assert_eq!(req.license, Some(None));

        let empty: UpdateSettingsRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.max_phe.is_none() && empty.license.is_none());
    }

    #[test]
    fn update_rejects_negative_limits() {
        let req: UpdateSettingsRequest =
            serde_json::from_value(serde_json::json!({"maxPhe": -1, "maxKcal": -2})).unwrap();
        assert_eq!(
            validate(&req).unwrap_err().to_string(),
            "Validation failed: maxPhe: Max Phe must be non-negative, maxKcal: Max Kcal must be non-negative"
        );
    }

    #[test]
    fn lab_unit_accepts_known_units_only() {
        let req: UpdateSettingsRequest =
            serde_json::from_value(serde_json::json!({"labUnit": "umoll"})).unwrap();
        assert_eq!(req.lab_unit, Some(LabUnit::Umoll));
        assert!(serde_json::from_value::<UpdateSettingsRequest>(
            serde_json::json!({"labUnit": "mmol"})
        )
        .is_err());
    }

    #[test]
    fn reset_type_names() {
        let req: ResetRequest =
            serde_json::from_value(serde_json::json!({"type": "labValues"})).unwrap();
        assert_eq!(req.kind, ResetType::LabValues);
        assert!(serde_json::from_value::<ResetRequest>(serde_json::json!({"type": "all"})).is_err());

        let json = serde_json::to_value(ResetResponse {
            success: true,
            kind: ResetType::OwnFood,
        })
        .unwrap();
        assert_eq!(json["type"], "ownFood");
    }

    #[test]
    fn settings_response_flattens_defaults() {
        let json = serde_json::to_value(SettingsResponse {
            success: true,
            settings: Settings::default(),
            tier: Tier::Free,
        })
        .unwrap();
        assert_eq!(json["labUnit"], "mgdl");
        assert_eq!(json["maxPhe"], serde_json::Value::Null);
        assert_eq!(json["healthDataConsentHistory"], serde_json::json!([]));
        assert_eq!(json["tier"], "free");
        assert!(json.get("estimationCount").is_none());
    }
}
