use serde::{Deserialize, Serialize};

use super::repo::LabValue;
use crate::validation::{coerce, Issues, Validate};

#[derive(Debug, Clone, Deserialize)]
pub struct LabValueData {
    pub date: String,
    #[serde(default, deserialize_with = "coerce::opt_number")]
    pub phe: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_number")]
    pub tyrosine: Option<f64>,
}

impl Validate for LabValueData {
    fn validate(&self, issues: &mut Issues) {
        issues.iso_date(&self.date, "date");
        if let Some(phe) = self.phe {
            issues.positive(phe, "phe", "Phe value must be positive");
        }
        if let Some(tyrosine) = self.tyrosine {
            issues.positive(tyrosine, "tyrosine", "Tyrosine value must be positive");
        }
        issues.check(
            self.phe.is_some() || self.tyrosine.is_some(),
            "phe",
            "Either Phe or Tyrosine must be provided",
        );
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLabValueRequest {
    #[serde(default)]
    pub entry_key: String,
    pub data: LabValueData,
}

impl Validate for UpdateLabValueRequest {
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
pub struct LabValuesResponse {
    pub success: bool,
    pub lab_values: Vec<LabValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn data(json: serde_json::Value) -> LabValueData {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn either_value_is_enough() {
        assert!(validate(&data(serde_json::json!({"date": "2024-02-01", "phe": "6.2"}))).is_ok());
        assert!(validate(&data(serde_json::json!({"date": "2024-02-01", "tyrosine": 1.1}))).is_ok());
    }

    #[test]
    fn one_value_is_required() {
        let err = validate(&data(serde_json::json!({"date": "2024-02-01", "phe": null})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: phe: Either Phe or Tyrosine must be provided"
        );
    }

    #[test]
    fn values_must_be_positive() {
        let err = validate(&data(serde_json::json!({"date": "2024-02-01", "phe": 0, "tyrosine": -1})))
            .unwrap_err()
            .to_string();
        assert!(err.contains("phe: Phe value must be positive"));
        assert!(err.contains("tyrosine: Tyrosine value must be positive"));
    }

    #[test]
    fn update_nests_data_issues() {
        let req: UpdateLabValueRequest = serde_json::from_value(serde_json::json!({
            "data": {"date": "2024-2-1", "phe": 3}
        }))
        .unwrap();
        assert_eq!(
            validate(&req).unwrap_err().to_string(),
            "Validation failed: entryKey: Entry key is required, data.date: Invalid date format"
        );
    }
}
