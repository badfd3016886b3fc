use serde::{Deserialize, Serialize};

use super::repo::CommunityFood;
use crate::validation::{Issues, Validate};

/// Language a community food is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Es,
    Fr,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Es => "es",
            Language::Fr => "fr",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityFoodView {
    #[serde(flatten)]
    pub food: CommunityFood,
    pub hidden: bool,
}

impl From<CommunityFood> for CommunityFoodView {
    fn from(food: CommunityFood) -> Self {
        let hidden = super::services::is_hidden(food.score);
        Self { food, hidden }
    }
}

#[derive(Debug, Serialize)]
pub struct CommunityFoodsResponse {
    pub success: bool,
    pub foods: Vec<CommunityFoodView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub community_food_key: String,
    pub vote: i64,
}

impl Validate for VoteRequest {
    fn validate(&self, issues: &mut Issues) {
        issues.check(
            !self.community_food_key.trim().is_empty(),
            "communityFoodKey",
            "Community food key is required",
        );
        issues.check(
            self.vote == 1 || self.vote == -1,
            "vote",
            "Vote must be 1 or -1",
        );
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub likes: i32,
    pub dislikes: i32,
    pub score: i32,
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    #[test]
    fn vote_request_accepts_only_plus_minus_one() {
        let ok: VoteRequest =
            serde_json::from_value(serde_json::json!({"communityFoodKey": "abc", "vote": -1}))
                .unwrap();
        assert!(validate(&ok).is_ok());

        let bad: VoteRequest =
            serde_json::from_value(serde_json::json!({"vote": 0})).unwrap();
        assert_eq!(
            validate(&bad).unwrap_err().to_string(),
            "Validation failed: communityFoodKey: Community food key is required, vote: Vote must be 1 or -1"
        );
    }

    #[test]
    fn language_round_trips_lowercase() {
        let lang: Language = serde_json::from_str("\"de\"").unwrap();
        assert_eq!(lang, Language::De);
        assert_eq!(lang.as_str(), "de");
        assert!(serde_json::from_str::<Language>("\"it\"").is_err());
        assert_eq!(Language::default(), Language::En);
    }
}
