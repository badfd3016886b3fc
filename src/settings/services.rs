//! Consent bookkeeping. Each change is appended to a bounded history so the
//! most recent decisions can be shown back to the user.

use serde::{Deserialize, Serialize};

pub const CONSENT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentAction {
    Given,
    Revoked,
}

impl From<bool> for ConsentAction {
    fn from(granted: bool) -> Self {
        if granted {
            ConsentAction::Given
        } else {
            ConsentAction::Revoked
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentEvent {
    pub action: ConsentAction,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentKind {
    HealthData,
    Email,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Consent {
    pub granted: bool,
    pub date: Option<String>,
    pub history: Vec<ConsentEvent>,
}

/// Records a consent decision made `today`.
///
/// An empty history is first seeded with the previous decision when its date
/// is known. Health-data consent always carries a date; e-mail consent loses
/// its date when revoked.
pub fn record_consent(current: Consent, kind: ConsentKind, granted: bool, today: &str) -> Consent {
    let mut history = current.history;
    if history.is_empty() {
        if let Some(date) = current.date {
            history.push(ConsentEvent {
                action: current.granted.into(),
                date,
            });
        }
    }
    history.push(ConsentEvent {
        action: granted.into(),
        date: today.to_string(),
    });
    if history.len() > CONSENT_HISTORY_LIMIT {
        history.drain(..history.len() - CONSENT_HISTORY_LIMIT);
    }

    let date = match kind {
        ConsentKind::Email if !granted => None,
        _ => Some(today.to_string()),
    };
    Consent {
        granted,
        date,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2024-06-01";

    fn event(action: ConsentAction, date: &str) -> ConsentEvent {
        ConsentEvent {
            action,
            date: date.into(),
        }
    }

    #[test]
    fn first_decision_starts_history() {
        let next = record_consent(Consent::default(), ConsentKind::HealthData, true, TODAY);
        assert!(next.granted);
        assert_eq!(next.date.as_deref(), Some(TODAY));
        assert_eq!(next.history, vec![event(ConsentAction::Given, TODAY)]);
    }

    #[test]
    fn legacy_decision_seeds_history() {
        let legacy = Consent {
            granted: true,
            date: Some("2023-01-15".into()),
            history: Vec::new(),
        };
        let next = record_consent(legacy, ConsentKind::HealthData, false, TODAY);
        assert_eq!(
            next.history,
            vec![
                event(ConsentAction::Given, "2023-01-15"),
                event(ConsentAction::Revoked, TODAY),
            ]
        );
        assert_eq!(next.date.as_deref(), Some(TODAY));
    }

    #[test]
    fn existing_history_is_not_reseeded() {
        let current = Consent {
            granted: true,
            date: Some("2024-05-01".into()),
            history: vec![event(ConsentAction::Given, "2024-05-01")],
        };
        let next = record_consent(current, ConsentKind::Email, true, TODAY);
        assert_eq!(next.history.len(), 2);
    }

    #[test]
    fn history_keeps_last_ten() {
        let history = (1..=10)
            .map(|d| event(ConsentAction::Given, &format!("2024-01-{d:02}")))
            .collect();
        let current = Consent {
            granted: true,
            date: Some("2024-01-10".into()),
            history,
        };
        let next = record_consent(current, ConsentKind::HealthData, false, TODAY);
        assert_eq!(next.history.len(), CONSENT_HISTORY_LIMIT);
        assert_eq!(next.history[0].date, "2024-01-02");
        assert_eq!(next.history[9], event(ConsentAction::Revoked, TODAY));
    }

    #[test]
    fn email_revoke_clears_date() {
        let given = record_consent(Consent::default(), ConsentKind::Email, true, TODAY);
        assert_eq!(given.date.as_deref(), Some(TODAY));
        let revoked = record_consent(given, ConsentKind::Email, false, "2024-06-02");
        assert_eq!(revoked.date, None);
        assert_eq!(revoked.history.len(), 2);

        let health = record_consent(Consent::default(), ConsentKind::HealthData, false, TODAY);
        assert_eq!(health.date.as_deref(), Some(TODAY));
    }

    #[test]
    fn history_serializes_lowercase_actions() {
        let json = serde_json::to_value(event(ConsentAction::Revoked, TODAY)).unwrap();
        assert_eq!(json, serde_json::json!({"action": "revoked", "date": TODAY}));
    }
}
