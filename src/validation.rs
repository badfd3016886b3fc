//! Request validation: field-level issues collected by [`Validate`] impls and
//! the [`ValidatedJson`] extractor that turns them into a 400.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| {
            if i.path.is_empty() {
                i.message.clone()
            } else {
                format!("{}: {}", i.path, i.message)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn push(&mut self, path: &str, message: &str) {
        self.0.push(Issue::new(path, message));
    }

    pub fn check(&mut self, ok: bool, path: &str, message: &str) {
        if !ok {
            self.push(path, message);
        }
    }

    pub fn non_negative(&mut self, value: f64, path: &str, message: &str) {
        self.check(value.is_finite() && value >= 0.0, path, message);
    }

    pub fn positive(&mut self, value: f64, path: &str, message: &str) {
        self.check(value.is_finite() && value > 0.0, path, message);
    }

    pub fn max_chars(&mut self, value: &str, max: usize, path: &str, message: &str) {
        self.check(value.chars().count() <= max, path, message);
    }

    pub fn iso_date(&mut self, value: &str, path: &str) {
        self.check(is_iso_date(value), path, "Invalid date format");
    }

    /// Validates a nested value, prefixing its issue paths with `prefix`.
    pub fn nested<V: Validate + ?Sized>(&mut self, prefix: &str, value: &V) {
        let mut inner = Issues::default();
        value.validate(&mut inner);
        for issue in inner.0 {
            let path = if issue.path.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}.{}", issue.path)
            };
            self.0.push(Issue::new(path, issue.message));
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}

pub trait Validate {
    fn validate(&self, issues: &mut Issues);
}

pub fn validate<V: Validate + ?Sized>(value: &V) -> Result<(), ApiError> {
    let mut issues = Issues::default();
    value.validate(&mut issues);
    issues.finish()
}

/// `YYYY-MM-DD` that is also a real calendar date.
pub fn is_iso_date(value: &str) -> bool {
    lazy_static! {
        static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    DATE_RE.is_match(value) && time::Date::parse(value, crate::clock::DATE_FORMAT).is_ok()
}

/// JSON body that has passed its [`Validate`] impl.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        validate(&value)?;
        Ok(Self(value))
    }
}

/// Serde helpers that accept numbers sent either as JSON numbers or numeric
/// strings, the way HTML form inputs usually arrive.
pub mod coerce {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    fn to_f64<E: de::Error>(value: NumberOrText) -> Result<f64, E> {
        match value {
            NumberOrText::Number(n) => Ok(n),
            NumberOrText::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("expected a number, received \"{s}\""))),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
        to_f64(NumberOrText::deserialize(de)?)
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
        Option::<NumberOrText>::deserialize(de)?
            .map(to_f64)
            .transpose()
    }

    /// Outer `None` = field absent, `Some(None)` = explicit `null`.
    /// Use with `#[serde(default)]`.
    pub fn double_opt_number<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<Option<f64>>, D::Error> {
        opt_number(de).map(Some)
    }
}

/// Outer `None` = field absent, `Some(None)` = explicit `null`.
/// Use with `#[serde(default)]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}
