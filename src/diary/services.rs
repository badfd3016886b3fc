//! Day-level rules. Every mutation produces a new log; totals are always
//! derived from it, never taken from the client.

use super::dto::LogItem;
use crate::{error::ApiError, license::Tier};

pub const MANUAL_ENTRY_NAME: &str = "Manual Entry";
pub const MANUAL_ENTRY_WEIGHT: f64 = 100.0;

pub const DIARY_LIMIT_MESSAGE: &str =
    "Diary limit reached. Upgrade to premium for unlimited entries.";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub phe: f64,
    pub kcal: f64,
}

pub fn totals(log: &[LogItem]) -> Totals {
    log.iter().fold(Totals::default(), |acc, item| Totals {
        phe: acc.phe + item.phe,
        kcal: acc.kcal + item.kcal,
    })
}

/// Stand-in item carrying totals that were entered without itemisation.
pub fn manual_entry(phe: f64, kcal: f64) -> LogItem {
    LogItem {
        name: MANUAL_ENTRY_NAME.to_string(),
        emoji: None,
        icon: None,
        phe_reference: None,
        kcal_reference: None,
        weight: MANUAL_ENTRY_WEIGHT,
        phe,
        kcal,
        note: None,
        community_food_key: None,
    }
}

/// Log for a day created from bare totals.
pub fn initial_log(phe: f64, kcal: f64) -> Vec<LogItem> {
    if phe == 0.0 && kcal == 0.0 {
        Vec::new()
    } else {
        vec![manual_entry(phe, kcal)]
    }
}

/// Log after a day update. A provided log wins; an empty day takes the
/// totals as a manual entry; an itemised day keeps its items.
pub fn updated_log(
    current: Vec<LogItem>,
    provided: Option<Vec<LogItem>>,
    phe: f64,
    kcal: f64,
) -> Vec<LogItem> {
    match provided {
        Some(log) => log,
        None if current.is_empty() => initial_log(phe, kcal),
        None => current,
    }
}

/// Free users may only hold `limit` days. Only consulted when a new day
/// would be created.
pub fn check_day_limit(tier: Tier, existing_days: i64, limit: usize) -> Result<(), ApiError> {
    if !tier.is_premium() && existing_days >= limit as i64 {
        return Err(ApiError::Forbidden(DIARY_LIMIT_MESSAGE.into()));
    }
    Ok(())
}

pub fn replace_item(log: &mut [LogItem], index: i64, item: LogItem) -> Result<(), ApiError> {
    let slot = usize::try_from(index)
        .ok()
        .and_then(|i| log.get_mut(i))
        .ok_or_else(|| ApiError::BadRequest("Log index out of range".into()))?;
    *slot = item;
    Ok(())
}

pub fn remove_item(log: &mut Vec<LogItem>, index: i64) -> Result<LogItem, ApiError> {
    match usize::try_from(index) {
        Ok(i) if i < log.len() => Ok(log.remove(i)),
        _ => Err(ApiError::BadRequest("Invalid log item index".into())),
    }
}
