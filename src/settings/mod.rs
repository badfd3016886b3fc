//! Per-user settings: intake limits, lab unit, license key, consent records
//! and data management.

mod dto;
mod handlers;
pub mod repo;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
