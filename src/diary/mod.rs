//! Daily intake diary. One day per user and date, each holding an ordered
//! log of foods whose sums are the day's totals.

mod dto;
mod handlers;
pub mod repo;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
