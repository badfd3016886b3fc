//! Community food database: foods shared from users' own foods, ranked by
//! votes and hidden once their score falls below the threshold.

mod dto;
mod handlers;
pub mod repo;
mod services;

pub use dto::Language;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
