//! Foods a user defines for themselves. A shared own food has a copy in the
//! community database that follows its edits and disappears with it.

mod dto;
mod handlers;
pub mod repo;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
