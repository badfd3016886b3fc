//! License tiers. The stored license string is compared with the server-held
//! secrets on every request; nothing is cached server-side.

use axum::Router;

use crate::state::AppState;

mod handlers;
mod services;

pub use services::{resolve_tier, tier_for_user, Tier};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
