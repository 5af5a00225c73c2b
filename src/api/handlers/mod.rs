//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod animation;
pub mod control;
pub mod sequence;
pub mod system;

use axum::Router;

use crate::app_state::AppState;
use crate::domain::Character;
use crate::error::RelayError;

/// Composes every route that requires the control token.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(control::routes())
        .merge(sequence::routes())
        .merge(animation::routes())
        .merge(admin::routes())
        .merge(system::routes())
}

/// Parses a character name from a path segment or query value.
fn parse_character(raw: &str) -> Result<Character, RelayError> {
    raw.parse().map_err(RelayError::InvalidRequest)
}
