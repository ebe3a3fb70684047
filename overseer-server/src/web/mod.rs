//! Web layer for the bike-share overseer.
//!
//! Provides JSON endpoints for listing stations and finding the nearest
//! ones.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
