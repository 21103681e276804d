//! HTTP API for the menu sommelier.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/budget` - Today's model spend against the daily ceiling
//! - `POST /api/recommendations` - Menu photo + taste profile in, ranked dishes out

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{router, serve, AppState, RecommendationRequest, RecommendationResponse};
