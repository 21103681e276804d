//! # Menu Sommelier
//!
//! Turns a photographed restaurant menu into a short, ranked list of dishes
//! for one diner's taste profile.
//!
//! ## Architecture
//!
//! ```text
//! image ──► VisionExtractionClient ──► MenuItem list
//!                 │ (CostGovernor gate, retry, ledger)
//!                 ▼
//! DietaryCompatibilityFilter ──► MatchScorer ──► RecommendationSelector ──► top 6
//! ```
//!
//! ## Modules
//!
//! - [`llm`] - Chat-completion transport, error classification, JSON scraping
//! - [`budget`] - Daily spend ceiling and its persisted ledger
//! - [`vision`] - Governed extraction and model-assisted ranking
//! - [`recommend`] - Local filtering, scoring and selection
//! - [`pipeline`] - End-to-end orchestration
//! - [`api`] - HTTP surface

pub mod api;
pub mod budget;
pub mod config;
pub mod error;
pub mod llm;
pub mod menu;
pub mod pipeline;
pub mod profile;
pub mod recommend;
pub mod vision;

pub use error::MenuError;
pub use menu::{DietaryTag, MenuItem};
pub use pipeline::{MenuPipeline, RankingMode, RecommendOptions, Recommendation};
pub use profile::UserProfile;
