//! Local recommendation engine: dietary filtering, match scoring and
//! top-N selection. Pure and synchronous; no model calls happen here.

pub mod dietary;
mod scoring;
mod selector;

pub use dietary::{default_rules, DietaryCompatibilityFilter, DietaryRule};
pub use scoring::{
    favorites_affinity, flavor_alignment, MatchScorer, ScoreBreakdown, ScoreWeights,
    DEFAULT_REFERENCE_PRICE, NEUTRAL_SCORE,
};
pub use selector::{Explanation, RecommendationSelector, ScoredItem, MAX_RECOMMENDATIONS};
