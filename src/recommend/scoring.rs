//! Match scoring: one item against one profile, always within [0, 1].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::menu::MenuItem;
use crate::profile::UserProfile;

/// Value returned by every sub-score when there is nothing to compare.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Reference price used when no candidate set is available to average.
pub const DEFAULT_REFERENCE_PRICE: f64 = 25.0;

/// Price multiple above the reference that reads as "premium".
const PREMIUM_PRICE_FACTOR: f64 = 1.2;
const PREMIUM_PRICE_BONUS: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub flavor: f64,
    pub philosophy: f64,
    pub favorites: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            flavor: 0.7,
            philosophy: 0.2,
            favorites: 0.1,
        }
    }
}

/// The three sub-scores plus their weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub flavor: f64,
    pub philosophy: f64,
    pub favorites: f64,
    pub total: f64,
}

/// A philosophy keyword family: when the profile's philosophy mentions any
/// trigger, the item is nudged up for `boosts` and down for `penalties`.
struct PhilosophyFamily {
    triggers: &'static [&'static str],
    boosts: &'static [&'static str],
    boost: f64,
    penalties: &'static [&'static str],
    penalty: f64,
    rewards_premium_price: bool,
}

const PHILOSOPHY_FAMILIES: &[PhilosophyFamily] = &[
    // health-oriented
    PhilosophyFamily {
        triggers: &[
            "healthy", "health", "nutritious", "clean eating", "wellness", "balanced", "fitness",
            "wholesome", "light",
        ],
        boosts: &[
            "grilled", "steamed", "fresh", "lean", "salad", "vegetable", "poached", "baked", "raw",
        ],
        boost: 0.3,
        penalties: &["fried", "creamy", "heavy", "butter", "cheese", "bacon", "sugar"],
        penalty: 0.2,
        rewards_premium_price: false,
    },
    // adventurous
    PhilosophyFamily {
        triggers: &[
            "adventurous", "adventure", "exotic", "explore", "bold", "new flavors", "try anything",
            "daring", "curious",
        ],
        boosts: &[
            "exotic", "authentic", "traditional", "fermented", "spicy", "unusual", "regional",
            "street food", "unique",
        ],
        boost: 0.25,
        penalties: &["classic", "plain", "basic", "standard"],
        penalty: 0.1,
        rewards_premium_price: false,
    },
    // simplicity-oriented
    PhilosophyFamily {
        triggers: &[
            "simple", "comfort", "classic", "familiar", "homestyle", "home-style", "no-fuss",
            "minimal",
        ],
        boosts: &["classic", "homemade", "simple", "comfort", "rustic", "home-style"],
        boost: 0.2,
        penalties: &["fusion", "foam", "deconstructed", "molecular", "exotic"],
        penalty: 0.15,
        rewards_premium_price: false,
    },
    // luxury-oriented
    PhilosophyFamily {
        triggers: &[
            "luxury", "luxurious", "fine dining", "gourmet", "indulge", "premium", "splurge",
            "upscale", "decadent",
        ],
        boosts: &["truffle", "caviar", "wagyu", "lobster", "foie gras", "saffron", "aged"],
        boost: 0.15,
        penalties: &[],
        penalty: 0.0,
        rewards_premium_price: true,
    },
];

fn mentions_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}

/// Mean per-dimension similarity `1 - |u - i| / 100` over dimensions present
/// in both maps; neutral when either side is empty or nothing overlaps.
pub fn flavor_alignment(preferences: &BTreeMap<String, f64>, estimate: &BTreeMap<String, f64>) -> f64 {
    let similarities: Vec<f64> = estimate
        .iter()
        .filter_map(|(dimension, item_value)| {
            preferences
                .get(dimension)
                .map(|user_value| 1.0 - (user_value - item_value).abs() / 100.0)
        })
        .collect();

    if similarities.is_empty() {
        return NEUTRAL_SCORE;
    }
    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
    mean.clamp(0.0, 1.0)
}

/// Share of declared favorite cuisines and dishes mentioned in the item's text.
pub fn favorites_affinity(item: &MenuItem, cuisines: &[String], dishes: &[String]) -> f64 {
    let favorites: Vec<String> = cuisines
        .iter()
        .chain(dishes.iter())
        .map(|favorite| favorite.trim().to_lowercase())
        .filter(|favorite| !favorite.is_empty())
        .collect();

    if favorites.is_empty() {
        return NEUTRAL_SCORE;
    }

    let text = item.search_text();
    let matches = favorites
        .iter()
        .filter(|favorite| text.contains(favorite.as_str()))
        .count();
    (matches as f64 / favorites.len() as f64).clamp(0.0, 1.0)
}

/// Deterministic fit between an item and a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchScorer {
    weights: ScoreWeights,
    reference_price: f64,
}

impl MatchScorer {
    pub fn new() -> Self {
        Self {
            weights: ScoreWeights::default(),
            reference_price: DEFAULT_REFERENCE_PRICE,
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Average price that the luxury rule compares against. Non-positive or
    /// non-finite values are ignored.
    pub fn with_reference_price(mut self, price: f64) -> Self {
        if price.is_finite() && price > 0.0 {
            self.reference_price = price;
        }
        self
    }

    pub fn reference_price(&self) -> f64 {
        self.reference_price
    }

    pub fn score(&self, item: &MenuItem, profile: &UserProfile) -> f64 {
        self.breakdown(item, profile).total
    }

    pub fn breakdown(&self, item: &MenuItem, profile: &UserProfile) -> ScoreBreakdown {
        let flavor = flavor_alignment(
            profile.taste_vector.as_map(),
            item.estimated_flavors.as_map(),
        );
        let philosophy = self.philosophy_alignment(item, profile.philosophy());
        let favorites = favorites_affinity(
            item,
            &profile.favorite_cuisines,
            &profile.favorite_dishes,
        );

        let total = self.weights.flavor * flavor
            + self.weights.philosophy * philosophy
            + self.weights.favorites * favorites;

        ScoreBreakdown {
            flavor,
            philosophy,
            favorites,
            total: if total.is_nan() { 0.0 } else { total.clamp(0.0, 1.0) },
        }
    }

    pub fn philosophy_alignment(&self, item: &MenuItem, philosophy: &str) -> f64 {
        let philosophy = philosophy.trim().to_lowercase();
        if philosophy.is_empty() {
            return NEUTRAL_SCORE;
        }

        let mut text = item.search_text();
        for method in &item.preparation_methods {
            text.push(' ');
            text.push_str(&method.to_lowercase());
        }

        let mut score = NEUTRAL_SCORE;
        for family in PHILOSOPHY_FAMILIES {
            if !mentions_any(&philosophy, family.triggers) {
                continue;
            }
            if mentions_any(&text, family.boosts) {
                score += family.boost;
            }
            if mentions_any(&text, family.penalties) {
                score -= family.penalty;
            }
            if family.rewards_premium_price
                && item.price > self.reference_price * PREMIUM_PRICE_FACTOR
            {
                score += PREMIUM_PRICE_BONUS;
            }
        }
        score.clamp(0.0, 1.0)
    }
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new()
    }
}
