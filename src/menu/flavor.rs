//! Flavor dimensions, user taste vectors and per-item flavor estimates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The twelve dimensions a taste vector always carries.
pub const FLAVOR_DIMENSIONS: [&str; 12] = [
    "Sweetness",
    "Saltiness",
    "Sourness",
    "Bitterness",
    "Umami",
    "Spiciness",
    "Richness",
    "Smokiness",
    "Freshness",
    "Creaminess",
    "Crunchiness",
    "Herbaceousness",
];

pub const SPICINESS: &str = "Spiciness";

/// Taste-vector value for a dimension the user never set.
pub const NEUTRAL_INTENSITY: f64 = 50.0;

pub fn clamp_intensity(value: f64) -> f64 {
    if value.is_nan() {
        return NEUTRAL_INTENSITY;
    }
    value.clamp(0.0, 100.0)
}

/// Canonical spelling for a known dimension (case/whitespace-insensitive);
/// unknown names are kept as given, trimmed.
pub fn canonical_dimension(name: &str) -> String {
    let trimmed = name.trim();
    FLAVOR_DIMENSIONS
        .iter()
        .find(|dim| dim.eq_ignore_ascii_case(trimmed))
        .map(|dim| dim.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Estimated flavor intensity of a menu item, 0–100 per dimension.
///
/// May be empty (the model gave nothing); scoring treats that as neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct FlavorEstimate(BTreeMap<String, f64>);

impl FlavorEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dimension: &str, value: f64) {
        self.0
            .insert(canonical_dimension(dimension), clamp_intensity(value));
    }

    pub fn with(mut self, dimension: &str, value: f64) -> Self {
        self.insert(dimension, value);
        self
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.0.get(dimension).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }
}

impl From<BTreeMap<String, f64>> for FlavorEstimate {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        let mut estimate = Self::new();
        for (dimension, value) in raw {
            estimate.insert(&dimension, value);
        }
        estimate
    }
}

impl From<FlavorEstimate> for BTreeMap<String, f64> {
    fn from(estimate: FlavorEstimate) -> Self {
        estimate.0
    }
}

/// A user's preference per flavor dimension.
///
/// # Invariants
/// - Every entry of [`FLAVOR_DIMENSIONS`] is present (default 50).
/// - Every value is within [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct TasteVector(BTreeMap<String, f64>);

impl TasteVector {
    pub fn neutral() -> Self {
        Self(
            FLAVOR_DIMENSIONS
                .iter()
                .map(|dim| (dim.to_string(), NEUTRAL_INTENSITY))
                .collect(),
        )
    }

    /// Set a known dimension. Unknown names are ignored.
    pub fn set(&mut self, dimension: &str, value: f64) {
        let name = canonical_dimension(dimension);
        if let Some(slot) = self.0.get_mut(&name) {
            *slot = clamp_intensity(value);
        }
    }

    pub fn with(mut self, dimension: &str, value: f64) -> Self {
        self.set(dimension, value);
        self
    }

    pub fn get(&self, dimension: &str) -> f64 {
        self.0
            .get(&canonical_dimension(dimension))
            .copied()
            .unwrap_or(NEUTRAL_INTENSITY)
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.0
    }
}

impl Default for TasteVector {
    fn default() -> Self {
        Self::neutral()
    }
}

impl From<BTreeMap<String, f64>> for TasteVector {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        let mut vector = Self::neutral();
        for (dimension, value) in raw {
            vector.set(&dimension, value);
        }
        vector
    }
}

impl From<TasteVector> for BTreeMap<String, f64> {
    fn from(vector: TasteVector) -> Self {
        vector.0
    }
}
