use serde::Serialize;

use super::dietary::DietaryCompatibilityFilter;
use super::scoring::MatchScorer;
use crate::menu::MenuItem;
use crate::profile::UserProfile;

/// Most recommendations returned for one menu.
pub const MAX_RECOMMENDATIONS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
    pub item: MenuItem,
    pub score: f64,
}

/// Human-readable reasons behind a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub score: f64,
    pub factors: Vec<String>,
}

/// Filter, score, sort and cut a menu down to the best few items.
#[derive(Debug, Clone)]
pub struct RecommendationSelector {
    filter: DietaryCompatibilityFilter,
    scorer: MatchScorer,
    limit: usize,
}

impl RecommendationSelector {
    pub fn new(filter: DietaryCompatibilityFilter, scorer: MatchScorer) -> Self {
        Self {
            filter,
            scorer,
            limit: MAX_RECOMMENDATIONS,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn filter(&self) -> &DietaryCompatibilityFilter {
        &self.filter
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// A copy whose scorer prices luxury against the mean price of
    /// `candidates`. Falls back to the current reference when none are priced.
    pub fn for_candidates(&self, candidates: &[MenuItem]) -> Self {
        let mut selector = self.clone();
        selector.scorer = selector
            .scorer
            .with_reference_price(average_price(candidates));
        selector
    }

    /// Compatible items, best first. Ties keep menu order.
    pub fn select(&self, items: Vec<MenuItem>, profile: &UserProfile) -> Vec<ScoredItem> {
        let candidates = self.filter.filter(items, &profile.dietary_tags);
        let scorer = self.for_candidates(&candidates).scorer;

        let mut scored: Vec<ScoredItem> = candidates
            .into_iter()
            .map(|item| {
                let score = scorer.score(&item, profile);
                ScoredItem { item, score }
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.limit);

        tracing::debug!(
            returned = scored.len(),
            top_score = scored.first().map(|s| s.score),
            "Scored menu items"
        );
        scored
    }

    /// Reasons behind `score`. Factors come from this selector's scorer, so
    /// explain with the same selector that produced the score.
    pub fn explain(&self, item: &MenuItem, score: f64, profile: &UserProfile) -> Explanation {
        let breakdown = self.scorer.breakdown(item, profile);
        let mut factors = Vec::new();

        if breakdown.flavor > 0.7 {
            factors.push("Excellent flavor alignment".to_string());
        } else if breakdown.flavor > 0.5 {
            factors.push("Good flavor alignment".to_string());
        }

        if breakdown.philosophy > 0.5 {
            factors.push("Fits your food philosophy".to_string());
        }

        if self.filter.is_compatible(item, &profile.dietary_tags) {
            factors.push("Meets dietary requirements".to_string());
        }

        let text = item.search_text();
        for cuisine in &profile.favorite_cuisines {
            let needle = cuisine.trim().to_lowercase();
            if !needle.is_empty() && text.contains(&needle) {
                factors.push(format!("Favorite cuisine: {}", cuisine.trim()));
            }
        }
        for dish in &profile.favorite_dishes {
            let needle = dish.trim().to_lowercase();
            if !needle.is_empty() && text.contains(&needle) {
                factors.push(format!("Similar to favorite dish: {}", dish.trim()));
            }
        }

        Explanation { score, factors }
    }
}

impl Default for RecommendationSelector {
    fn default() -> Self {
        Self::new(DietaryCompatibilityFilter::default(), MatchScorer::default())
    }
}

/// Mean of the positive prices, or 0 when none are known.
fn average_price(items: &[MenuItem]) -> f64 {
    let prices: Vec<f64> = items
        .iter()
        .map(|item| item.price)
        .filter(|price| price.is_finite() && *price > 0.0)
        .collect();
    if prices.is_empty() {
        return 0.0;
    }
    prices.iter().sum::<f64>() / prices.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{DietaryTag, FlavorEstimate, MenuCategory, TasteVector};

    fn selector() -> RecommendationSelector {
        RecommendationSelector::new(DietaryCompatibilityFilter::default(), MatchScorer::new())
    }

    fn dish(name: &str, sweetness: f64) -> MenuItem {
        MenuItem::new(name, MenuCategory::MainCourse)
            .with_flavors(FlavorEstimate::new().with("Sweetness", sweetness))
    }

    fn sweet_tooth() -> UserProfile {
        UserProfile::new("sweet@example.com")
            .with_taste_vector(TasteVector::neutral().with("Sweetness", 100.0))
    }

    #[test]
    fn test_select_orders_by_score_and_caps() {
        let items: Vec<MenuItem> = (0..10)
            .map(|i| dish(&format!("dish-{i}"), i as f64 * 10.0))
            .collect();

        let picked = selector().select(items, &sweet_tooth());
        assert_eq!(picked.len(), MAX_RECOMMENDATIONS);
        assert_eq!(picked[0].item.name_translated, "dish-9");
        assert!(picked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_select_is_stable_for_ties() {
        let items = vec![dish("first", 40.0), dish("second", 40.0), dish("third", 40.0)];
        let picked = selector().select(items, &sweet_tooth());
        let names: Vec<&str> = picked.iter().map(|s| s.item.name_translated.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_select_drops_incompatible_items() {
        let profile = sweet_tooth().with_dietary_tags([DietaryTag::Vegetarian]);
        let items = vec![
            dish("Beef stew", 90.0).with_ingredients(["beef", "carrot"]),
            dish("Lentil stew", 20.0).with_ingredients(["lentils", "carrot"]),
        ];

        let picked = selector().select(items, &profile);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].item.name_translated, "Lentil stew");
    }

    #[test]
    fn test_select_empty_menu() {
        assert!(selector().select(Vec::new(), &sweet_tooth()).is_empty());
    }

    #[test]
    fn test_custom_limit() {
        let items: Vec<MenuItem> = (0..4).map(|i| dish(&format!("d{i}"), 50.0)).collect();
        let picked = selector().with_limit(2).select(items, &sweet_tooth());
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_average_price_ignores_unknown() {
        let items = vec![
            dish("a", 0.0).with_price(10.0, "USD"),
            dish("b", 0.0),
            dish("c", 0.0).with_price(30.0, "USD"),
        ];
        assert_eq!(average_price(&items), 20.0);
        assert_eq!(average_price(&[]), 0.0);
    }

    #[test]
    fn test_explain_lists_factors() {
        let profile = sweet_tooth()
            .with_dietary_tags([DietaryTag::Vegetarian])
            .with_philosophy("I eat healthy")
            .with_favorite_cuisines(["Thai"])
            .with_favorite_dishes(["Mango sticky rice"]);
        let item = MenuItem::new("Mango sticky rice", MenuCategory::Dessert)
            .with_description("Fresh mango over Thai coconut rice")
            .with_flavors(FlavorEstimate::new().with("Sweetness", 90.0));

        let explanation = selector().explain(&item, 0.93, &profile);
        assert_eq!(explanation.score, 0.93);
        assert_eq!(
            explanation.factors,
            vec![
                "Excellent flavor alignment".to_string(),
                "Fits your food philosophy".to_string(),
                "Meets dietary requirements".to_string(),
                "Favorite cuisine: Thai".to_string(),
                "Similar to favorite dish: Mango sticky rice".to_string(),
            ]
        );
    }

    #[test]
    fn test_explain_without_signals() {
        let profile = UserProfile::new("plain@example.com");
        let item = MenuItem::new("Bread", MenuCategory::Side);
        let explanation = selector().explain(&item, 0.5, &profile);
        assert_eq!(explanation.factors, vec!["Meets dietary requirements".to_string()]);
    }

    #[test]
    fn test_explain_skips_dietary_factor_for_incompatible_item() {
        let profile = UserProfile::new("veg@example.com").with_dietary_tags([DietaryTag::Vegan]);
        let item = MenuItem::new("Cheeseburger", MenuCategory::MainCourse)
            .with_ingredients(["beef", "cheese"]);
        let explanation = selector().explain(&item, 0.4, &profile);
        assert!(explanation.factors.is_empty());
    }

    #[test]
    fn test_luxury_factor_uses_candidate_prices() {
        let profile = UserProfile::new("lux@example.com").with_philosophy("I love luxury dining");
        let items = vec![
            MenuItem::new("Steak", MenuCategory::MainCourse).with_price(28.0, "USD"),
            MenuItem::new("Fries", MenuCategory::Side).with_price(4.0, "USD"),
        ];

        let selector = selector().for_candidates(&items);
        assert_eq!(selector.scorer().reference_price(), 16.0);

        let picked = selector.select(items, &profile);
        assert_eq!(picked[0].item.name_translated, "Steak");
        let explanation = selector.explain(&picked[0].item, picked[0].score, &profile);
        assert_eq!(explanation.score, picked[0].score);
        assert!(explanation
            .factors
            .contains(&"Fits your food philosophy".to_string()));
    }
}
