//! Wire shapes of the model's JSON answers and their mapping into the domain.
//!
//! The model is not trusted to follow the schema exactly: prices arrive as
//! numbers or as printed strings, lists arrive as `null`, flavor values arrive
//! as strings. Everything here tolerates that and falls back to defaults.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::RankedItem;
use crate::menu::{DietaryTag, FlavorEstimate, MenuCategory, MenuItem, DEFAULT_CURRENCY};
use crate::recommend::NEUTRAL_SCORE;

#[derive(Debug, Deserialize)]
pub struct ExtractionPayload {
    pub menu_items: Vec<RawMenuItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawMenuItem {
    pub name_original: Option<String>,
    pub name_translated: Option<String>,
    pub description_original: Option<String>,
    pub description_translated: Option<String>,
    #[serde(deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub preparation_methods: Option<Vec<String>>,
    pub dietary_tags: Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_flavors")]
    pub estimated_flavors: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct RankingPayload {
    pub recommendations: Vec<RawRanking>,
}

#[derive(Debug, Deserialize)]
pub struct RawRanking {
    #[serde(deserialize_with = "id_string")]
    pub item_id: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub drink_pairing: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl RawMenuItem {
    /// `None` when the item has no name in either language.
    pub fn into_menu_item(self) -> Option<MenuItem> {
        let original = non_blank(self.name_original);
        let translated = non_blank(self.name_translated);
        let (name_original, name_translated) = match (original, translated) {
            (Some(o), Some(t)) => (o, t),
            (Some(o), None) => (o.clone(), o),
            (None, Some(t)) => (t.clone(), t),
            (None, None) => return None,
        };

        let description_translated =
            non_blank(self.description_translated).unwrap_or_default();
        let description_original = non_blank(self.description_original)
            .unwrap_or_else(|| description_translated.clone());

        let currency = non_blank(self.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let mut flavors = FlavorEstimate::new();
        for (dimension, value) in &self.estimated_flavors {
            flavors.insert(dimension, *value);
        }

        let mut item = MenuItem::new(name_translated, MenuCategory::default())
            .with_price(self.price.unwrap_or(0.0), currency)
            .with_ingredients(clean_list(self.ingredients))
            .with_preparation_methods(clean_list(self.preparation_methods))
            .with_dietary_tags(clean_list(self.dietary_tags).into_iter().map(DietaryTag::from))
            .with_flavors(flavors);
        item.name_original = name_original;
        item.description_original = description_original;
        item.description_translated = description_translated;
        item.category = self
            .category
            .as_deref()
            .map(MenuCategory::from_label)
            .unwrap_or_default();
        Some(item)
    }
}

impl ExtractionPayload {
    pub fn into_menu_items(self) -> Vec<MenuItem> {
        let total = self.menu_items.len();
        let items: Vec<MenuItem> = self
            .menu_items
            .into_iter()
            .filter_map(RawMenuItem::into_menu_item)
            .collect();
        if items.len() < total {
            tracing::warn!(
                skipped = total - items.len(),
                "Dropped extracted menu items without a name"
            );
        }
        items
    }
}

fn clean_list(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Model scores above 1 are read as percentages.
fn normalize_score(score: Option<f64>) -> f64 {
    match score {
        Some(s) if s.is_finite() => {
            let s = if s > 1.0 { s / 100.0 } else { s };
            s.clamp(0.0, 1.0)
        }
        _ => NEUTRAL_SCORE,
    }
}

/// Resolve model rankings against the candidates that were sent. Unknown and
/// repeated ids are dropped; model order is kept; at most `limit` survive.
pub fn resolve_rankings(
    payload: RankingPayload,
    candidates: &[MenuItem],
    limit: usize,
) -> Vec<RankedItem> {
    let by_id: BTreeMap<String, &MenuItem> = candidates
        .iter()
        .map(|item| (item.id.to_string(), item))
        .collect();

    let mut seen = HashSet::new();
    let mut ranked = Vec::new();
    for raw in payload.recommendations {
        let key = raw.item_id.trim().to_lowercase();
        let Some(item) = by_id.get(&key) else {
            tracing::debug!(item_id = %raw.item_id, "Model ranked an unknown item; dropping");
            continue;
        };
        if !seen.insert(key) {
            continue;
        }
        ranked.push(RankedItem {
            item: (*item).clone(),
            score: normalize_score(raw.match_score),
            reasoning: non_blank(raw.reasoning).unwrap_or_default(),
            drink_pairing: non_blank(raw.drink_pairing),
        });
        if ranked.len() == limit {
            break;
        }
    }
    ranked
}

/// Parse a printed price such as `12.50`, `"$12.50"` or `"12,50 €"`. When
/// both separators appear, the last one is the decimal mark.
fn parse_price_text(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let normalized = match (digits.rfind('.'), digits.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => digits.replace('.', "").replace(',', "."),
        (Some(_), _) => digits.replace(',', ""),
        (None, _) => digits.replace(',', "."),
    };
    normalized.parse::<f64>().ok()
}

fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value).filter(|p| p.is_finite() && *p >= 0.0))
}

fn lenient_flavors<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .iter()
        .filter_map(|(name, value)| number_from_value(value).map(|v| (name.clone(), v)))
        .collect())
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::decode_payload;

    #[test]
    fn test_extraction_defaults() {
        let text = r#"{"menu_items": [
            {"name_translated": "Grilled octopus", "price": "€18,50", "category": "Starters",
             "ingredients": ["octopus", " ", "lemon"], "dietary_tags": null,
             "estimated_flavors": {"umami": 70, "Smokiness": "55", "Tanginess": "lots"}},
            {"description_translated": "nameless"}
        ]}"#;
        let payload: ExtractionPayload = decode_payload(text).unwrap();
        let items = payload.into_menu_items();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.name_original, "Grilled octopus");
        assert_eq!(item.description_original, "");
        assert_eq!(item.currency, DEFAULT_CURRENCY);
        assert_eq!(item.price, 18.5);
        assert_eq!(item.category, MenuCategory::Appetizer);
        assert_eq!(item.ingredients, vec!["octopus", "lemon"]);
        assert!(item.dietary_tags.is_empty());
        assert_eq!(item.estimated_flavors.get("Umami"), Some(70.0));
        assert_eq!(item.estimated_flavors.get("Smokiness"), Some(55.0));
        assert_eq!(item.estimated_flavors.get("Tanginess"), None);
    }

    #[test]
    fn test_extraction_clamps_flavors_and_keeps_original_text() {
        let text = r#"{"menu_items": [{
            "name_original": "Bœuf bourguignon", "name_translated": "Beef burgundy",
            "description_translated": "Slow braised beef", "currency": "eur",
            "price": 24, "dietary_tags": ["gluten free"],
            "estimated_flavors": {"Richness": 140, "Sweetness": -5}
        }]}"#;
        let payload: ExtractionPayload = decode_payload(text).unwrap();
        let item = payload.into_menu_items().remove(0);
        assert_eq!(item.name_original, "Bœuf bourguignon");
        assert_eq!(item.description_original, "Slow braised beef");
        assert_eq!(item.currency, "EUR");
        assert_eq!(item.dietary_tags, vec![DietaryTag::GlutenFree]);
        assert_eq!(item.estimated_flavors.get("Richness"), Some(100.0));
        assert_eq!(item.estimated_flavors.get("Sweetness"), Some(0.0));
    }

    #[test]
    fn test_extraction_requires_menu_items() {
        assert!(decode_payload::<ExtractionPayload>(r#"{"dishes": []}"#).is_err());
    }

    #[test]
    fn test_price_text() {
        assert_eq!(parse_price_text("$12.50"), Some(12.5));
        assert_eq!(parse_price_text("12,50 €"), Some(12.5));
        assert_eq!(parse_price_text("1,250.00"), Some(1250.0));
        assert_eq!(parse_price_text("1.250,00"), Some(1250.0));
        assert_eq!(parse_price_text("€ 1.250,50"), Some(1250.5));
        assert_eq!(parse_price_text("market price"), None);
    }

    #[test]
    fn test_resolve_rankings() {
        let items: Vec<MenuItem> = (0..8)
            .map(|i| MenuItem::new(format!("dish {i}"), MenuCategory::MainCourse))
            .collect();
        let mut recommendations = vec![
            serde_json::json!({"item_id": "not-a-real-id", "match_score": 0.99}),
            serde_json::json!({"item_id": items[2].id.to_string().to_uppercase(), "match_score": 87,
                                "reasoning": " Smoky ", "drink_pairing": ""}),
            serde_json::json!({"item_id": items[2].id, "match_score": 0.5}),
        ];
        for item in &items {
            recommendations.push(serde_json::json!({"item_id": item.id, "match_score": 0.4}));
        }
        let payload: RankingPayload =
            serde_json::from_value(serde_json::json!({ "recommendations": recommendations }))
                .unwrap();

        let ranked = resolve_rankings(payload, &items, 6);
        assert_eq!(ranked.len(), 6);
        assert_eq!(ranked[0].item.id, items[2].id);
        assert!((ranked[0].score - 0.87).abs() < 1e-9);
        assert_eq!(ranked[0].reasoning, "Smoky");
        assert_eq!(ranked[0].drink_pairing, None);
        let ids: HashSet<_> = ranked.iter().map(|r| r.item.id).collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_normalize_score() {
        assert_eq!(normalize_score(Some(0.3)), 0.3);
        assert_eq!(normalize_score(Some(250.0)), 1.0);
        assert_eq!(normalize_score(Some(-1.0)), 0.0);
        assert_eq!(normalize_score(None), NEUTRAL_SCORE);
    }
}
