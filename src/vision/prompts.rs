//! Instruction text sent to the vision-language model.

use serde_json::json;

use crate::menu::{DietaryTag, MenuItem, FLAVOR_DIMENSIONS};
use crate::profile::UserProfile;

pub const EXTRACTION_SYSTEM: &str = "You are an expert at reading restaurant menus from photos. \
You transcribe every dish exactly as printed, translate it into English, and estimate how it \
tastes. You respond with a single JSON object and nothing else.";

pub const RANKING_SYSTEM: &str = "You are a sommelier-like food advisor. Given a diner's taste \
profile and a list of dishes, you pick the dishes they will enjoy most and explain why in one \
sentence each. You respond with a single JSON object and nothing else.";

/// User turn for extraction; lists the flavor dimensions and dietary vocabulary
/// the payload should use.
pub fn extraction_instruction() -> String {
    let dimensions = FLAVOR_DIMENSIONS.join(", ");
    let tags: Vec<&str> = DietaryTag::vocabulary().map(DietaryTag::label).collect();

    format!(
        r#"Extract every dish on this menu. Return JSON shaped exactly like:
{{"menu_items": [{{
  "name_original": "name as printed",
  "name_translated": "English name",
  "description_original": "description as printed, or empty",
  "description_translated": "English description, or empty",
  "price": 12.5,
  "currency": "ISO 4217 code, e.g. EUR",
  "category": "appetizer | soup | salad | main_course | side | dessert | beverage | other",
  "ingredients": ["..."],
  "preparation_methods": ["grilled", "..."],
  "dietary_tags": ["..."],
  "estimated_flavors": {{"Sweetness": 0-100, "...": 0-100}}
}}]}}

Flavor dimensions: {dimensions}.
Dietary tags (use only these): {tags}.
Use null for a price that is not shown. Do not invent dishes."#,
        tags = tags.join(", ")
    )
}

/// User turn for ranking: the candidates with their ids, then the profile.
pub fn ranking_instruction(items: &[MenuItem], profile: &UserProfile, limit: usize) -> String {
    let candidates: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            json!({
                "item_id": item.id,
                "name": item.name_translated,
                "description": item.description_translated,
                "category": item.category,
                "price": item.price,
                "currency": item.currency,
                "ingredients": item.ingredients,
                "dietary_tags": item.dietary_tags,
                "estimated_flavors": item.estimated_flavors,
            })
        })
        .collect();

    let diner = json!({
        "taste_preferences": profile.taste_vector,
        "dietary_tags": profile.dietary_tags,
        "food_philosophy": profile.philosophy(),
        "favorite_cuisines": profile.favorite_cuisines,
        "favorite_dishes": profile.favorite_dishes,
    });

    format!(
        r#"Diner profile:
{diner}

Dishes:
{dishes}

Pick at most {limit} dishes, best first. Only use item_id values from the list above. Return JSON:
{{"recommendations": [{{"item_id": "...", "match_score": 0.0-1.0, "reasoning": "one sentence", "drink_pairing": "optional"}}]}}"#,
        diner = diner,
        dishes = serde_json::Value::Array(candidates),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuCategory;

    #[test]
    fn test_extraction_instruction_lists_vocabulary() {
        let text = extraction_instruction();
        assert!(text.contains("\"menu_items\""));
        assert!(text.contains("Herbaceousness"));
        assert!(text.contains("Gluten-free"));
    }

    #[test]
    fn test_ranking_instruction_carries_ids() {
        let item = MenuItem::new("Ramen", MenuCategory::MainCourse);
        let profile = UserProfile::new("r@example.com").with_philosophy("slurp everything");
        let text = ranking_instruction(std::slice::from_ref(&item), &profile, 6);
        assert!(text.contains(&item.id.to_string()));
        assert!(text.contains("slurp everything"));
        assert!(text.contains("at most 6"));
    }
}
