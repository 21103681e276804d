//! Taste profile record, as owned by the account subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::menu::{DietaryTag, TasteVector};

/// Longest philosophy text kept, in characters.
pub const MAX_PHILOSOPHY_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub taste_vector: TasteVector,
    #[serde(default, deserialize_with = "unique_tags")]
    pub dietary_tags: Vec<DietaryTag>,
    #[serde(default, deserialize_with = "bounded_philosophy")]
    philosophy: String,
    #[serde(default)]
    pub favorite_cuisines: Vec<String>,
    #[serde(default)]
    pub favorite_dishes: Vec<String>,
    #[serde(default)]
    pub favorite_restaurants: Vec<String>,
}

impl UserProfile {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            created_at: Utc::now(),
            taste_vector: TasteVector::neutral(),
            dietary_tags: Vec::new(),
            philosophy: String::new(),
            favorite_cuisines: Vec::new(),
            favorite_dishes: Vec::new(),
            favorite_restaurants: Vec::new(),
        }
    }

    pub fn philosophy(&self) -> &str {
        &self.philosophy
    }

    pub fn set_philosophy(&mut self, text: &str) {
        self.philosophy = truncate_chars(text, MAX_PHILOSOPHY_CHARS);
    }

    pub fn with_philosophy(mut self, text: &str) -> Self {
        self.set_philosophy(text);
        self
    }

    pub fn with_taste_vector(mut self, taste_vector: TasteVector) -> Self {
        self.taste_vector = taste_vector;
        self
    }

    pub fn with_dietary_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DietaryTag>,
    {
        self.dietary_tags = dedup_tags(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_favorite_cuisines<I, S>(mut self, cuisines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorite_cuisines = cuisines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_favorite_dishes<I, S>(mut self, dishes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorite_dishes = dishes.into_iter().map(Into::into).collect();
        self
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn dedup_tags(tags: impl Iterator<Item = DietaryTag>) -> Vec<DietaryTag> {
    let mut unique: Vec<DietaryTag> = Vec::new();
    for tag in tags {
        if !unique.iter().any(|seen| seen.key() == tag.key()) {
            unique.push(tag);
        }
    }
    unique
}

fn bounded_philosophy<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(truncate_chars(&text, MAX_PHILOSOPHY_CHARS))
}

fn unique_tags<'de, D>(deserializer: D) -> Result<Vec<DietaryTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = Option::<Vec<DietaryTag>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(dedup_tags(tags.into_iter()))
}
