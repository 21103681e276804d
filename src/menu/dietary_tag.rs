//! Closed dietary-tag vocabulary shared by menu items and profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named restriction or preference.
///
/// Unrecognized labels survive as [`DietaryTag::Other`]; they are never
/// inferred from ingredients, only matched against an item's own tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietaryTag {
    Vegan,
    Vegetarian,
    Pescatarian,
    Flexitarian,
    Halal,
    Kosher,
    GlutenFree,
    DairyFree,
    LactoseFree,
    NutFree,
    PeanutFree,
    ShellfishFree,
    FishFree,
    EggFree,
    SoyFree,
    SesameFree,
    Keto,
    Paleo,
    LowCarb,
    LowFat,
    LowSodium,
    SugarFree,
    HighProtein,
    Whole30,
    LowFodmap,
    Mediterranean,
    DiabetesFriendly,
    HeartHealthy,
    Organic,
    RawFood,
    Other(String),
}

const VOCABULARY: &[(DietaryTag, &str)] = &[
    (DietaryTag::Vegan, "Vegan"),
    (DietaryTag::Vegetarian, "Vegetarian"),
    (DietaryTag::Pescatarian, "Pescatarian"),
    (DietaryTag::Flexitarian, "Flexitarian"),
    (DietaryTag::Halal, "Halal"),
    (DietaryTag::Kosher, "Kosher"),
    (DietaryTag::GlutenFree, "Gluten-free"),
    (DietaryTag::DairyFree, "Dairy-free"),
    (DietaryTag::LactoseFree, "Lactose-free"),
    (DietaryTag::NutFree, "Nut-free"),
    (DietaryTag::PeanutFree, "Peanut-free"),
    (DietaryTag::ShellfishFree, "Shellfish-free"),
    (DietaryTag::FishFree, "Fish-free"),
    (DietaryTag::EggFree, "Egg-free"),
    (DietaryTag::SoyFree, "Soy-free"),
    (DietaryTag::SesameFree, "Sesame-free"),
    (DietaryTag::Keto, "Keto"),
    (DietaryTag::Paleo, "Paleo"),
    (DietaryTag::LowCarb, "Low-carb"),
    (DietaryTag::LowFat, "Low-fat"),
    (DietaryTag::LowSodium, "Low-sodium"),
    (DietaryTag::SugarFree, "Sugar-free"),
    (DietaryTag::HighProtein, "High-protein"),
    (DietaryTag::Whole30, "Whole30"),
    (DietaryTag::LowFodmap, "Low-FODMAP"),
    (DietaryTag::Mediterranean, "Mediterranean"),
    (DietaryTag::DiabetesFriendly, "Diabetes-friendly"),
    (DietaryTag::HeartHealthy, "Heart-healthy"),
    (DietaryTag::Organic, "Organic"),
    (DietaryTag::RawFood, "Raw food"),
];

// Alternate spellings seen in model output, keyed by normalized form.
const ALIASES: &[(&str, DietaryTag)] = &[
    ("plantbased", DietaryTag::Vegan),
    ("veggie", DietaryTag::Vegetarian),
    ("nogluten", DietaryTag::GlutenFree),
    ("coeliac", DietaryTag::GlutenFree),
    ("celiac", DietaryTag::GlutenFree),
    ("nodairy", DietaryTag::DairyFree),
    ("treenutfree", DietaryTag::NutFree),
    ("ketogenic", DietaryTag::Keto),
    ("raw", DietaryTag::RawFood),
];

/// Lowercase alphanumerics only: "Gluten-Free", "gluten free" and
/// "GlutenFree" all normalize to "glutenfree".
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl DietaryTag {
    pub fn parse(label: &str) -> Self {
        let key = normalize(label);
        VOCABULARY
            .iter()
            .find(|(_, name)| normalize(name) == key)
            .map(|(tag, _)| tag.clone())
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == key)
                    .map(|(_, tag)| tag.clone())
            })
            .unwrap_or_else(|| Self::Other(label.trim().to_string()))
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Other(label) => label,
            known => VOCABULARY
                .iter()
                .find(|(tag, _)| tag == known)
                .map(|(_, name)| *name)
                .unwrap_or_default(),
        }
    }

    /// Normalized comparison key, so `Other("low salt")` matches `Other("Low-Salt")`.
    pub fn key(&self) -> String {
        normalize(self.label())
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// The closed vocabulary, in display order.
    pub fn vocabulary() -> impl Iterator<Item = &'static DietaryTag> {
        VOCABULARY.iter().map(|(tag, _)| tag)
    }
}

impl From<String> for DietaryTag {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<&str> for DietaryTag {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl From<DietaryTag> for String {
    fn from(tag: DietaryTag) -> Self {
        tag.label().to_string()
    }
}

impl fmt::Display for DietaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
