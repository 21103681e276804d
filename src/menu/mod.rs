//! Menu domain: items as extracted from a photographed menu.

mod dietary_tag;
pub mod flavor;

pub use dietary_tag::DietaryTag;
pub use flavor::{FlavorEstimate, TasteVector, FLAVOR_DIMENSIONS};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency assumed when the menu shows none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Highest spice level shown to users.
pub const MAX_SPICE_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Appetizer,
    Soup,
    Salad,
    MainCourse,
    Side,
    Dessert,
    Beverage,
    #[default]
    Other,
}

impl MenuCategory {
    /// Lenient mapping from whatever label the model chose.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "appetizer" | "appetizers" | "starter" | "starters" | "small plates" | "tapas" => {
                Self::Appetizer
            }
            "soup" | "soups" => Self::Soup,
            "salad" | "salads" => Self::Salad,
            "main" | "mains" | "main course" | "main_course" | "maincourse" | "entree"
            | "entrée" | "entrees" => Self::MainCourse,
            "side" | "sides" | "side dish" | "side_dish" => Self::Side,
            "dessert" | "desserts" | "sweets" => Self::Dessert,
            "beverage" | "beverages" | "drink" | "drinks" => Self::Beverage,
            _ => Self::Other,
        }
    }
}

/// One dish on a menu.
///
/// Built once by the extraction client and not mutated afterwards; scores
/// and spice levels are computed per request alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub category: MenuCategory,
    pub name_original: String,
    pub name_translated: String,
    pub description_original: String,
    pub description_translated: String,
    pub price: f64,
    pub currency: String,
    pub ingredients: Vec<String>,
    pub preparation_methods: Vec<String>,
    pub dietary_tags: Vec<DietaryTag>,
    pub estimated_flavors: FlavorEstimate,
}

impl MenuItem {
    /// Item with a fresh id; every other field starts empty or defaulted.
    pub fn new(name: impl Into<String>, category: MenuCategory) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            category,
            name_original: name.clone(),
            name_translated: name,
            description_original: String::new(),
            description_translated: String::new(),
            price: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
            ingredients: Vec::new(),
            preparation_methods: Vec::new(),
            dietary_tags: Vec::new(),
            estimated_flavors: FlavorEstimate::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description_original = description.clone();
        self.description_translated = description;
        self
    }

    pub fn with_price(mut self, price: f64, currency: impl Into<String>) -> Self {
        self.price = price;
        self.currency = currency.into();
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preparation_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preparation_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dietary_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DietaryTag>,
    {
        self.dietary_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flavors(mut self, flavors: FlavorEstimate) -> Self {
        self.estimated_flavors = flavors;
        self
    }

    pub fn has_tag(&self, tag: &DietaryTag) -> bool {
        let key = tag.key();
        self.dietary_tags.iter().any(|own| own.key() == key)
    }

    /// Lower-cased ingredients plus translated description; the haystack for
    /// dietary keyword checks.
    pub fn ingredient_text(&self) -> String {
        let mut text = self.ingredients.join(" ");
        text.push(' ');
        text.push_str(&self.description_translated);
        text.to_lowercase()
    }

    /// Lower-cased name, description and ingredients; the haystack for
    /// favorites and philosophy matching.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name_translated,
            self.name_original,
            self.description_translated,
            self.ingredients.join(" ")
        )
        .to_lowercase()
    }

    /// 0–5 heat level from the Spiciness estimate; 0 when unknown.
    pub fn spice_level(&self) -> u8 {
        self.estimated_flavors
            .get(flavor::SPICINESS)
            .map(|heat| (heat / 20.0).round() as u8)
            .unwrap_or(0)
            .min(MAX_SPICE_LEVEL)
    }
}
