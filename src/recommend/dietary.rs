//! Keyword-table dietary compatibility filter.
//!
//! Each rule maps a tag to the keyword sets an item must avoid. Matching is a
//! case-insensitive substring search over ingredients plus the translated
//! description. It is a best-effort heuristic: a dish whose restricted
//! ingredient is never mentioned will pass, and a word like "eggplant" can
//! trip the egg check. Neither is a safety guarantee.

use crate::menu::{DietaryTag, MenuItem};

pub const MEAT: &[&str] = &[
    "beef", "steak", "chicken", "lamb", "mutton", "veal", "duck", "turkey", "goose", "venison",
    "rabbit", "meat", "sausage", "salami", "pepperoni", "brisket", "oxtail", "liver", "foie gras",
    "bone broth",
];

pub const PORK: &[&str] = &[
    "pork", "bacon", "ham", "prosciutto", "pancetta", "chorizo", "lard", "guanciale", "speck",
    "chicharr",
];

pub const FISH: &[&str] = &[
    "fish", "salmon", "tuna", "cod", "anchov", "sardine", "mackerel", "trout", "halibut",
    "sea bass", "snapper", "eel", "bonito", "dashi", "caviar", "roe",
];

pub const SHELLFISH: &[&str] = &[
    "shrimp", "prawn", "crab", "lobster", "oyster", "mussel", "clam", "scallop", "squid",
    "octopus", "calamari", "crayfish", "langoustine", "shellfish",
];

pub const DAIRY: &[&str] = &[
    "milk", "cheese", "butter", "cream", "yogurt", "yoghurt", "ghee", "parmesan", "mozzarella",
    "ricotta", "feta", "mascarpone", "burrata", "paneer", "whey", "custard",
];

pub const EGG: &[&str] = &["egg", "mayonnaise", "aioli", "meringue"];

pub const OTHER_ANIMAL: &[&str] = &["honey", "gelatin", "gelatine"];

pub const ALCOHOL: &[&str] = &[
    "wine", "beer", "rum", "sake", "mirin", "brandy", "cognac", "vodka", "whisky", "whiskey",
    "liqueur", "bourbon", "sherry", "champagne", "alcohol",
];

pub const GLUTEN: &[&str] = &[
    "wheat", "flour", "bread", "pasta", "noodle", "barley", "rye", "couscous", "semolina",
    "bulgur", "seitan", "soy sauce", "breadcrumb", "panko", "crouton", "pastry", "udon", "ramen",
    "spelt", "dumpling", "batter",
];

pub const NUTS: &[&str] = &[
    "peanut", "almond", "walnut", "cashew", "pistachio", "hazelnut", "pecan", "macadamia",
    "pine nut", "brazil nut", "praline", "marzipan", "satay",
];

pub const HIGH_CARB: &[&str] = &[
    "rice", "bread", "pasta", "noodle", "potato", "sugar", "flour", "tortilla", "fries", "bun",
    "dumpling", "couscous", "syrup", "cake", "oats", "quinoa", "bean", "polenta", "risotto",
];

pub const GRAINS: &[&str] = &[
    "wheat", "rice", "oats", "oatmeal", "barley", "rye", "flour", "bread", "pasta", "noodle",
    "quinoa", "couscous", "bulgur", "millet", "polenta", "cornmeal",
];

pub const LEGUMES: &[&str] = &[
    "bean", "lentil", "chickpea", "peas", "peanut", "soy", "tofu", "edamame", "hummus", "dhal",
    "miso", "tempeh",
];

pub const SUGAR: &[&str] = &["sugar", "syrup", "caramel", "candied", "frosting", "sweetened"];

pub const PROCESSED: &[&str] = &[
    "processed", "margarine", "vegetable oil", "canola", "hot dog", "spam", "instant",
    "artificial",
];

/// Rule for one dietary tag.
#[derive(Debug, Clone)]
pub struct DietaryRule {
    pub tag: DietaryTag,
    /// An item mentioning any keyword of any set is incompatible.
    pub forbidden: Vec<&'static [&'static str]>,
    /// When set, an item carrying `tag` itself passes without keyword checks.
    pub trust_item_tag: bool,
}

impl DietaryRule {
    pub fn new(tag: DietaryTag, forbidden: Vec<&'static [&'static str]>) -> Self {
        Self {
            tag,
            forbidden,
            trust_item_tag: false,
        }
    }

    pub fn trusting_item_tag(mut self) -> Self {
        self.trust_item_tag = true;
        self
    }

    fn allows(&self, item: &MenuItem, haystack: &str) -> bool {
        if self.trust_item_tag && item.has_tag(&self.tag) {
            return true;
        }
        !self
            .forbidden
            .iter()
            .flat_map(|set| set.iter())
            .any(|keyword| haystack.contains(keyword))
    }
}

pub fn default_rules() -> Vec<DietaryRule> {
    vec![
        DietaryRule::new(
            DietaryTag::Vegan,
            vec![MEAT, PORK, FISH, SHELLFISH, DAIRY, EGG, OTHER_ANIMAL],
        )
        .trusting_item_tag(),
        DietaryRule::new(DietaryTag::Vegetarian, vec![MEAT, PORK, FISH, SHELLFISH]),
        DietaryRule::new(DietaryTag::Halal, vec![PORK, ALCOHOL]),
        DietaryRule::new(DietaryTag::Kosher, vec![PORK, SHELLFISH]),
        DietaryRule::new(DietaryTag::GlutenFree, vec![GLUTEN]).trusting_item_tag(),
        DietaryRule::new(DietaryTag::DairyFree, vec![DAIRY]),
        DietaryRule::new(DietaryTag::NutFree, vec![NUTS]),
        DietaryRule::new(DietaryTag::ShellfishFree, vec![SHELLFISH]),
        DietaryRule::new(DietaryTag::Keto, vec![HIGH_CARB]),
        DietaryRule::new(
            DietaryTag::Paleo,
            vec![GRAINS, LEGUMES, DAIRY, SUGAR, PROCESSED],
        ),
    ]
}

/// Removes items that conflict with any of a profile's dietary tags.
#[derive(Debug, Clone)]
pub struct DietaryCompatibilityFilter {
    rules: Vec<DietaryRule>,
}

impl DietaryCompatibilityFilter {
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Add a rule, replacing any existing rule for the same tag.
    pub fn with_rule(mut self, rule: DietaryRule) -> Self {
        let key = rule.tag.key();
        self.rules.retain(|existing| existing.tag.key() != key);
        self.rules.push(rule);
        self
    }

    /// Keep the items compatible with every tag. Order is preserved; an empty
    /// tag list returns the input unchanged.
    pub fn filter(&self, mut items: Vec<MenuItem>, tags: &[DietaryTag]) -> Vec<MenuItem> {
        if tags.is_empty() {
            return items;
        }
        items.retain(|item| self.is_compatible(item, tags));
        items
    }

    pub fn is_compatible(&self, item: &MenuItem, tags: &[DietaryTag]) -> bool {
        let haystack = item.ingredient_text();
        tags.iter()
            .all(|tag| self.allows_with_haystack(item, tag, &haystack))
    }

    pub fn allows(&self, item: &MenuItem, tag: &DietaryTag) -> bool {
        self.allows_with_haystack(item, tag, &item.ingredient_text())
    }

    fn allows_with_haystack(&self, item: &MenuItem, tag: &DietaryTag, haystack: &str) -> bool {
        let key = tag.key();
        match self.rules.iter().find(|rule| rule.tag.key() == key) {
            Some(rule) => rule.allows(item, haystack),
            // No keyword rule: only the item's own declaration counts.
            None => item.has_tag(tag),
        }
    }
}

impl Default for DietaryCompatibilityFilter {
    fn default() -> Self {
        Self::new()
    }
}
