//! Snack catalog.
//!
//! The catalog is an ordered, immutable list of snack records. The built-in
//! table is the reference data; a JSON file can replace it through settings.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnackError;

/// Maximum snack name length (in characters, after trimming).
pub const MAX_NAME_LEN: usize = 100;

/// Snack category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Street Food")]
    StreetFood,
    #[serde(rename = "Traditional Meal")]
    TraditionalMeal,
    #[serde(rename = "Dessert")]
    Dessert,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 4] = [
        Category::StreetFood,
        Category::TraditionalMeal,
        Category::Dessert,
        Category::Other,
    ];

    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Category::StreetFood => "Street Food",
            Category::TraditionalMeal => "Traditional Meal",
            Category::Dessert => "Dessert",
            Category::Other => "Other",
        }
    }

    /// Emoji used when a record does not carry its own.
    pub fn default_emoji(&self) -> &'static str {
        match self {
            Category::StreetFood => "🥟",
            Category::TraditionalMeal => "🍲",
            Category::Dessert => "🍬",
            Category::Other => "🍴",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snack {
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub category: Category,
}

impl Snack {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        emoji: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            emoji: emoji.into(),
            category,
        }
    }
}

/// On-disk catalog entry; `emoji` falls back to the category default.
#[derive(Debug, Deserialize)]
struct SnackEntry {
    name: String,
    description: String,
    #[serde(default)]
    emoji: Option<String>,
    category: Category,
}

impl From<SnackEntry> for Snack {
    fn from(entry: SnackEntry) -> Self {
        let emoji = entry
            .emoji
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| entry.category.default_emoji().to_string());
        Snack {
            name: entry.name,
            description: entry.description,
            emoji,
            category: entry.category,
        }
    }
}

const BUILTIN_SNACKS: &[(&str, &str, &str, Category)] = &[
    (
        "Momo",
        "Steamed or fried dumplings filled with vegetables, chicken, or buffalo meat, served with spicy tomato chutney. Popular street food in Nepal, often eaten with friends or as a snack.",
        "🥟",
        Category::StreetFood,
    ),
    (
        "Buff Momo",
        "Nepali dumplings filled specifically with buffalo meat, steamed or fried, served with chili sauce. A hearty street snack popular in cities like Kathmandu and Pokhara.",
        "🥟",
        Category::StreetFood,
    ),
    (
        "Vegetable Chowmein",
        "Stir-fried noodles with mixed vegetables, adapted into Nepali cuisine from Chinese style. Eaten as a snack or light meal, commonly available in street stalls.",
        "🍜",
        Category::StreetFood,
    ),
    (
        "Pani Puri",
        "Crispy hollow puris filled with spiced potatoes, chickpeas, and flavored water. Popular Nepali street snack enjoyed in groups.",
        "🫔",
        Category::StreetFood,
    ),
    (
        "Chatpate",
        "Spicy and tangy puffed rice snack mixed with potatoes, onions, and chutney. A common street snack in Nepal, perfect for quick munching.",
        "🥗",
        Category::StreetFood,
    ),
    (
        "Sekuwa",
        "Grilled, marinated meat skewers, cooked over charcoal. Popular Nepali street food, usually served with mustard sauce.",
        "🥩",
        Category::StreetFood,
    ),
    (
        "Dhido",
        "Traditional Nepali staple made from buckwheat or millet flour, served with vegetable curry, meat, or gundruk soup. A healthy and filling main meal in rural Nepal.",
        "🍲",
        Category::TraditionalMeal,
    ),
    (
        "Aloo Tama",
        "Nepali curry made with potatoes, bamboo shoots, and black-eyed peas, served as a traditional main dish. Slightly sour and savory, eaten with rice or Dhido.",
        "🥔",
        Category::TraditionalMeal,
    ),
    (
        "Thukpa",
        "Hearty Nepali noodle soup with vegetables, meat, or chicken, perfect for cold weather. A comforting meal in Himalayan regions.",
        "🍲",
        Category::TraditionalMeal,
    ),
    (
        "Yomari",
        "Sweet dumpling made from rice flour and filled with jaggery and sesame seeds. Traditionally prepared during Newari festivals as a dessert.",
        "🍬",
        Category::Dessert,
    ),
    (
        "Sel Roti",
        "Ring-shaped, sweet rice flour bread, deep-fried and crispy outside, soft inside. Served during festivals as a dessert or snack.",
        "🍩",
        Category::Dessert,
    ),
];

/// Ordered list of snack records with unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    snacks: Vec<Snack>,
}

impl Catalog {
    /// Build a catalog, validating names and descriptions.
    pub fn new(snacks: Vec<Snack>) -> Result<Self, SnackError> {
        validate_snacks(&snacks)?;
        Ok(Self { snacks })
    }

    /// The built-in reference catalog.
    pub fn builtin() -> Self {
        let snacks = BUILTIN_SNACKS
            .iter()
            .map(|(name, description, emoji, category)| {
                Snack::new(*name, *description, *emoji, *category)
            })
            .collect();
        Self { snacks }
    }

    /// Parse a catalog from a JSON array of snack entries.
    pub fn from_json(json: &str) -> Result<Self, SnackError> {
        let entries: Vec<SnackEntry> = serde_json::from_str(json)?;
        Self::new(entries.into_iter().map(Snack::from).collect())
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SnackError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.snacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snacks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snack> {
        self.snacks.iter()
    }

    /// Look up a snack by exact name.
    pub fn get(&self, name: &str) -> Option<&Snack> {
        self.snacks.iter().find(|s| s.name == name)
    }
}

fn validate_snacks(snacks: &[Snack]) -> Result<(), SnackError> {
    let mut seen = HashSet::with_capacity(snacks.len());
    for snack in snacks {
        let name = snack.name.trim();
        if name.is_empty() {
            return Err(SnackError::InvalidCatalog(
                "snack name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(SnackError::InvalidCatalog(format!(
                "snack name '{}' exceeds {} characters",
                name, MAX_NAME_LEN
            )));
        }
        if snack.description.trim().is_empty() {
            return Err(SnackError::InvalidCatalog(format!(
                "snack '{}' has an empty description",
                snack.name
            )));
        }
        if !seen.insert(snack.name.as_str()) {
            return Err(SnackError::InvalidCatalog(format!(
                "duplicate snack name '{}'",
                snack.name
            )));
        }
    }
    Ok(())
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
