//! Inventory item records
//!
//! Serialized with camelCase keys so blobs written by earlier versions of the
//! web app load unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Categories offered by the item form
///
/// The repository stores whatever category string it is given; this enum only
/// lists the choices the presentation layer renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Book,
    Game,
    Figure,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Book,
        Category::Game,
        Category::Figure,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Book => "book",
            Category::Game => "game",
            Category::Figure => "figure",
            Category::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "book" => Some(Category::Book),
            "game" => Some(Category::Game),
            "figure" => Some(Category::Figure),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

/// One collected object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Repository-assigned identifier, never changes
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub creator: String,
    pub category: String,
    /// Always >= 1 once stored
    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    pub quantity: u32,
    /// Acquisition date, kept verbatim (no calendar validation)
    #[serde(default)]
    pub acquired: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub favorite: bool,
    /// ISO-8601 creation instant, never changes
    pub created_at: String,
}

impl Item {
    /// Merge the fields present in `fields` into this item.
    ///
    /// `id` and `created_at` are not part of [`ItemFields`] and so can never be
    /// touched here. Callers validate before merging.
    pub(crate) fn merge(&mut self, fields: &ItemFields) {
        if let Some(title) = &fields.title {
            self.title = title.trim().to_string();
        }
        if let Some(creator) = &fields.creator {
            self.creator = creator.trim().to_string();
        }
        if let Some(category) = &fields.category {
            self.category = category.trim().to_string();
        }
        if let Some(quantity) = &fields.quantity {
            self.quantity = normalize_quantity(quantity);
        }
        if let Some(acquired) = &fields.acquired {
            self.acquired = acquired.clone();
        }
        if let Some(notes) = &fields.notes {
            self.notes = notes.trim().to_string();
        }
        if let Some(favorite) = fields.favorite {
            self.favorite = favorite;
        }
    }
}

/// Field mapping accepted by create and update
///
/// Every key is optional. Absent keys keep the previous value on update and
/// take their defaults on create. Unknown keys (including `id` and
/// `createdAt`) are ignored when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub category: Option<String>,
    /// Raw user input: a number, a numeric string, or anything else (which
    /// normalizes to 1)
    pub quantity: Option<Value>,
    pub acquired: Option<String>,
    pub notes: Option<String>,
    pub favorite: Option<bool>,
}

impl ItemFields {
    /// Fields for a new item with only the required keys set
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            category: Some(category.into()),
            ..Default::default()
        }
    }

    /// Patch that only toggles the favorite flag
    pub fn favorite(favorite: bool) -> Self {
        Self {
            favorite: Some(favorite),
            ..Default::default()
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// Coerce loosely-typed quantity input to an integer >= 1.
///
/// Numbers and numeric strings are truncated toward zero; anything
/// non-numeric, non-finite or below 1 becomes 1.
pub fn normalize_quantity(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(q) if q.is_finite() && q >= 1.0 => q.trunc().min(u32::MAX as f64) as u32,
        _ => 1,
    }
}

fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_quantity(&raw))
}
