//! Standing item predicates used by the list views

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// A named predicate over items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemFilter {
    /// No filtering
    #[default]
    All,
    /// Only items marked favorite
    Favorites,
    /// Exact category match
    Category(String),
    /// Case-insensitive substring over title, creator and notes
    Search(String),
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Favorites => item.favorite,
            ItemFilter::Category(category) => item.category == *category,
            ItemFilter::Search(query) => {
                let query = query.trim().to_lowercase();
                query.is_empty()
                    || [&item.title, &item.creator, &item.notes]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&query))
            }
        }
    }

    /// Name of the view for the two standing filters
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemFilter::All => "all",
            ItemFilter::Favorites => "favorites",
            ItemFilter::Category(_) => "category",
            ItemFilter::Search(_) => "search",
        }
    }

    /// Parse a standing filter name (`all`, `favorites`/`fav`)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Some(ItemFilter::All),
            "favorites" | "favourites" | "fav" => Some(ItemFilter::Favorites),
            _ => None,
        }
    }
}
