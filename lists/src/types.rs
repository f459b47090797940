//! Domain types shared with the backend.
//!
//! Field names follow the backend's JSON: recipes use capitalized keys
//! (`Name`, `Description`, ...) while lists use camel case (`listId`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier of a [`List`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(pub i64);

impl ListId {
    /// Creates a `ListId` from a raw identifier
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ListId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for ListId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A recipe as served by the backend.
///
/// Recipes are never modified client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Dish name
    #[serde(rename = "Name")]
    pub name: String,
    /// Source URL; its last path segment is the recipe's slug
    pub url: String,
    /// Short description
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    /// Author, when known
    #[serde(rename = "Author", default)]
    pub author: Option<String>,
    /// Ingredients in display order
    #[serde(rename = "Ingredients", default)]
    pub ingredients: Vec<String>,
    /// Method steps in order
    #[serde(rename = "Method", default)]
    pub method: Vec<String>,
}

impl Recipe {
    /// Creates a recipe with just a name and URL
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            description: None,
            author: None,
            ingredients: Vec::new(),
            method: Vec::new(),
        }
    }

    /// The slug the backend uses in recipe paths.
    ///
    /// This is the last non-empty path segment of [`Recipe::url`], ignoring
    /// any query string or fragment. Returns `None` for URLs without a path,
    /// including bare hosts such as `example.com` that contain no `/`.
    ///
    /// ```
    /// use recipe_lists::Recipe;
    ///
    /// let recipe = Recipe::new("Lemon tart", "https://example.com/recipes/lemon-tart/");
    /// assert_eq!(recipe.slug(), Some("lemon-tart"));
    /// ```
    #[must_use]
    pub fn slug(&self) -> Option<&str> {
        let without_query = self.url.split(['?', '#']).next().unwrap_or_default();
        let path = match without_query.split_once("://") {
            Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
            None if without_query.contains('/') => without_query,
            None => "",
        };

        path.split('/').rev().find(|segment| !segment.is_empty())
    }
}

/// A user-curated, ordered collection of recipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// Backend identifier
    #[serde(rename = "listId")]
    pub list_id: ListId,
    /// Display title
    pub title: String,
    /// Recipes in the order they were added
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

impl List {
    /// Creates an empty list
    #[must_use]
    pub fn new(list_id: impl Into<ListId>, title: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            title: title.into(),
            recipes: Vec::new(),
        }
    }

    /// Returns `true` if a recipe with this slug is in the list
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.recipes.iter().any(|r| r.slug() == Some(slug))
    }
}
