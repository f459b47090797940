//! Backend API abstractions.
//!
//! The store never talks to HTTP directly; it receives an implementation of
//! these traits through its environment. [`crate::http::HttpApi`] is the
//! production implementation and [`crate::mocks::MockListsApi`] an in-memory
//! one for tests.
//!
//! # Dyn Compatibility
//!
//! Methods return boxed futures instead of using `async fn` so the traits can
//! be used as `Arc<dyn ListsApi>`, which effects capture and move into
//! spawned tasks.

use crate::error::ApiError;
use crate::types::{List, ListId, Recipe};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by API methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Body of `POST lists`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewList {
    /// Title of the list to create
    pub title: String,
    /// Recipe to seed the list with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

/// Response carrying a single list (`POST lists`, `POST lists/{id}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// The created or updated list
    #[serde(default)]
    pub list: Option<List>,
    /// Application-level rejection, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response carrying every list (`DELETE lists/{id}/recipes/{slug}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListsResponse {
    /// The full, updated collection
    #[serde(default)]
    pub lists: Option<Vec<List>>,
    /// Application-level rejection, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Non-empty application error carried by a response body
fn rejection(error: Option<&String>) -> Option<&str> {
    error.map(String::as_str).filter(|e| !e.is_empty())
}

impl ListResponse {
    /// The backend's rejection message, if it refused the request
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        rejection(self.error.as_ref())
    }
}

impl ListsResponse {
    /// The backend's rejection message, if it refused the request
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        rejection(self.error.as_ref())
    }
}

/// Operations on user lists
pub trait ListsApi: Send + Sync {
    /// `GET lists`
    ///
    /// `Ok(None)` means the backend answered without a payload.
    fn fetch_lists(&self) -> ApiFuture<'_, Option<Vec<List>>>;

    /// `POST lists` with `{title, recipe?}`
    fn create_list(&self, request: NewList) -> ApiFuture<'_, ListResponse>;

    /// `POST lists/{list_id}` with the recipe as body
    fn add_recipe(&self, list_id: ListId, recipe: Recipe) -> ApiFuture<'_, ListResponse>;

    /// `DELETE lists/{list_id}/recipes/{recipe_slug}`
    ///
    /// Unlike the other mutations this answers with every list.
    fn remove_recipe(&self, list_id: ListId, recipe_slug: String)
    -> ApiFuture<'_, ListsResponse>;
}

/// Read-only access to the recipe catalogue
pub trait RecipesApi: Send + Sync {
    /// `GET recipes`
    fn fetch_recipes(&self) -> ApiFuture<'_, Vec<Recipe>>;

    /// `GET recipes/{slug}`
    fn fetch_recipe(&self, slug: String) -> ApiFuture<'_, Recipe>;
}
