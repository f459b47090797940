//! Actions processed by the lists reducer.

use crate::api::{ListResponse, ListsResponse};
use crate::types::{List, ListId, Recipe};
use std::fmt;

/// Correlation token tying a command to the outcome it produces
///
/// Request state is shared per operation kind, so the token is the only way
/// to tell which call an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw token
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Inputs to the lists reducer
///
/// Commands start a request; outcomes are produced by the request's effect
/// and settle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListsAction {
    // ========== Commands ==========
    /// Load every list from the backend
    FetchLists {
        /// Correlation token
        request_id: RequestId,
    },

    /// Create a list, optionally seeded with a recipe
    AddList {
        /// Correlation token
        request_id: RequestId,
        /// Title of the new list
        title: String,
        /// First recipe of the list
        recipe: Option<Recipe>,
    },

    /// Append a recipe to an existing list
    AddRecipeToList {
        /// Correlation token
        request_id: RequestId,
        /// Target list
        list_id: ListId,
        /// Recipe to append
        recipe: Recipe,
    },

    /// Remove a recipe from a list
    DeleteRecipeFromList {
        /// Correlation token
        request_id: RequestId,
        /// Target list
        list_id: ListId,
        /// Slug of the recipe to remove
        recipe_slug: String,
    },

    // ========== Outcomes ==========
    /// The list fetch answered
    ListsFetched {
        /// Correlation token
        request_id: RequestId,
        /// Decoded payload, `None` if the body was empty
        lists: Option<Vec<List>>,
    },

    /// The list fetch failed
    FetchListsFailed {
        /// Correlation token
        request_id: RequestId,
        /// Failure message
        error: String,
    },

    /// `POST lists` answered
    ListAdded {
        /// Correlation token
        request_id: RequestId,
        /// Backend response
        response: ListResponse,
    },

    /// `POST lists` failed
    AddListFailed {
        /// Correlation token
        request_id: RequestId,
        /// Failure message
        error: String,
    },

    /// `POST lists/{id}` answered
    RecipeAddedToList {
        /// Correlation token
        request_id: RequestId,
        /// List the recipe was sent to
        list_id: ListId,
        /// Backend response
        response: ListResponse,
    },

    /// `POST lists/{id}` failed
    AddRecipeToListFailed {
        /// Correlation token
        request_id: RequestId,
        /// Failure message
        error: String,
    },

    /// `DELETE lists/{id}/recipes/{slug}` answered
    RecipeDeletedFromList {
        /// Correlation token
        request_id: RequestId,
        /// Backend response
        response: ListsResponse,
    },

    /// `DELETE lists/{id}/recipes/{slug}` failed
    DeleteRecipeFromListFailed {
        /// Correlation token
        request_id: RequestId,
        /// Failure message
        error: String,
    },
}

impl ListsAction {
    /// The correlation token carried by this action
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        match self {
            Self::FetchLists { request_id }
            | Self::AddList { request_id, .. }
            | Self::AddRecipeToList { request_id, .. }
            | Self::DeleteRecipeFromList { request_id, .. }
            | Self::ListsFetched { request_id, .. }
            | Self::FetchListsFailed { request_id, .. }
            | Self::ListAdded { request_id, .. }
            | Self::AddListFailed { request_id, .. }
            | Self::RecipeAddedToList { request_id, .. }
            | Self::AddRecipeToListFailed { request_id, .. }
            | Self::RecipeDeletedFromList { request_id, .. }
            | Self::DeleteRecipeFromListFailed { request_id, .. } => *request_id,
        }
    }

    /// Returns `true` for actions that start a request
    #[must_use]
    pub const fn is_command(&self) -> bool {
        matches!(
            self,
            Self::FetchLists { .. }
                | Self::AddList { .. }
                | Self::AddRecipeToList { .. }
                | Self::DeleteRecipeFromList { .. }
        )
    }

    /// Returns `true` for actions that settle a request
    #[must_use]
    pub const fn is_outcome(&self) -> bool {
        !self.is_command()
    }

    /// Returns `true` if this action settles the request `request_id`
    #[must_use]
    pub fn settles(&self, request_id: RequestId) -> bool {
        self.is_outcome() && self.request_id() == request_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_and_outcomes_are_disjoint() {
        let command = ListsAction::FetchLists {
            request_id: RequestId::new(1),
        };
        let outcome = ListsAction::FetchListsFailed {
            request_id: RequestId::new(1),
            error: "timeout".to_string(),
        };

        assert!(command.is_command());
        assert!(!command.is_outcome());
        assert!(outcome.is_outcome());
    }

    #[test]
    fn settles_matches_only_own_outcome() {
        let outcome = ListsAction::ListAdded {
            request_id: RequestId::new(7),
            response: ListResponse::default(),
        };

        assert!(outcome.settles(RequestId::new(7)));
        assert!(!outcome.settles(RequestId::new(8)));

        let command = ListsAction::AddList {
            request_id: RequestId::new(7),
            title: "Desserts".to_string(),
            recipe: None,
        };
        assert!(!command.settles(RequestId::new(7)));
    }

    #[test]
    fn request_id_displays_with_prefix() {
        assert_eq!(RequestId::new(3).to_string(), "req-3");
    }
}
