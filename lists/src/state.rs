//! Store state: the lists themselves and per-operation request tracking.

use crate::types::{List, ListId};
use serde::Serialize;

/// Request tracking for one kind of mutating operation
///
/// There is one `ActionState` per operation kind, shared by every call of
/// that kind. Concurrent calls race on it and the last to settle wins.
///
/// Two error channels are kept apart:
/// - `error`: the request failed in transport or decoding
/// - `result_error`: the backend answered but refused the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionState<T> {
    /// A request of this kind is in flight
    pub is_fetching: bool,
    /// Transport or decode failure of the last settled request
    pub error: Option<String>,
    /// Payload of the last successful response
    pub result_data: Option<T>,
    /// Application error from the last successful response, empty if none
    pub result_error: String,
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        Self {
            is_fetching: false,
            error: None,
            result_data: None,
            result_error: String::new(),
        }
    }
}

impl<T> ActionState<T> {
    /// A request has been dispatched
    pub fn begin(&mut self) {
        self.is_fetching = true;
        self.error = None;
    }

    /// Record a response from the backend
    pub fn record_response(&mut self, data: Option<T>, rejection: Option<String>) {
        self.result_data = data;
        self.result_error = rejection.unwrap_or_default();
    }

    /// Record a transport or decode failure
    pub fn record_failure(&mut self, error: String) {
        self.error = Some(error);
    }

    /// The request has settled, whatever its outcome
    pub const fn finish(&mut self) {
        self.is_fetching = false;
    }

    /// The last response carried an application error
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        !self.result_error.is_empty()
    }
}

/// Request tracking for the list fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FetchState {
    /// The fetch is in flight
    pub is_fetching: bool,
    /// Failure of the last fetch
    pub error: Option<String>,
}

/// Everything the store owns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListsState {
    /// Lists as last reported by the backend
    pub lists: Vec<List>,
    /// The list fetch issued at startup (and on refresh)
    pub fetch_lists: FetchState,
    /// `add_list` tracking
    pub add_list: ActionState<List>,
    /// `add_recipe_to_list` tracking
    pub add_recipe_to_list: ActionState<List>,
    /// `delete_recipe_from_list` tracking
    pub delete_recipe_from_list: ActionState<Vec<List>>,
}

impl ListsState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a list by id
    #[must_use]
    pub fn list(&self, list_id: ListId) -> Option<&List> {
        self.lists.iter().find(|list| list.list_id == list_id)
    }

    /// Any request, of any kind, is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.fetch_lists.is_fetching
            || self.add_list.is_fetching
            || self.add_recipe_to_list.is_fetching
            || self.delete_recipe_from_list.is_fetching
    }
}
