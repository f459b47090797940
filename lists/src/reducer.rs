//! Reducer logic for the lists store.
//!
//! Commands flip the matching request state to in-flight and return a single
//! effect performing the HTTP call. The effect always resolves to exactly one
//! outcome action, which records the result and settles the request.

use crate::action::{ListsAction, RequestId};
use crate::api::{ListResponse, ListsApi, ListsResponse, NewList};
use crate::state::ListsState;
use crate::types::{List, ListId, Recipe};
use recipe_lists_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Environment dependencies for the lists reducer
#[derive(Clone)]
pub struct ListsEnvironment {
    /// Backend the effects talk to
    pub api: Arc<dyn ListsApi>,
}

impl ListsEnvironment {
    /// Creates a new `ListsEnvironment`
    #[must_use]
    pub fn new(api: Arc<dyn ListsApi>) -> Self {
        Self { api }
    }
}

/// Reducer for the lists store
#[derive(Clone, Debug, Default)]
pub struct ListsReducer;

impl ListsReducer {
    /// Creates a new `ListsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch_lists(env: &ListsEnvironment, request_id: RequestId) -> Effect<ListsAction> {
        let api = Arc::clone(&env.api);
        async_effect! {
            Some(match api.fetch_lists().await {
                Ok(lists) => ListsAction::ListsFetched { request_id, lists },
                Err(error) => ListsAction::FetchListsFailed {
                    request_id,
                    error: error.to_string(),
                },
            })
        }
    }

    fn create_list(
        env: &ListsEnvironment,
        request_id: RequestId,
        request: NewList,
    ) -> Effect<ListsAction> {
        let api = Arc::clone(&env.api);
        async_effect! {
            Some(match api.create_list(request).await {
                Ok(response) => ListsAction::ListAdded { request_id, response },
                Err(error) => ListsAction::AddListFailed {
                    request_id,
                    error: error.to_string(),
                },
            })
        }
    }

    fn add_recipe(
        env: &ListsEnvironment,
        request_id: RequestId,
        list_id: ListId,
        recipe: Recipe,
    ) -> Effect<ListsAction> {
        let api = Arc::clone(&env.api);
        async_effect! {
            Some(match api.add_recipe(list_id, recipe).await {
                Ok(response) => ListsAction::RecipeAddedToList {
                    request_id,
                    list_id,
                    response,
                },
                Err(error) => ListsAction::AddRecipeToListFailed {
                    request_id,
                    error: error.to_string(),
                },
            })
        }
    }

    fn remove_recipe(
        env: &ListsEnvironment,
        request_id: RequestId,
        list_id: ListId,
        recipe_slug: String,
    ) -> Effect<ListsAction> {
        let api = Arc::clone(&env.api);
        async_effect! {
            Some(match api.remove_recipe(list_id, recipe_slug).await {
                Ok(response) => ListsAction::RecipeDeletedFromList { request_id, response },
                Err(error) => ListsAction::DeleteRecipeFromListFailed {
                    request_id,
                    error: error.to_string(),
                },
            })
        }
    }

    /// Append a newly created list
    fn apply_list_added(state: &mut ListsState, response: ListResponse) {
        if let Some(list) = &response.list {
            state.lists.push(list.clone());
        }
        let rejection = response.rejection().map(str::to_string);
        state.add_list.record_response(response.list, rejection);
    }

    /// Replace the list the recipe was sent to, if we still hold it
    fn apply_recipe_added(state: &mut ListsState, list_id: ListId, response: ListResponse) {
        if let Some(updated) = &response.list {
            replace_list(&mut state.lists, list_id, updated);
        }
        let rejection = response.rejection().map(str::to_string);
        state.add_recipe_to_list.record_response(response.list, rejection);
    }

    /// Take the backend's full collection as the new truth
    fn apply_recipe_deleted(state: &mut ListsState, response: ListsResponse) {
        if let Some(lists) = &response.lists {
            state.lists.clone_from(lists);
        }
        let rejection = response.rejection().map(str::to_string);
        state
            .delete_recipe_from_list
            .record_response(response.lists, rejection);
    }
}

/// Swap the entry with id `list_id` for `updated`; no-op when absent
fn replace_list(lists: &mut [List], list_id: ListId, updated: &List) {
    if let Some(slot) = lists.iter_mut().find(|list| list.list_id == list_id) {
        slot.clone_from(updated);
    } else {
        tracing::debug!(%list_id, "Updated list is not held locally, ignoring");
    }
}

impl Reducer for ListsReducer {
    type State = ListsState;
    type Action = ListsAction;
    type Environment = ListsEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            ListsAction::FetchLists { request_id } => {
                tracing::debug!(%request_id, "Fetching lists");
                state.fetch_lists.is_fetching = true;
                state.fetch_lists.error = None;
                smallvec![Self::fetch_lists(env, request_id)]
            },

            ListsAction::AddList {
                request_id,
                title,
                recipe,
            } => {
                tracing::debug!(%request_id, %title, "Adding list");
                state.add_list.begin();
                smallvec![Self::create_list(env, request_id, NewList { title, recipe })]
            },

            ListsAction::AddRecipeToList {
                request_id,
                list_id,
                recipe,
            } => {
                tracing::debug!(%request_id, %list_id, recipe = %recipe.name, "Adding recipe to list");
                state.add_recipe_to_list.begin();
                smallvec![Self::add_recipe(env, request_id, list_id, recipe)]
            },

            ListsAction::DeleteRecipeFromList {
                request_id,
                list_id,
                recipe_slug,
            } => {
                tracing::debug!(%request_id, %list_id, %recipe_slug, "Deleting recipe from list");
                state.delete_recipe_from_list.begin();
                smallvec![Self::remove_recipe(env, request_id, list_id, recipe_slug)]
            },

            // ========== Outcomes ==========
            ListsAction::ListsFetched { request_id, lists } => {
                let lists = lists.unwrap_or_default();
                tracing::info!(%request_id, count = lists.len(), "Lists loaded");
                state.lists = lists;
                state.fetch_lists.is_fetching = false;
                SmallVec::new()
            },

            ListsAction::FetchListsFailed { request_id, error } => {
                tracing::warn!(%request_id, %error, "Failed to load lists");
                state.fetch_lists.error = Some(error);
                state.fetch_lists.is_fetching = false;
                SmallVec::new()
            },

            ListsAction::ListAdded {
                request_id,
                response,
            } => {
                if let Some(rejection) = response.rejection() {
                    tracing::info!(%request_id, %rejection, "Backend refused new list");
                }
                Self::apply_list_added(state, response);
                state.add_list.finish();
                SmallVec::new()
            },

            ListsAction::AddListFailed { request_id, error } => {
                tracing::warn!(%request_id, %error, "Failed to add list");
                state.add_list.record_failure(error);
                state.add_list.finish();
                SmallVec::new()
            },

            ListsAction::RecipeAddedToList {
                request_id,
                list_id,
                response,
            } => {
                if let Some(rejection) = response.rejection() {
                    tracing::info!(%request_id, %list_id, %rejection, "Backend refused recipe");
                }
                Self::apply_recipe_added(state, list_id, response);
                state.add_recipe_to_list.finish();
                SmallVec::new()
            },

            ListsAction::AddRecipeToListFailed { request_id, error } => {
                tracing::warn!(%request_id, %error, "Failed to add recipe to list");
                state.add_recipe_to_list.record_failure(error);
                state.add_recipe_to_list.finish();
                SmallVec::new()
            },

            ListsAction::RecipeDeletedFromList {
                request_id,
                response,
            } => {
                if let Some(rejection) = response.rejection() {
                    tracing::info!(%request_id, %rejection, "Backend refused recipe removal");
                }
                Self::apply_recipe_deleted(state, response);
                state.delete_recipe_from_list.finish();
                SmallVec::new()
            },

            ListsAction::DeleteRecipeFromListFailed { request_id, error } => {
                tracing::warn!(%request_id, %error, "Failed to delete recipe from list");
                state.delete_recipe_from_list.record_failure(error);
                state.delete_recipe_from_list.finish();
                SmallVec::new()
            },
        }
    }
}
