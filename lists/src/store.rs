//! The list store: an application-owned handle over the lists runtime.
//!
//! [`ListsStore`] wraps a [`Store`] running [`ListsReducer`] and exposes the
//! imperative operations the presentation layer calls. Each operation gets a
//! fresh [`RequestId`] and waits for the outcome carrying that id, so the
//! caller always receives its own result even when calls of the same kind
//! overlap. The shared per-kind [`ActionState`](crate::state::ActionState)
//! stays last-write-wins.

use crate::action::{ListsAction, RequestId};
use crate::api::{ListResponse, ListsApi, ListsResponse};
use crate::config::ListsConfig;
use crate::error::ListsError;
use crate::http::HttpApi;
use crate::reducer::{ListsEnvironment, ListsReducer};
use crate::state::ListsState;
use crate::types::{List, ListId, Recipe};
use recipe_lists_runtime::{EffectHandle, Store, StoreConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// The runtime store specialised for lists
pub type ListsRuntime = Store<ListsState, ListsAction, ListsEnvironment, ListsReducer>;

/// Outcomes buffered for [`ListsStore::subscribe`] receivers
const OUTCOME_CAPACITY: usize = 256;

/// How a request settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T> {
    /// The backend answered; the body may still carry a rejection
    Completed(T),
    /// The request failed in transport or decoding
    Failed(String),
}

impl<T> Settlement<T> {
    /// Returns `true` if the backend answered
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Converts into a `Result`, with the failure message as error
    ///
    /// # Errors
    ///
    /// Returns the failure message for [`Settlement::Failed`].
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Completed(value) => Ok(value),
            Self::Failed(error) => Err(error),
        }
    }
}

/// Client-side view of the user's lists
///
/// Cloning is cheap; clones share state and the request counter.
#[derive(Clone)]
pub struct ListsStore {
    store: ListsRuntime,
    next_request: Arc<AtomicU64>,
    initial_load: EffectHandle,
}

impl ListsStore {
    /// Create the store and start loading lists
    ///
    /// Returns as soon as the fetch has been dispatched. Lists stay empty
    /// until it settles; await [`ListsStore::loaded`] to wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`ListsError::Store`] if the initial fetch cannot be dispatched.
    pub async fn new(environment: ListsEnvironment) -> Result<Self, ListsError> {
        let config = StoreConfig::default().with_broadcast_capacity(OUTCOME_CAPACITY);
        let store = Store::with_config(ListsState::new(), ListsReducer::new(), environment, config);
        let next_request = Arc::new(AtomicU64::new(1));

        let request_id = RequestId::new(next_request.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%request_id, "Starting initial list fetch");
        let initial_load = store.send(ListsAction::FetchLists { request_id }).await?;

        Ok(Self {
            store,
            next_request,
            initial_load,
        })
    }

    /// Create a store backed by any [`ListsApi`]
    ///
    /// # Errors
    ///
    /// Same as [`ListsStore::new`].
    pub async fn with_api(api: Arc<dyn ListsApi>) -> Result<Self, ListsError> {
        Self::new(ListsEnvironment::new(api)).await
    }

    /// Create a store talking HTTP to the configured backend
    ///
    /// # Errors
    ///
    /// Returns [`ListsError::Api`] if the HTTP client cannot be built.
    pub async fn from_config(config: &ListsConfig) -> Result<Self, ListsError> {
        let api = HttpApi::new(config)?;
        Self::with_api(Arc::new(api)).await
    }

    fn next_request_id(&self) -> RequestId {
        RequestId::new(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    /// Send a command and wait for the outcome with the same request id
    async fn dispatch(&self, action: ListsAction) -> Result<ListsAction, ListsError> {
        let request_id = action.request_id();
        let outcome = self
            .store
            .send_and_wait(action, move |a| a.settles(request_id))
            .await?;
        Ok(outcome)
    }

    fn unexpected(request_id: RequestId, outcome: &ListsAction) -> ListsError {
        ListsError::UnexpectedOutcome {
            request_id: request_id.to_string(),
            action: format!("{outcome:?}"),
        }
    }

    /// Wait until the fetch started at construction has settled
    pub async fn loaded(&self) {
        let mut handle = self.initial_load.clone();
        handle.wait().await;
    }

    /// Fetch every list again, replacing the local collection
    ///
    /// # Errors
    ///
    /// Returns [`ListsError::Store`] if the store is shutting down.
    pub async fn refresh(&self) -> Result<Settlement<Vec<List>>, ListsError> {
        let request_id = self.next_request_id();
        match self.dispatch(ListsAction::FetchLists { request_id }).await? {
            ListsAction::ListsFetched { lists, .. } => {
                Ok(Settlement::Completed(lists.unwrap_or_default()))
            },
            ListsAction::FetchListsFailed { error, .. } => Ok(Settlement::Failed(error)),
            other => Err(Self::unexpected(request_id, &other)),
        }
    }

    /// Create a list, optionally seeded with a recipe
    ///
    /// On success the created list is appended to the collection. The
    /// response is returned as-is, so a rejection is visible both here and
    /// in `add_list.result_error`.
    ///
    /// # Errors
    ///
    /// Returns [`ListsError::Store`] if the store is shutting down.
    #[tracing::instrument(skip(self, title, recipe))]
    pub async fn add_list(
        &self,
        title: impl Into<String>,
        recipe: Option<Recipe>,
    ) -> Result<Settlement<ListResponse>, ListsError> {
        let request_id = self.next_request_id();
        let action = ListsAction::AddList {
            request_id,
            title: title.into(),
            recipe,
        };

        match self.dispatch(action).await? {
            ListsAction::ListAdded { response, .. } => Ok(Settlement::Completed(response)),
            ListsAction::AddListFailed { error, .. } => Ok(Settlement::Failed(error)),
            other => Err(Self::unexpected(request_id, &other)),
        }
    }

    /// Append a recipe to a list
    ///
    /// On success the local entry with `list_id` is replaced by the list the
    /// backend returns. Nothing changes locally if the list isn't held.
    ///
    /// # Errors
    ///
    /// Returns [`ListsError::Store`] if the store is shutting down.
    #[tracing::instrument(skip(self, recipe))]
    pub async fn add_recipe_to_list(
        &self,
        list_id: ListId,
        recipe: Recipe,
    ) -> Result<Settlement<ListResponse>, ListsError> {
        let request_id = self.next_request_id();
        let action = ListsAction::AddRecipeToList {
            request_id,
            list_id,
            recipe,
        };

        match self.dispatch(action).await? {
            ListsAction::RecipeAddedToList { response, .. } => Ok(Settlement::Completed(response)),
            ListsAction::AddRecipeToListFailed { error, .. } => Ok(Settlement::Failed(error)),
            other => Err(Self::unexpected(request_id, &other)),
        }
    }

    /// Remove a recipe from a list
    ///
    /// The backend answers with every list; on success that collection
    /// replaces the local one wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`ListsError::Store`] if the store is shutting down.
    #[tracing::instrument(skip(self, recipe_slug))]
    pub async fn delete_recipe_from_list(
        &self,
        list_id: ListId,
        recipe_slug: impl Into<String>,
    ) -> Result<Settlement<ListsResponse>, ListsError> {
        let request_id = self.next_request_id();
        let action = ListsAction::DeleteRecipeFromList {
            request_id,
            list_id,
            recipe_slug: recipe_slug.into(),
        };

        match self.dispatch(action).await? {
            ListsAction::RecipeDeletedFromList { response, .. } => {
                Ok(Settlement::Completed(response))
            },
            ListsAction::DeleteRecipeFromListFailed { error, .. } => Ok(Settlement::Failed(error)),
            other => Err(Self::unexpected(request_id, &other)),
        }
    }

    /// The current lists
    pub async fn lists(&self) -> Vec<List> {
        self.store.state(|s| s.lists.clone()).await
    }

    /// A copy of the whole state, for rendering
    pub async fn snapshot(&self) -> ListsState {
        self.store.state(Clone::clone).await
    }

    /// Read part of the state without cloning the rest
    pub async fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&ListsState) -> T,
    {
        self.store.state(f).await
    }

    /// Observe every outcome as it is applied
    ///
    /// A receiver that falls more than a few hundred outcomes behind sees
    /// `Lagged` and skips ahead. Operations awaiting their own outcome are
    /// unaffected.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ListsAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting operations and wait for in-flight requests to settle
    ///
    /// # Errors
    ///
    /// Returns [`ListsError::Store`] if requests are still running when
    /// `timeout` expires.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ListsError> {
        self.store.shutdown(timeout).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ListsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListsStore")
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockListsApi;

    #[test]
    fn settlement_converts_to_result() {
        assert_eq!(Settlement::Completed(3).into_result(), Ok(3));
        assert_eq!(
            Settlement::<i32>::Failed("timeout".to_string()).into_result(),
            Err("timeout".to_string())
        );
        assert!(!Settlement::<()>::Failed(String::new()).is_completed());
    }

    #[tokio::test]
    async fn request_ids_are_unique_across_clones() {
        let store = ListsStore::with_api(Arc::new(MockListsApi::new())).await.unwrap();
        let clone = store.clone();

        let a = store.next_request_id();
        let b = clone.next_request_id();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn shutdown_rejects_operations() {
        let store = ListsStore::with_api(Arc::new(MockListsApi::new())).await.unwrap();
        store.loaded().await;
        store.shutdown(Duration::from_secs(1)).await.unwrap();

        let result = store.add_list("Desserts", None).await;
        assert!(matches!(result, Err(ListsError::Store(_))));
    }
}
