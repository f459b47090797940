//! In-memory backend for tests and demos.
//!
//! [`MockListsApi`] behaves like a small recipe lists server: it assigns list
//! ids, refuses duplicate titles and recipes, and answers deletions with the
//! full collection. Transport failures, rejections and latency can be
//! injected per call.
//!
//! **WARNING**: Do NOT use in production. This is for testing only!

use crate::api::{ApiFuture, ListResponse, ListsApi, ListsResponse, NewList, RecipesApi};
use crate::error::ApiError;
use crate::types::{List, ListId, Recipe};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call received by [`MockListsApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `GET lists`
    FetchLists,
    /// `POST lists`
    CreateList {
        /// Requested title
        title: String,
    },
    /// `POST lists/{id}`
    AddRecipe {
        /// Target list
        list_id: ListId,
        /// Name of the posted recipe
        recipe: String,
    },
    /// `DELETE lists/{id}/recipes/{slug}`
    RemoveRecipe {
        /// Target list
        list_id: ListId,
        /// Slug of the removed recipe
        recipe_slug: String,
    },
    /// `GET recipes`
    FetchRecipes,
    /// `GET recipes/{slug}`
    FetchRecipe {
        /// Requested slug
        slug: String,
    },
}

#[derive(Debug, Default)]
struct Backend {
    lists: Vec<List>,
    recipes: Vec<Recipe>,
    latency: Duration,
    delays: VecDeque<Duration>,
    failures: VecDeque<String>,
    rejections: VecDeque<String>,
    calls: Vec<MockCall>,
}

impl Backend {
    fn next_id(&self) -> ListId {
        ListId(self.lists.iter().map(|l| l.list_id.get()).max().unwrap_or(0) + 1)
    }

    fn list_mut(&mut self, list_id: ListId) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| l.list_id == list_id)
    }
}

/// Mock recipe lists backend
///
/// Clones share the same backend, so a test can keep one handle for
/// inspection while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MockListsApi {
    backend: Arc<Mutex<Backend>>,
}

impl MockListsApi {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with lists
    #[must_use]
    pub fn with_lists(self, lists: Vec<List>) -> Self {
        self.lock().lists = lists;
        self
    }

    /// Seed the recipe catalogue
    #[must_use]
    pub fn with_recipes(self, recipes: Vec<Recipe>) -> Self {
        self.lock().recipes = recipes;
        self
    }

    /// Delay every call by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Delay the next call by `delay` instead of the default latency
    ///
    /// Queued delays are consumed in call order.
    pub fn delay_next(&self, delay: Duration) {
        self.lock().delays.push_back(delay);
    }

    /// Make the next call fail in transport with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().failures.push_back(message.into());
    }

    /// Make the next mutating call answer with an application error
    pub fn reject_next(&self, message: impl Into<String>) {
        self.lock().rejections.push_back(message.into());
    }

    /// Lists currently held by the backend
    #[must_use]
    pub fn lists(&self) -> Vec<List> {
        self.lock().lists.clone()
    }

    /// Every call received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and wait out its latency
    async fn receive(&self, call: MockCall) -> Result<(), ApiError> {
        let (delay, failure) = {
            let mut backend = self.lock();
            backend.calls.push(call);
            let delay = backend.delays.pop_front().unwrap_or(backend.latency);
            (delay, backend.failures.pop_front())
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        failure.map_or(Ok(()), |message| Err(ApiError::RequestFailed(message)))
    }

    fn take_rejection(&self) -> Option<String> {
        self.lock().rejections.pop_front()
    }

    fn rejected_list(error: String) -> ListResponse {
        ListResponse {
            list: None,
            error: Some(error),
        }
    }
}

impl ListsApi for MockListsApi {
    fn fetch_lists(&self) -> ApiFuture<'_, Option<Vec<List>>> {
        Box::pin(async move {
            self.receive(MockCall::FetchLists).await?;
            Ok(Some(self.lists()))
        })
    }

    fn create_list(&self, request: NewList) -> ApiFuture<'_, ListResponse> {
        Box::pin(async move {
            self.receive(MockCall::CreateList {
                title: request.title.clone(),
            })
            .await?;

            if let Some(error) = self.take_rejection() {
                return Ok(Self::rejected_list(error));
            }

            let mut backend = self.lock();
            if backend.lists.iter().any(|l| l.title == request.title) {
                return Ok(Self::rejected_list("List already exists".to_string()));
            }

            let mut list = List::new(backend.next_id(), request.title);
            list.recipes.extend(request.recipe);
            backend.lists.push(list.clone());

            Ok(ListResponse {
                list: Some(list),
                error: None,
            })
        })
    }

    fn add_recipe(&self, list_id: ListId, recipe: Recipe) -> ApiFuture<'_, ListResponse> {
        Box::pin(async move {
            self.receive(MockCall::AddRecipe {
                list_id,
                recipe: recipe.name.clone(),
            })
            .await?;

            if let Some(error) = self.take_rejection() {
                return Ok(Self::rejected_list(error));
            }

            let mut backend = self.lock();
            let Some(list) = backend.list_mut(list_id) else {
                return Ok(Self::rejected_list("List not found".to_string()));
            };
            if recipe.slug().is_some_and(|slug| list.contains(slug)) {
                return Ok(Self::rejected_list("Recipe already in list".to_string()));
            }

            list.recipes.push(recipe);

            Ok(ListResponse {
                list: Some(list.clone()),
                error: None,
            })
        })
    }

    fn remove_recipe(
        &self,
        list_id: ListId,
        recipe_slug: String,
    ) -> ApiFuture<'_, ListsResponse> {
        Box::pin(async move {
            self.receive(MockCall::RemoveRecipe {
                list_id,
                recipe_slug: recipe_slug.clone(),
            })
            .await?;

            if let Some(error) = self.take_rejection() {
                return Ok(ListsResponse {
                    lists: None,
                    error: Some(error),
                });
            }

            let mut backend = self.lock();
            let Some(list) = backend.list_mut(list_id) else {
                return Ok(ListsResponse {
                    lists: None,
                    error: Some("List not found".to_string()),
                });
            };
            list.recipes
                .retain(|recipe| recipe.slug() != Some(recipe_slug.as_str()));

            Ok(ListsResponse {
                lists: Some(backend.lists.clone()),
                error: None,
            })
        })
    }
}

impl RecipesApi for MockListsApi {
    fn fetch_recipes(&self) -> ApiFuture<'_, Vec<Recipe>> {
        Box::pin(async move {
            self.receive(MockCall::FetchRecipes).await?;
            Ok(self.lock().recipes.clone())
        })
    }

    fn fetch_recipe(&self, slug: String) -> ApiFuture<'_, Recipe> {
        Box::pin(async move {
            self.receive(MockCall::FetchRecipe { slug: slug.clone() })
                .await?;

            self.lock()
                .recipes
                .iter()
                .find(|recipe| recipe.slug() == Some(slug.as_str()))
                .cloned()
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    message: format!("Recipe {slug} not found"),
                })
        })
    }
}
