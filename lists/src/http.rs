//! `reqwest` implementation of the backend API

use crate::api::{ApiFuture, ListResponse, ListsApi, ListsResponse, NewList, RecipesApi};
use crate::config::ListsConfig;
use crate::error::ApiError;
use crate::types::{List, ListId, Recipe};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A decoded body that can say whether it answers the request
///
/// Error statuses are only passed through as responses when the body is a
/// real answer: a payload or a non-empty application error.
trait Answer {
    fn is_answer(&self) -> bool;
}

impl Answer for ListResponse {
    fn is_answer(&self) -> bool {
        self.list.is_some() || self.rejection().is_some()
    }
}

impl Answer for ListsResponse {
    fn is_answer(&self) -> bool {
        self.lists.is_some() || self.rejection().is_some()
    }
}

impl Answer for Option<Vec<List>> {
    fn is_answer(&self) -> bool {
        self.is_some()
    }
}

impl Answer for Vec<Recipe> {
    fn is_answer(&self) -> bool {
        true
    }
}

impl Answer for Recipe {
    fn is_answer(&self) -> bool {
        true
    }
}

/// HTTP client for the recipe lists backend
///
/// Bodies are decoded as JSON even when the status is not a success, so an
/// application error returned with a 4xx status still reaches the caller as
/// a response. Error statuses whose body carries neither a payload nor an
/// application error become [`ApiError::Status`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    request_delay: Duration,
}

impl HttpApi {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] if the HTTP client cannot be built
    /// (for example when the TLS backend fails to initialize).
    pub fn new(config: &ListsConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_api_url.clone(),
            request_delay: config.request_delay,
        })
    }

    /// The base URL requests are made against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request after the configured delay and decode its JSON body
    async fn execute<T>(&self, request: RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Answer,
    {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        // An empty body decodes like `null`, so optional payloads read as absent.
        let json = if body.trim().is_empty() { "null" } else { body.as_str() };

        let decoded = serde_json::from_str::<T>(json);
        if status.is_success() {
            return decoded.map_err(|e| ApiError::ResponseParseFailed(e.to_string()));
        }

        match decoded {
            Ok(value) if value.is_answer() => {
                tracing::warn!(status = status.as_u16(), "Backend answered with error status");
                Ok(value)
            },
            _ => Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            }),
        }
    }
}

impl ListsApi for HttpApi {
    fn fetch_lists(&self) -> ApiFuture<'_, Option<Vec<List>>> {
        Box::pin(async move {
            let url = self.endpoint(&["lists"])?;
            tracing::debug!(%url, "GET lists");
            self.execute(self.client.get(url)).await
        })
    }

    fn create_list(&self, request: NewList) -> ApiFuture<'_, ListResponse> {
        Box::pin(async move {
            let url = self.endpoint(&["lists"])?;
            tracing::debug!(%url, title = %request.title, "POST list");
            self.execute(self.client.post(url).json(&request)).await
        })
    }

    fn add_recipe(&self, list_id: ListId, recipe: Recipe) -> ApiFuture<'_, ListResponse> {
        Box::pin(async move {
            let url = self.endpoint(&["lists", &list_id.to_string()])?;
            tracing::debug!(%url, recipe = %recipe.name, "POST recipe to list");
            self.execute(self.client.post(url).json(&recipe)).await
        })
    }

    fn remove_recipe(
        &self,
        list_id: ListId,
        recipe_slug: String,
    ) -> ApiFuture<'_, ListsResponse> {
        Box::pin(async move {
            let url = self.endpoint(&["lists", &list_id.to_string(), "recipes", &recipe_slug])?;
            tracing::debug!(%url, "DELETE recipe from list");
            self.execute(self.client.delete(url)).await
        })
    }
}

impl RecipesApi for HttpApi {
    fn fetch_recipes(&self) -> ApiFuture<'_, Vec<Recipe>> {
        Box::pin(async move {
            let url = self.endpoint(&["recipes"])?;
            tracing::debug!(%url, "GET recipes");
            self.execute(self.client.get(url)).await
        })
    }

    fn fetch_recipe(&self, slug: String) -> ApiFuture<'_, Recipe> {
        Box::pin(async move {
            let url = self.endpoint(&["recipes", &slug])?;
            tracing::debug!(%url, "GET recipe");
            self.execute(self.client.get(url)).await
        })
    }
}
