//! # Recipe Lists
//!
//! Client-side state for a recipe list browsing app.
//!
//! The [`ListsStore`] holds the user's lists and mediates every call that
//! changes them. Each mutating operation has its own request state
//! ([`ActionState`]) with two error channels: `error` for transport or
//! decoding failures, and `result_error` for rejections the backend sends
//! back in a response body.
//!
//! ## Architecture
//!
//! - [`reducer::ListsReducer`] turns commands into HTTP effects and applies
//!   their outcomes to [`ListsState`]
//! - [`api::ListsApi`] / [`api::RecipesApi`] abstract the backend;
//!   [`http::HttpApi`] is the `reqwest` implementation
//! - [`ListsStore`] runs the reducer in a runtime store and correlates each
//!   call with its outcome through a [`RequestId`]
//!
//! ## Example
//!
//! ```no_run
//! use recipe_lists::{ListsConfig, ListsStore, Settlement};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ListsConfig::from_env()?;
//! let store = ListsStore::from_config(&config).await?;
//! store.loaded().await;
//!
//! match store.add_list("Desserts", None).await? {
//!     Settlement::Completed(response) => println!("created {:?}", response.list),
//!     Settlement::Failed(error) => eprintln!("request failed: {error}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod mocks;
pub mod reducer;
pub mod state;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use action::{ListsAction, RequestId};
pub use api::{ListResponse, ListsApi, ListsResponse, NewList, RecipesApi};
pub use config::ListsConfig;
pub use error::{ApiError, ConfigError, ListsError};
pub use http::HttpApi;
pub use reducer::{ListsEnvironment, ListsReducer};
pub use state::{ActionState, FetchState, ListsState};
pub use store::{ListsStore, Settlement};
pub use types::{List, ListId, Recipe};
