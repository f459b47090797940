//! Error types for the recipe lists client

use recipe_lists_runtime::StoreError;
use thiserror::Error;

/// Errors that can occur when talking to the backend
///
/// These are transport-level failures. A request the backend understood but
/// refused comes back as a response carrying an `error` string instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body was not the JSON we expected
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The backend answered with a non-success status and no usable body
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        message: String,
    },

    /// An endpoint URL could not be built from the base URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The base API URL variable is not set
    #[error(
        "The env variable {var} is missing. Copy .env.example to .env and set your own variables."
    )]
    MissingBaseApiUrl {
        /// Name of the variable that was looked up
        var: &'static str,
    },

    /// The base API URL is not an absolute http(s) URL
    #[error("Invalid base API URL {value:?}: {reason}")]
    InvalidBaseApiUrl {
        /// The configured value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The request delay is not a whole number of milliseconds
    #[error("Invalid request delay {value:?}: expected a number of milliseconds")]
    InvalidRequestDelay {
        /// The configured value
        value: String,
    },
}

/// Errors returned by [`crate::ListsStore`] itself
///
/// Failed requests are not errors at this level; they settle as
/// [`crate::Settlement::Failed`] and are recorded in the store's state.
#[derive(Debug, Error)]
pub enum ListsError {
    /// The underlying store rejected or lost the action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The HTTP client could not be constructed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A request settled with an action of the wrong kind
    #[error("Request {request_id} settled with unexpected action {action}")]
    UnexpectedOutcome {
        /// Correlation token of the request
        request_id: String,
        /// Debug rendering of the action received
        action: String,
    },
}
