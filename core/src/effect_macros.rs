//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use recipe_lists_core::async_effect;
///
/// async_effect! {
///     match api.fetch_lists().await {
///         Ok(lists) => Some(ListsAction::ListsFetched { request_id, lists }),
///         Err(error) => Some(ListsAction::FetchListsFailed {
///             request_id,
///             error: error.to_string(),
///         }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}
