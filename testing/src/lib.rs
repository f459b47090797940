//! # Recipe Lists Testing
//!
//! Testing utilities for reducers built on `recipe-lists-core`.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Effect assertion helpers
//! - Test logging setup
//!
//! ## Example
//!
//! ```ignore
//! use recipe_lists_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(ListsReducer::new())
//!     .with_env(test_environment())
//!     .given_state(ListsState::default())
//!     .when_action(ListsAction::ListsFetched { request_id, lists: Some(vec![]) })
//!     .then_state(|state| assert!(state.lists.is_empty()))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```


pub use reducer_test::{assertions, resolve_effects, ReducerTest};

/// Install a `tracing` subscriber for tests
///
/// Honors `RUST_LOG` and writes through the test harness so output only
/// shows for failing tests. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}
