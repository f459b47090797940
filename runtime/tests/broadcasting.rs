//! Integration tests for Store action broadcasting
//!
//! Covers the request/response pattern the lists store is built on: send a
//! command carrying a correlation id, then wait for the result action with
//! the same id. Observers on the broadcast may lag; waiters never do.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use recipe_lists_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use recipe_lists_runtime::{Store, StoreConfig};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::JoinSet;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Start a request that answers after `delay_ms`
    Request { id: u64, delay_ms: u64 },
    /// Result of a request
    Answered { id: u64 },
    /// Start a three-step chain
    StartChain { id: u64 },
    /// One step of a chain finished
    StepDone { id: u64, step: u32 },
    /// The chain finished
    ChainDone { id: u64 },
}

#[derive(Debug, Clone, Default)]
struct TestState {
    in_flight: u32,
    answered: Vec<u64>,
    steps: Vec<u32>,
}

#[derive(Clone)]
struct TestReducer;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Request { id, delay_ms } => {
                state.in_flight += 1;
                smallvec![Effect::Future(Box::pin(async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Some(TestAction::Answered { id })
                }))]
            },
            TestAction::Answered { id } => {
                state.in_flight -= 1;
                state.answered.push(id);
                SmallVec::new()
            },
            TestAction::StartChain { id } => smallvec![Effect::Future(Box::pin(async move {
                Some(TestAction::StepDone { id, step: 1 })
            }))],
            TestAction::StepDone { id, step } => {
                state.steps.push(step);
                let next = if step < 3 {
                    TestAction::StepDone { id, step: step + 1 }
                } else {
                    TestAction::ChainDone { id }
                };
                smallvec![Effect::Future(Box::pin(async move { Some(next) }))]
            },
            TestAction::ChainDone { .. } => SmallVec::new(),
        }
    }
}

fn store() -> Store<TestState, TestAction, (), TestReducer> {
    Store::new(TestState::default(), TestReducer, ())
}

// ============================================================================
// Tests
// ============================================================================

/// Each waiter receives the answer carrying its own id, whatever the
/// completion order.
#[tokio::test]
async fn waiters_match_on_correlation_id() {
    let store = store();

    let slow = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .send_and_wait(TestAction::Request { id: 1, delay_ms: 60 }, |a| {
                    matches!(a, TestAction::Answered { id: 1 })
                })
                .await
        }
    });
    let fast = store
        .send_and_wait(TestAction::Request { id: 2, delay_ms: 5 }, |a| {
            matches!(a, TestAction::Answered { id: 2 })
        })
        .await
        .unwrap();

    assert_eq!(fast, TestAction::Answered { id: 2 });
    assert_eq!(slow.await.unwrap().unwrap(), TestAction::Answered { id: 1 });
    assert_eq!(store.state(|s| s.answered.clone()).await, vec![2, 1]);
}

/// The matching action has already been reduced when the waiter wakes.
#[tokio::test]
async fn broadcast_follows_reduction() {
    let store = store();

    store
        .send_and_wait(TestAction::Request { id: 7, delay_ms: 0 }, |a| {
            matches!(a, TestAction::Answered { id: 7 })
        })
        .await
        .unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(state.in_flight, 0);
    assert_eq!(state.answered, vec![7]);
}

/// Waiting on the end of a chain covers every intermediate step.
#[tokio::test]
async fn wait_spans_chained_effects() {
    let store = store();

    let done = store
        .send_and_wait(TestAction::StartChain { id: 3 }, |a| {
            matches!(a, TestAction::ChainDone { id: 3 })
        })
        .await
        .unwrap();

    assert_eq!(done, TestAction::ChainDone { id: 3 });
    assert_eq!(store.state(|s| s.steps.clone()).await, vec![1, 2, 3]);
}

/// Every waiter settles even when far more results are produced than the
/// action broadcast can buffer.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn waiters_settle_beyond_broadcast_capacity() {
    let config = StoreConfig::default().with_broadcast_capacity(1);
    let store = Store::with_config(TestState::default(), TestReducer, (), config);

    let mut waiters = JoinSet::new();
    for id in 0..500 {
        let store = store.clone();
        waiters.spawn(async move {
            store
                .send_and_wait(TestAction::Request { id, delay_ms: 0 }, move |a| {
                    *a == TestAction::Answered { id }
                })
                .await
        });
    }

    let settled = tokio::time::timeout(Duration::from_secs(10), async {
        let mut settled = 0;
        while let Some(result) = waiters.join_next().await {
            assert!(matches!(result.unwrap(), Ok(TestAction::Answered { .. })));
            settled += 1;
        }
        settled
    })
    .await
    .expect("waiters hung after their results were reduced");

    assert_eq!(settled, 500);
    assert_eq!(store.state(|s| s.answered.len()).await, 500);
    assert_eq!(store.waiting(), 0);
}

/// Subscribers see actions produced by effects, never the commands sent in.
#[tokio::test]
async fn subscribers_see_only_effect_actions() {
    let store = store();
    let mut rx = store.subscribe_actions();

    let mut handle = store.send(TestAction::StartChain { id: 9 }).await.unwrap();
    handle.wait().await;

    let mut received = Vec::new();
    while let Ok(action) = rx.try_recv() {
        received.push(action);
    }

    assert_eq!(
        received,
        vec![
            TestAction::StepDone { id: 9, step: 1 },
            TestAction::StepDone { id: 9, step: 2 },
            TestAction::StepDone { id: 9, step: 3 },
            TestAction::ChainDone { id: 9 },
        ]
    );
}

/// A slow subscriber lags instead of blocking the store.
#[tokio::test]
async fn lagging_subscriber_does_not_block_store() {
    let config = StoreConfig::default().with_broadcast_capacity(4);
    let store = Store::with_config(TestState::default(), TestReducer, (), config);
    let mut rx = store.subscribe_actions();

    for id in 0..20 {
        let mut handle = store
            .send(TestAction::Request { id, delay_ms: 0 })
            .await
            .unwrap();
        handle.wait().await;
    }

    assert_eq!(store.state(|s| s.answered.len()).await, 20);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(_))));
}
