//! Integration tests for the `reqwest` client against a stub backend

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use recipe_lists::{
    ApiError, HttpApi, List, ListId, ListsApi, ListsConfig, ListsStore, NewList, Recipe,
    RecipesApi, Settlement,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpApi {
    let config = ListsConfig::parse(&format!("{}/api", server.uri())).unwrap();
    HttpApi::new(&config).unwrap()
}

fn pancakes_json() -> serde_json::Value {
    json!({
        "Name": "Pancakes",
        "url": "https://recipes.example.com/recipes/pancakes",
        "Description": "Fluffy",
        "Author": "Ana",
        "Ingredients": ["flour", "milk", "eggs"],
        "Method": ["Mix", "Fry"]
    })
}

#[tokio::test]
async fn fetch_lists_decodes_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"listId": 1, "title": "Breakfast", "recipes": [pancakes_json()]},
            {"listId": 2, "title": "Dinner", "recipes": []}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let lists = client_for(&server).fetch_lists().await.unwrap().unwrap();

    assert_eq!(lists.len(), 2);
    assert_eq!(lists[0].recipes[0].ingredients, ["flour", "milk", "eggs"]);
    assert_eq!(lists[1], List::new(2, "Dinner"));
}

#[tokio::test]
async fn empty_body_reads_as_absent_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let lists = client_for(&server).fetch_lists().await.unwrap();

    assert!(lists.is_none());
}

#[tokio::test]
async fn create_list_posts_title_and_recipe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .and(body_json(json!({"title": "Desserts", "recipe": pancakes_json()})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "list": {"listId": 5, "title": "Desserts", "recipes": [pancakes_json()]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recipe: Recipe = serde_json::from_value(pancakes_json()).unwrap();
    let response = client_for(&server)
        .create_list(NewList {
            title: "Desserts".to_string(),
            recipe: Some(recipe),
        })
        .await
        .unwrap();

    assert_eq!(response.list.as_ref().unwrap().list_id, ListId(5));
    assert!(response.rejection().is_none());
}

#[tokio::test]
async fn add_recipe_posts_to_list_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lists/3"))
        .and(body_json(pancakes_json()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": {"listId": 3, "title": "Brunch", "recipes": [pancakes_json()]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recipe: Recipe = serde_json::from_value(pancakes_json()).unwrap();
    let response = client_for(&server)
        .add_recipe(ListId(3), recipe)
        .await
        .unwrap();

    assert_eq!(response.list.unwrap().recipes.len(), 1);
}

#[tokio::test]
async fn remove_recipe_deletes_by_slug() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/lists/3/recipes/pancakes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "lists": [{"listId": 3, "title": "Brunch", "recipes": []}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .remove_recipe(ListId(3), "pancakes".to_string())
        .await
        .unwrap();

    assert_eq!(response.lists, Some(vec![List::new(3, "Brunch")]));
}

#[tokio::test]
async fn error_status_with_envelope_is_a_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"error": "List already exists"})),
        )
        .mount(&server)
        .await;

    let response = client_for(&server)
        .create_list(NewList {
            title: "Breakfast".to_string(),
            recipe: None,
        })
        .await
        .unwrap();

    assert!(response.list.is_none());
    assert_eq!(response.rejection(), Some("List already exists"));
}

#[tokio::test]
async fn error_status_without_envelope_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server).fetch_lists().await.unwrap_err();

    let ApiError::Status { status, message } = error else {
        panic!("expected status error, got {error:?}");
    };
    assert_eq!(status, 502);
    assert!(message.contains("Bad Gateway"));
}

#[tokio::test]
async fn error_status_with_unrelated_json_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "internal error"})),
        )
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_list(NewList {
            title: "Desserts".to_string(),
            recipe: None,
        })
        .await
        .unwrap_err();

    let ApiError::Status { status, message } = error else {
        panic!("expected status error, got {error:?}");
    };
    assert_eq!(status, 500);
    assert!(message.contains("internal error"));
}

#[tokio::test]
async fn error_status_with_empty_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let error = client_for(&server).fetch_lists().await.unwrap_err();

    assert!(matches!(error, ApiError::Status { status: 503, .. }));
}

#[tokio::test]
async fn store_records_server_error_as_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "internal error"})),
        )
        .mount(&server)
        .await;

    let store = ListsStore::with_api(Arc::new(client_for(&server))).await.unwrap();
    store.loaded().await;

    let settlement = store.add_list("Desserts", None).await.unwrap();

    assert!(matches!(settlement, Settlement::Failed(_)));
    let state = store.snapshot().await;
    assert!(state.add_list.error.is_some());
    assert!(!state.add_list.is_fetching);
    assert!(state.lists.is_empty());
}

#[tokio::test]
async fn malformed_success_body_is_a_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"not": "a list"})))
        .mount(&server)
        .await;

    let error = client_for(&server).fetch_lists().await.unwrap_err();

    assert!(matches!(error, ApiError::ResponseParseFailed(_)));
}

#[tokio::test]
async fn unreachable_backend_is_a_request_failure() {
    // Grab a free port, then close it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = ListsConfig::parse(&format!("http://127.0.0.1:{port}/api")).unwrap();
    let api = HttpApi::new(&config).unwrap();

    let error = api.fetch_lists().await.unwrap_err();

    assert!(matches!(error, ApiError::RequestFailed(_)));
}

#[tokio::test]
async fn recipes_are_fetched_by_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([pancakes_json()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recipes/pancakes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pancakes_json()))
        .mount(&server)
        .await;

    let api = client_for(&server);
    let recipes = api.fetch_recipes().await.unwrap();
    let recipe = api.fetch_recipe("pancakes".to_string()).await.unwrap();

    assert_eq!(recipes, vec![recipe.clone()]);
    assert_eq!(recipe.slug(), Some("pancakes"));
    assert_eq!(recipe.author.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn request_delay_postpones_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = ListsConfig::parse(&format!("{}/api", server.uri()))
        .unwrap()
        .with_request_delay(Duration::from_millis(100));
    let api = HttpApi::new(&config).unwrap();

    let started = Instant::now();
    api.fetch_lists().await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn store_round_trip_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"listId": 1, "title": "Breakfast", "recipes": []}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "list": {"listId": 2, "title": "Desserts", "recipes": []}
        })))
        .mount(&server)
        .await;

    let store = ListsStore::with_api(Arc::new(client_for(&server))).await.unwrap();
    store.loaded().await;

    let settlement = store.add_list("Desserts", None).await.unwrap();

    assert!(matches!(settlement, Settlement::Completed(_)));
    assert_eq!(
        store.lists().await,
        vec![List::new(1, "Breakfast"), List::new(2, "Desserts")]
    );
}
