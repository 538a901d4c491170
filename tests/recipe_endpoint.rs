//! End-to-end coverage of `POST /recipe` driven through the axum router
//! without a real socket, per the service design document's literal
//! end-to-end scenarios.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cookbook_recipe_service::config::{AuthConfig, ServiceConfig};
use cookbook_recipe_service::coordinator::Coordinator;
use cookbook_recipe_service::{server, AppState};
use recipe_cache::{CacheStore, Fingerprint, InMemoryCacheStore, SingleFlight};
use recipe_cleanup::CleanupEngine;
use recipe_filestore::LocalDiskFileStore;
use recipe_llm::{HttpGenerativeModel, Orchestrator};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

async fn build_state(llm_base_url: &str, data_dir: &std::path::Path) -> AppState {
    let mut config = ServiceConfig::default();
    config.auth = AuthConfig {
        tokens: vec![TOKEN.to_string()],
    };
    config.llm.base_url = llm_base_url.to_string();
    config.filestore.root_dir = data_dir.to_string_lossy().to_string();
    let config = Arc::new(config);

    let model = HttpGenerativeModel::new(
        config.llm.base_url.clone(),
        config.llm.api_key.clone(),
        config.llm.model.clone(),
    );
    let orchestrator = Arc::new(Orchestrator::new(Arc::new(model), config.llm.orchestrator.clone()));
    let cleanup = Arc::new(CleanupEngine::new(config.cleanup.clone()));
    let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
    let single_flight = Arc::new(SingleFlight::new());
    let filestore: Arc<dyn recipe_filestore::FileStore> =
        Arc::new(LocalDiskFileStore::new(config.filestore.root_dir.clone()));

    let coordinator = Arc::new(Coordinator {
        cache,
        single_flight,
        cleanup,
        orchestrator,
        filestore,
        http_client: reqwest::Client::new(),
        default_folder_name: config.filestore.default_folder_name.clone(),
        cache_enabled: config.cache.enabled,
        cache_lookup_timeout: std::time::Duration::from_millis(config.cache.lookup_timeout_ms),
        cache_save_timeout: std::time::Duration::from_millis(config.cache.save_timeout_ms),
    });

    AppState { config, coordinator }
}

fn chat_response_body(content: &str) -> Value {
    json!({
        "choices": [
            { "message": { "content": content } }
        ]
    })
}

const VALID_RECIPE_JSON: &str = r#"{
    "is_recipe": true, "schema_version": "1.0.0", "recipe_version": "1.0.0",
    "metadata": {"title": "Cookies", "source": null, "author": null, "language": "en",
                 "date_created": null, "category": [], "tags": [], "servings": 12,
                 "prep_time": null, "cook_time": null, "total_time": null,
                 "difficulty": "easy", "cover_image": null},
    "description": "", "ingredients": [{"item": "flour", "amount": "2", "unit": "cups",
    "notes": null, "optional": false, "substitutions": null, "component": "main"}],
    "equipment": [], "instructions": [{"step": 1, "description": "Bake.", "time": null,
    "temperature": null, "media": null}], "nutrition": null, "notes": "", "storage": null
}"#;

const NOT_RECIPE_JSON: &str = r#"{
    "is_recipe": false, "schema_version": "1.0.0", "recipe_version": "1.0.0",
    "metadata": {"title": "", "source": null, "author": null, "language": "en",
                 "date_created": null, "category": [], "tags": [], "servings": null,
                 "prep_time": null, "cook_time": null, "total_time": null,
                 "difficulty": "medium", "cover_image": null},
    "description": "", "ingredients": [], "equipment": [], "instructions": [],
    "nutrition": null, "notes": "", "storage": null
}"#;

fn post_recipe_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/recipe")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn happy_path_cache_hit_skips_the_model() {
    let llm = MockServer::start().await;
    // No mock registered: any call would fail fast, proving zero calls occur.
    let data_dir = tempfile::tempdir().unwrap();
    let state = build_state(&llm.uri(), data_dir.path()).await;

    let fingerprint = Fingerprint::of_url("https://ex/r1");
    let recipe: recipe_model::Recipe = serde_json::from_str(VALID_RECIPE_JSON).unwrap();
    let yaml = recipe_model::serialize(&recipe).unwrap();
    state
        .coordinator
        .cache
        .store_valid(&fingerprint, "https://ex/r1", yaml)
        .await
        .unwrap();

    let app = server::build_router(state);
    let response = app
        .oneshot(post_recipe_request(json!({"url": "https://ex/r1", "title": "Cookies"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["is_recipe"], true);
    assert!(body["storage_ref"].is_string());
}

#[tokio::test]
async fn not_a_recipe_stores_invalid_and_skips_filestore() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response_body(NOT_RECIPE_JSON)))
        .mount(&llm)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let state = build_state(&llm.uri(), data_dir.path()).await;
    let app = server::build_router(state);

    let response = app
        .oneshot(post_recipe_request(json!({
            "url": "https://ex/not-a-recipe",
            "title": "Blog post",
            "html": "<html><body><p>just a blog post</p></body></html>",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["is_recipe"], false);
    assert!(body.get("storage_ref").is_none());
    assert!(data_dir.path().read_dir().unwrap().next().is_none());
}

#[tokio::test]
async fn validation_retry_calls_the_model_exactly_twice() {
    let llm = MockServer::start().await;
    let call_count = Arc::new(AtomicUsize::new(0));
    let invalid_json = VALID_RECIPE_JSON.replace(r#""instructions": [{"step": 1, "description": "Bake.", "time": null,
    "temperature": null, "media": null}]"#, r#""instructions": []"#);

    {
        let call_count = call_count.clone();
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(move |_req: &wiremock::Request| {
                let n = call_count.fetch_add(1, Ordering::SeqCst);
                let content = if n == 0 { invalid_json.clone() } else { VALID_RECIPE_JSON.to_string() };
                ResponseTemplate::new(200).set_body_json(chat_response_body(&content))
            })
            .mount(&llm)
            .await;
    }

    let data_dir = tempfile::tempdir().unwrap();
    let state = build_state(&llm.uri(), data_dir.path()).await;
    let app = server::build_router(state);

    let response = app
        .oneshot(post_recipe_request(json!({
            "url": "https://ex/retry",
            "title": "Soup",
            "html": "<html><body><p>a soup recipe with flour and water</p></body></html>",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(call_count.load(Ordering::SeqCst), 2);
}

const TWO_RECIPES_JSON: &str = r#"[
    {"is_recipe": true, "schema_version": "1.0.0", "recipe_version": "1.0.0",
     "metadata": {"title": "Cookies", "source": null, "author": null, "language": "en",
                  "date_created": null, "category": [], "tags": [], "servings": 12,
                  "prep_time": null, "cook_time": null, "total_time": null,
                  "difficulty": "easy", "cover_image": null},
     "description": "", "ingredients": [{"item": "flour", "amount": "2", "unit": "cups",
     "notes": null, "optional": false, "substitutions": null, "component": "main"}],
     "equipment": [], "instructions": [{"step": 1, "description": "Bake.", "time": null,
     "temperature": null, "media": null}], "nutrition": null, "notes": "", "storage": null},
    {"is_recipe": true, "schema_version": "1.0.0", "recipe_version": "1.0.0",
     "metadata": {"title": "Brownies", "source": null, "author": null, "language": "en",
                  "date_created": null, "category": [], "tags": [], "servings": 9,
                  "prep_time": null, "cook_time": null, "total_time": null,
                  "difficulty": "easy", "cover_image": null},
     "description": "", "ingredients": [{"item": "cocoa", "amount": "1", "unit": "cup",
     "notes": null, "optional": false, "substitutions": null, "component": "main"}],
     "equipment": [], "instructions": [{"step": 1, "description": "Bake.", "time": null,
     "temperature": null, "media": null}], "nutrition": null, "notes": "", "storage": null}
]"#;

#[tokio::test]
async fn multi_recipe_page_persists_one_file_per_recipe() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response_body(TWO_RECIPES_JSON)))
        .mount(&llm)
        .await;

    let data_dir = tempfile::tempdir().unwrap();
    let state = build_state(&llm.uri(), data_dir.path()).await;
    let app = server::build_router(state);

    let response = app
        .oneshot(post_recipe_request(json!({
            "url": "https://ex/two-recipes",
            "title": "Dessert roundup",
            "html": "<html><body><p>two recipes: cookies and brownies</p></body></html>",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["is_recipe"], true);
    assert!(body["storage_ref"].is_string());
    let refs = body["storage_refs"].as_array().expect("storage_refs present for a multi-recipe page");
    assert_eq!(refs.len(), 2);
}

#[tokio::test]
async fn fetch_failure_with_no_html_returns_bad_gateway() {
    let llm = MockServer::start().await;
    let data_dir = tempfile::tempdir().unwrap();
    let state = build_state(&llm.uri(), data_dir.path()).await;
    let app = server::build_router(state);

    let response = app
        .oneshot(post_recipe_request(json!({
            "url": "https://nx.invalid/404",
            "title": "t",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn missing_bearer_token_is_rejected() {
    let llm = MockServer::start().await;
    let data_dir = tempfile::tempdir().unwrap();
    let state = build_state(&llm.uri(), data_dir.path()).await;
    let app = server::build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/recipe")
        .header("content-type", "application/json")
        .body(Body::from(json!({"url": "https://ex/r1", "title": "x"}).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn root_and_hello_are_public() {
    let llm = MockServer::start().await;
    let data_dir = tempfile::tempdir().unwrap();
    let state = build_state(&llm.uri(), data_dir.path()).await;
    let app = server::build_router(state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/hello/ada").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello, Cookbook user ada!");
}
