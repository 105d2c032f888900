use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use fabrica::config::Config;
use fabrica::http_client::{HttpClient, HttpResponse};
use fabrica::orchestrator::AppFactory;
use fabrica::server::{build_router, AppState};
use http_body_util::BodyExt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const CLAUDE: &str = "api.anthropic.com";
const GEMINI: &str = "generativelanguage.googleapis.com";
const CREATE_REPO: &str = "api.github.com/user/repos";
const CONTENTS: &str = "/contents/";
const WORKFLOW: &str = ".github/workflows/build.yml";

const REPO_CREATED: &str = r#"{
    "name": "fabrica-app-1700000000",
    "html_url": "https://github.com/maria/fabrica-app-1700000000",
    "owner": { "login": "maria" }
}"#;

#[derive(Debug, Clone)]
struct Call {
    method: &'static str,
    url: String,
    body: serde_json::Value,
}

/// Fake network: first route whose fragment is contained in the URL answers.
#[derive(Default)]
struct FakeNetwork {
    routes: Vec<(String, HttpResponse)>,
    calls: Mutex<Vec<Call>>,
}

impl FakeNetwork {
    fn route(mut self, fragment: &str, status: u16, body: &str) -> Self {
        self.routes.push((fragment.to_string(), HttpResponse::new(status, body)));
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_to(&self, fragment: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.contains(fragment))
            .collect()
    }

    fn respond(&self, method: &'static str, url: &str, body: &serde_json::Value) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            body: body.clone(),
        });
        self.routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .ok_or_else(|| anyhow!("connection refused: {}", url))
    }
}

#[async_trait]
impl HttpClient for FakeNetwork {
    async fn post_json(&self, url: &str, _headers: &[(&str, &str)], body: &serde_json::Value) -> Result<HttpResponse> {
        self.respond("POST", url, body)
    }

    async fn put_json(&self, url: &str, _headers: &[(&str, &str)], body: &serde_json::Value) -> Result<HttpResponse> {
        self.respond("PUT", url, body)
    }
}

fn claude_reply(text: &str) -> String {
    serde_json::json!({"content": [{"type": "text", "text": text}]}).to_string()
}

fn gemini_reply(text: &str) -> String {
    serde_json::json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
}

fn test_config() -> Config {
    Config {
        anthropic_api_key: Some("sk-ant-test".to_string()),
        gemini_api_key: Some("gm-test".to_string()),
        github_token: Some("ghp_test".to_string()),
        repo_settle_delay_ms: 0,
        file_write_delay_ms: 0,
        ..Config::default()
    }
}

fn app(network: Arc<FakeNetwork>, config: &Config) -> Router {
    let factory = AppFactory::with_http_client(network, config);
    build_router(Arc::new(AppState { factory }))
}

fn generate(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/generate-app")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn decoded_content(call: &Call) -> String {
    let encoded = call.body["content"].as_str().unwrap();
    String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_lista_de_tarefas() -> Result<()> {
    let network = Arc::new(
        FakeNetwork::default()
            .route(CLAUDE, 200, &claude_reply("```dart\nvoid main() {\n  runApp(const MyApp());\n}\n```\n"))
            .route(CREATE_REPO, 201, REPO_CREATED)
            .route(CONTENTS, 201, "{}"),
    );

    let (status, body) = send(
        app(network.clone(), &test_config()),
        generate(serde_json::json!({"appIdea": "lista de tarefas", "trialDays": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["trialDays"], 5);
    assert_eq!(body["licenseKeys"].as_array().unwrap().len(), 10);
    assert_eq!(body["repoUrl"], "https://github.com/maria/fabrica-app-1700000000");
    assert_eq!(body["actionsUrl"], "https://github.com/maria/fabrica-app-1700000000/actions");

    assert_eq!(network.calls_to(CLAUDE).len(), 1);
    assert!(network.calls_to(GEMINI).is_empty());
    assert_eq!(network.calls_to(CREATE_REPO).len(), 1);

    let main_dart = network.calls_to("/contents/lib/main.dart");
    assert_eq!(main_dart.len(), 1);
    assert_eq!(main_dart[0].method, "PUT");
    assert_eq!(decoded_content(&main_dart[0]), "void main() {\n  runApp(const MyApp());\n}");

    let uploads = network.calls_to(CONTENTS);
    assert!(uploads.last().unwrap().url.ends_with(WORKFLOW));

    let readme = network.calls_to("/contents/README.md");
    assert!(decoded_content(&readme[0]).contains("Período de trial: 5 dias"));

    let prompt = network.calls_to(CLAUDE)[0].body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("_trialDays = 5;"));
    assert!(prompt.contains("lista de tarefas"));
    Ok(())
}

#[tokio::test]
async fn test_missing_app_idea_makes_no_outbound_calls() {
    let network = Arc::new(FakeNetwork::default());

    let (status, body) = send(
        app(network.clone(), &test_config()),
        generate(serde_json::json!({"trialDays": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(network.calls().is_empty());
}

#[tokio::test]
async fn test_claude_failure_falls_back_to_gemini() {
    let network = Arc::new(
        FakeNetwork::default()
            .route(CLAUDE, 529, r#"{"type":"error","error":{"type":"overloaded_error"}}"#)
            .route(GEMINI, 200, &gemini_reply("```\nvoid main() {}\n```"))
            .route(CREATE_REPO, 201, REPO_CREATED)
            .route(CONTENTS, 201, "{}"),
    );

    let (status, _) = send(
        app(network.clone(), &test_config()),
        generate(serde_json::json!({"appIdea": "calculadora"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(network.calls_to(CLAUDE).len(), 1);
    assert_eq!(network.calls_to(GEMINI).len(), 1);
    let main_dart = network.calls_to("/contents/lib/main.dart");
    assert_eq!(decoded_content(&main_dart[0]), "void main() {}");
}

#[tokio::test]
async fn test_both_providers_failing_returns_500_without_github_calls() {
    let network = Arc::new(
        FakeNetwork::default()
            .route(CLAUDE, 401, "unauthorized")
            .route(GEMINI, 500, "internal"),
    );

    let (status, body) = send(
        app(network.clone(), &test_config()),
        generate(serde_json::json!({"appIdea": "calculadora"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(body["details"].as_str().unwrap().contains("HTTP 401"));
    assert_eq!(network.calls_to(GEMINI).len(), 1);
    assert!(network.calls_to("api.github.com").is_empty());
}

#[tokio::test]
async fn test_gemini_transport_failure_keeps_key_out_of_response() {
    // No Gemini route: the fake network refuses it and echoes the URL.
    let network = Arc::new(FakeNetwork::default().route(CLAUDE, 401, "unauthorized"));
    let config = Config {
        gemini_api_key: Some("SUPER-SECRET-GEMINI-KEY".to_string()),
        ..test_config()
    };

    let (status, body) = send(
        app(network.clone(), &config),
        generate(serde_json::json!({"appIdea": "calculadora"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("gemini: request failed"));
    assert!(!details.contains("SUPER-SECRET-GEMINI-KEY"));
    assert!(network.calls_to(GEMINI).iter().all(|c| !c.url.contains("key=")));
}

#[tokio::test]
async fn test_caller_key_used_when_no_default_key() {
    let network = Arc::new(
        FakeNetwork::default()
            .route(CLAUDE, 200, &claude_reply("void main() {}"))
            .route(CREATE_REPO, 201, REPO_CREATED)
            .route(CONTENTS, 201, "{}"),
    );
    let config = Config {
        anthropic_api_key: None,
        ..test_config()
    };

    let (status, _) = send(
        app(network.clone(), &config),
        generate(serde_json::json!({"appIdea": "notas", "claudeApiKey": "sk-ant-caller"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(network.calls_to(CLAUDE).len(), 1);
    assert!(network.calls_to(GEMINI).is_empty());
}

#[tokio::test]
async fn test_repository_creation_failure_returns_500() {
    let network = Arc::new(
        FakeNetwork::default()
            .route(CLAUDE, 200, &claude_reply("void main() {}"))
            .route(CREATE_REPO, 403, r#"{"message":"Bad credentials"}"#),
    );

    let (status, body) = send(
        app(network.clone(), &test_config()),
        generate(serde_json::json!({"appIdea": "notas"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["details"].as_str().unwrap().contains("HTTP 403"));
    assert!(network.calls_to(CONTENTS).is_empty());
}

#[tokio::test]
async fn test_single_file_failure_still_reports_success() {
    let network = Arc::new(
        FakeNetwork::default()
            .route(CLAUDE, 200, &claude_reply("void main() {}"))
            .route(CREATE_REPO, 201, REPO_CREATED)
            .route("/contents/pubspec.yaml", 422, r#"{"message":"Invalid request"}"#)
            .route(CONTENTS, 201, "{}"),
    );

    let (status, body) = send(
        app(network.clone(), &test_config()),
        generate(serde_json::json!({"appIdea": "notas"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let uploads = network.calls_to(CONTENTS);
    assert!(uploads[0].url.ends_with("/contents/pubspec.yaml"));
    assert!(uploads.len() > 2);
    assert!(uploads.last().unwrap().url.ends_with(WORKFLOW));
}

#[tokio::test]
async fn test_health_endpoint() {
    let network = Arc::new(FakeNetwork::default());
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(app(network.clone(), &test_config()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(network.calls().is_empty());
}
