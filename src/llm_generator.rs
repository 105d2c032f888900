use crate::config::Config;
use crate::http_client::HttpClient;
use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::{info, warn};

const CLAUDE_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

static FENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+.-]*[ \t]*(?:\r?\n|$)").expect("fence pattern is valid")
});

/// Dart source returned by a provider, fences already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    pub text: String,
    /// Name of the provider that produced it.
    pub provider: &'static str,
}

/// Failure of a single provider tier. Always recoverable by the next tier.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("request failed: {0:#}")]
    Transport(anyhow::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("all providers failed: {}", summarize(.0))]
    Exhausted(Vec<(&'static str, ProviderError)>),
}

fn summarize(failures: &[(&'static str, ProviderError)]) -> String {
    if failures.is_empty() {
        return "no providers configured".to_string();
    }
    failures
        .iter()
        .map(|(name, err)| format!("{}: {}", name, err))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A text-generation backend that turns a prompt into raw text.
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Generates text for `prompt`. `credential` overrides the provider's
    /// configured key when present.
    async fn generate(&self, prompt: &str, credential: Option<&str>) -> Result<String, ProviderError>;
}

/// Removes triple-backtick fence lines (with or without a language tag) and
/// surrounding whitespace. The Dart itself is not inspected.
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_LINE.replace_all(raw.trim(), "").trim().to_string()
}

fn resolve_key<'a>(
    credential: Option<&'a str>,
    default_key: Option<&'a str>,
) -> Result<&'a str, ProviderError> {
    credential
        .or(default_key)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(ProviderError::MissingCredential)
}

fn parse_body(body: &str) -> Result<Value, ProviderError> {
    serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))
}

pub struct ClaudeProvider {
    http: Arc<dyn HttpClient>,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl ClaudeProvider {
    pub fn new(http: Arc<dyn HttpClient>, config: &Config) -> Self {
        Self {
            http,
            api_key: config.anthropic_api_key.clone(),
            model: config.claude_model.clone(),
            max_tokens: config.claude_max_tokens,
        }
    }
}

#[async_trait]
impl TextProvider for ClaudeProvider {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn generate(&self, prompt: &str, credential: Option<&str>) -> Result<String, ProviderError> {
        let api_key = resolve_key(credential, self.api_key.as_deref())?;

        let request_body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let response = self
            .http
            .post_json(
                CLAUDE_MESSAGES_URL,
                &[
                    ("x-api-key", api_key),
                    ("anthropic-version", ANTHROPIC_VERSION),
                    ("content-type", "application/json"),
                ],
                &request_body,
            )
            .await
            .map_err(ProviderError::Transport)?;

        if !response.is_success() {
            return Err(ProviderError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let value = parse_body(&response.body)?;
        value
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|item| item.get("text"))
            .and_then(|text| text.as_str())
            .map(str::to_string)
            .ok_or_else(|| ProviderError::MalformedResponse("missing content[0].text".to_string()))
    }
}

pub struct GeminiProvider {
    http: Arc<dyn HttpClient>,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl GeminiProvider {
    pub fn new(http: Arc<dyn HttpClient>, config: &Config) -> Self {
        Self {
            http,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            max_tokens: config.gemini_max_tokens,
        }
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, credential: Option<&str>) -> Result<String, ProviderError> {
        let api_key = resolve_key(credential, self.api_key.as_deref())?;
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let headers = [("content-type", "application/json"), ("x-goog-api-key", api_key)];

        let request_body = json!({
            "contents": [
                {
                    "parts": [
                        { "text": prompt }
                    ]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": self.max_tokens
            }
        });

        let response = self
            .http
            .post_json(&url, &headers, &request_body)
            .await
            .map_err(ProviderError::Transport)?;

        if !response.is_success() {
            return Err(ProviderError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let value = parse_body(&response.body)?;
        value
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|text| text.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("missing candidates[0].content.parts[0].text".to_string())
            })
    }
}

/// Offline provider returning a small fixed Flutter app (FABRICA_USE_MOCK).
pub struct MockProvider;

#[async_trait]
impl TextProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, prompt: &str, _credential: Option<&str>) -> Result<String, ProviderError> {
        let title = prompt
            .split("APP SOLICITADO:\n")
            .nth(1)
            .and_then(|rest| rest.lines().next())
            .unwrap_or("App")
            .replace('\\', "\\\\")
            .replace('$', "\\$")
            .replace('\'', "\\'");

        Ok(format!(
            "```dart
import 'package:flutter/material.dart';

void main() {{
  runApp(const MyApp());
}}

class MyApp extends StatelessWidget {{
  const MyApp({{super.key}});

  @override
  Widget build(BuildContext context) {{
    return MaterialApp(
      title: '{title}',
      theme: ThemeData(useMaterial3: true),
      home: const Scaffold(body: Center(child: Text('{title}'))),
    );
  }}
}}
```"
        ))
    }
}

/// Prioritized list of providers tried once each, in order.
pub struct ModelClient {
    tiers: Vec<Box<dyn TextProvider>>,
}

impl ModelClient {
    pub fn new(tiers: Vec<Box<dyn TextProvider>>) -> Self {
        Self { tiers }
    }

    /// Claude first, Gemini second; the mock provider alone in mock mode.
    pub fn from_config(http: Arc<dyn HttpClient>, config: &Config) -> Self {
        if config.is_mock_mode() {
            info!("Using mock provider (FABRICA_USE_MOCK)");
            return Self::new(vec![Box::new(MockProvider)]);
        }

        Self::new(vec![
            Box::new(ClaudeProvider::new(http.clone(), config)),
            Box::new(GeminiProvider::new(http, config)),
        ])
    }

    /// Tries each tier once until one succeeds. The caller credential is only
    /// offered to the first tier.
    pub async fn generate_source(
        &self,
        prompt: &str,
        primary_credential: Option<&str>,
    ) -> Result<GeneratedSource, GenerationError> {
        let mut failures = Vec::new();

        for (index, provider) in self.tiers.iter().enumerate() {
            let credential = if index == 0 { primary_credential } else { None };
            info!("Generating source with {} (tier {})", provider.name(), index + 1);

            match provider.generate(prompt, credential).await {
                Ok(raw) => {
                    let text = strip_code_fences(&raw);
                    info!(
                        "{} returned {} bytes of source",
                        provider.name(),
                        text.len()
                    );
                    return Ok(GeneratedSource {
                        text,
                        provider: provider.name(),
                    });
                }
                Err(err) => {
                    warn!("Provider {} failed: {}", provider.name(), err);
                    failures.push((provider.name(), err));
                }
            }
        }

        Err(GenerationError::Exhausted(failures))
    }
}
