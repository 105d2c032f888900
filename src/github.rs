//! GitHub repository provisioning and file uploads.
//!
//! [`RepositoryHost`] is the seam the orchestrator and publisher depend on;
//! [`GitHubHost`] implements it over the REST API through [`HttpClient`].

use crate::config::Config;
use crate::http_client::HttpClient;
use crate::providers::{SystemTimeProvider, TimeProvider};
use crate::publisher::FilePayload;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "fabrica-de-apps";
const REPO_DESCRIPTION: &str = "App gerado pela Fábrica de Apps";

/// A freshly created remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryHandle {
    pub owner: String,
    pub name: String,
    pub url: String,
}

impl RepositoryHandle {
    /// Page listing the workflow runs that build the APK.
    pub fn actions_url(&self) -> String {
        format!("{}/actions", self.url.trim_end_matches('/'))
    }
}

/// Source-hosting operations needed to provision a generated project.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Creates an empty public repository whose name derives from `name_hint`.
    async fn create_repository(&self, name_hint: &str) -> Result<RepositoryHandle>;

    /// Creates or updates a single file on the default branch.
    async fn write_file(&self, repo: &RepositoryHandle, file: &FilePayload) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct CreatedRepo {
    name: String,
    html_url: String,
    owner: RepoOwner,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

/// Lowercase ASCII slug with single dashes, at most 40 characters.
pub fn slugify(hint: &str) -> String {
    let mut slug = String::new();
    for c in hint.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug: String = slug.chars().take(40).collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() { "app".to_string() } else { slug }
}

/// `{slug}-{timestamp}-{suffix}`. The random suffix keeps names made in the
/// same second apart.
pub fn repository_name(name_hint: &str, timestamp: u64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", slugify(name_hint), timestamp, &suffix[..6])
}

pub struct GitHubHost {
    http: Arc<dyn HttpClient>,
    token: Option<String>,
    api_url: String,
    settle_delay: Duration,
    time_provider: Box<dyn TimeProvider>,
}

impl GitHubHost {
    pub fn new(http: Arc<dyn HttpClient>, config: &Config) -> Self {
        Self::with_time_provider(http, config, Box::new(SystemTimeProvider))
    }

    /// Creates a host with a custom time provider (for testing).
    pub fn with_time_provider(
        http: Arc<dyn HttpClient>,
        config: &Config,
        time_provider: Box<dyn TimeProvider>,
    ) -> Self {
        Self {
            http,
            token: config.github_token.clone(),
            api_url: GITHUB_API_URL.to_string(),
            settle_delay: Duration::from_millis(config.repo_settle_delay_ms),
            time_provider,
        }
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| anyhow!("GitHub token not configured (set GITHUB_TOKEN)"))
    }

    fn auth_header(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.token()?))
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn create_repository(&self, name_hint: &str) -> Result<RepositoryHandle> {
        let auth = self.auth_header()?;
        let name = repository_name(name_hint, self.time_provider.now());
        info!("Creating repository {}", name);

        let response = self
            .http
            .post_json(
                &format!("{}/user/repos", self.api_url),
                &[
                    ("Authorization", auth.as_str()),
                    ("Accept", "application/vnd.github+json"),
                    ("User-Agent", USER_AGENT),
                ],
                &json!({
                    "name": name,
                    "description": REPO_DESCRIPTION,
                    "private": false,
                    "auto_init": false
                }),
            )
            .await
            .context("Failed to send create-repository request to GitHub")?;

        if !response.is_success() {
            bail!(
                "GitHub refused to create repository {} (HTTP {}): {}",
                name,
                response.status,
                response.body
            );
        }

        let created: CreatedRepo = serde_json::from_str(&response.body)
            .context("Failed to parse create-repository response from GitHub")?;

        let handle = RepositoryHandle {
            owner: created.owner.login,
            name: created.name,
            url: created.html_url,
        };
        info!("Repository created: {}", handle.url);

        if !self.settle_delay.is_zero() {
            debug!("Waiting {:?} for repository to settle", self.settle_delay);
            tokio::time::sleep(self.settle_delay).await;
        }

        Ok(handle)
    }

    async fn write_file(&self, repo: &RepositoryHandle, file: &FilePayload) -> Result<()> {
        let auth = self.auth_header()?;
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url, repo.owner, repo.name, file.path
        );

        let response = self
            .http
            .put_json(
                &url,
                &[
                    ("Authorization", auth.as_str()),
                    ("Accept", "application/vnd.github+json"),
                    ("User-Agent", USER_AGENT),
                ],
                &json!({
                    "message": format!("Add {}", file.path),
                    "content": BASE64.encode(&file.content)
                }),
            )
            .await
            .with_context(|| format!("Failed to upload {}", file.path))?;

        if !response.is_success() {
            bail!(
                "GitHub rejected {} (HTTP {}): {}",
                file.path,
                response.status,
                response.body
            );
        }

        debug!("Uploaded {}", file.path);
        Ok(())
    }
}
