//! Request flow for generating an app: prompt, model, repository, files.
//!
//! Each request walks `Idle → Generating → RepoCreating → Publishing → Done`
//! strictly in sequence. Generation and provisioning failures end in
//! `Failed`; publishing absorbs per-file errors and never fails the request.

use crate::config::Config;
use crate::github::{GitHubHost, RepositoryHost};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::license::{generate_license_keys, LicenseKey};
use crate::llm_generator::{GenerationError, ModelClient};
use crate::prompt::build_prompt;
use crate::publisher::Publisher;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_TRIAL_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Generating,
    RepoCreating,
    Publishing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Generating => "generating",
            Stage::RepoCreating => "repo-creating",
            Stage::Publishing => "publishing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub app_description: String,
    pub trial_days: u32,
    /// Overrides the configured key for the primary provider.
    pub caller_credential: Option<String>,
}

impl GenerationRequest {
    pub fn new(app_description: impl Into<String>) -> Self {
        Self {
            app_description: app_description.into(),
            trial_days: DEFAULT_TRIAL_DAYS,
            caller_credential: None,
        }
    }

    pub fn with_trial_days(mut self, trial_days: u32) -> Self {
        self.trial_days = trial_days;
        self
    }

    pub fn with_caller_credential(mut self, credential: Option<String>) -> Self {
        self.caller_credential = credential.filter(|c| !c.trim().is_empty());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    pub message: String,
    pub repo_url: String,
    pub actions_url: String,
    pub license_keys: Vec<LicenseKey>,
    pub trial_days: u32,
}

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("app description is required")]
    InvalidInput,
    #[error("code generation failed: {0}")]
    GenerationFailed(#[from] GenerationError),
    #[error("repository creation failed: {0:#}")]
    ProvisioningFailed(anyhow::Error),
}

impl FactoryError {
    /// Stage the request was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            FactoryError::InvalidInput => Stage::Idle,
            FactoryError::GenerationFailed(_) => Stage::Generating,
            FactoryError::ProvisioningFailed(_) => Stage::RepoCreating,
        }
    }
}

pub struct AppFactory {
    model: ModelClient,
    host: Arc<dyn RepositoryHost>,
    publisher: Publisher,
    repo_prefix: String,
    license_key_count: usize,
}

impl AppFactory {
    pub fn new(
        model: ModelClient,
        host: Arc<dyn RepositoryHost>,
        file_write_pause: Duration,
        config: &Config,
    ) -> Self {
        Self {
            model,
            publisher: Publisher::new(host.clone(), file_write_pause),
            host,
            repo_prefix: config.repo_prefix.clone(),
            license_key_count: config.license_key_count,
        }
    }

    /// Production wiring: one shared reqwest client for providers and GitHub.
    pub fn from_config(config: &Config) -> Self {
        let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        Self::with_http_client(http, config)
    }

    pub fn with_http_client(http: Arc<dyn HttpClient>, config: &Config) -> Self {
        let model = ModelClient::from_config(http.clone(), config);
        let host: Arc<dyn RepositoryHost> = Arc::new(GitHubHost::new(http, config));
        Self::new(
            model,
            host,
            Duration::from_millis(config.file_write_delay_ms),
            config,
        )
    }

    pub async fn generate_app(&self, request: GenerationRequest) -> Result<GenerationResult, FactoryError> {
        let mut stage = Stage::Idle;
        let description = request.app_description.trim();
        if description.is_empty() {
            return Err(FactoryError::InvalidInput);
        }

        advance(&mut stage, Stage::Generating);
        let prompt = build_prompt(description, request.trial_days);
        let source = self
            .model
            .generate_source(&prompt, request.caller_credential.as_deref())
            .await
            .map_err(|err| fail(&mut stage, FactoryError::from(err)))?;

        advance(&mut stage, Stage::RepoCreating);
        let repo = self
            .host
            .create_repository(&self.repo_prefix)
            .await
            .map_err(|err| fail(&mut stage, FactoryError::ProvisioningFailed(err)))?;

        advance(&mut stage, Stage::Publishing);
        let report = self
            .publisher
            .publish(&repo, source, description, request.trial_days)
            .await;

        advance(&mut stage, Stage::Done);
        let message = if report.is_complete() {
            "App criado com sucesso! O APK será compilado automaticamente pelo GitHub Actions.".to_string()
        } else {
            format!(
                "App criado, mas {} arquivo(s) não puderam ser enviados. Verifique o build no GitHub Actions.",
                report.failed.len()
            )
        };

        Ok(GenerationResult {
            success: true,
            message,
            actions_url: repo.actions_url(),
            repo_url: repo.url,
            license_keys: generate_license_keys(self.license_key_count),
            trial_days: request.trial_days,
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    info!("Generation stage: {} -> {}", stage, next);
    *stage = next;
}

fn fail(stage: &mut Stage, err: FactoryError) -> FactoryError {
    error!("Generation failed while {}: {}", stage, err);
    *stage = Stage::Failed;
    err
}
