//! Fábrica de Apps - app generation backend.
//!
//! Takes a short natural-language app description, asks a text-generation
//! provider for a Flutter `lib/main.dart`, creates a GitHub repository, pushes
//! the generated source together with the project boilerplate, and lets a
//! GitHub Actions workflow build the Android APK.
//!
//! # Architecture
//!
//! - [`config`] - Configuration (credentials, port, delays), loaded once
//! - [`prompt`] - Builds the generation prompt
//! - [`llm_generator`] - Claude/Gemini providers tried in priority order
//! - [`github`] - Repository creation and file uploads
//! - [`templates`] - Static Flutter/Android project files
//! - [`publisher`] - Ordered, failure-tolerant upload with the workflow last
//! - [`license`] - Decorative license keys for the generated app
//! - [`orchestrator`] - Wires the steps into one request flow
//! - [`server`] - HTTP API
//! - [`providers`] - Shared dependency injection traits
//! - [`http_client`] - HTTP client abstraction
//!
//! # Example
//!
//! ```ignore
//! use fabrica::config::Config;
//! use fabrica::orchestrator::{AppFactory, GenerationRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let factory = AppFactory::from_config(&config);
//!
//!     let result = factory
//!         .generate_app(GenerationRequest::new("lista de tarefas").with_trial_days(5))
//!         .await?;
//!     println!("Repository: {}", result.repo_url);
//!     println!("Build: {}", result.actions_url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod github;
pub mod http_client;
pub mod license;
pub mod llm_generator;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod publisher;
pub mod server;
pub mod templates;
