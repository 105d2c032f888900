use anyhow::{anyhow, Context, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub github_token: Option<String>,
    pub port: u16,
    pub claude_model: String,
    pub claude_max_tokens: u32,
    pub gemini_model: String,
    pub gemini_max_tokens: u32,
    /// Prefix for generated repository names; a timestamp and random suffix are appended.
    pub repo_prefix: String,
    pub repo_settle_delay_ms: u64,
    pub file_write_delay_ms: u64,
    pub license_key_count: usize,
    pub use_mock: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            gemini_api_key: None,
            github_token: None,
            port: 3000,
            claude_model: "claude-sonnet-4-20250514".to_string(),
            claude_max_tokens: 8000,
            gemini_model: "gemini-1.5-flash".to_string(),
            gemini_max_tokens: 8192,
            repo_prefix: "fabrica-app".to_string(),
            repo_settle_delay_ms: 2000,
            file_write_delay_ms: 500,
            license_key_count: 10,
            use_mock: false,
        }
    }
}

impl Config {
    /// Load configuration from file, then apply environment variables on top
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            info!("No config file found, using defaults");
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    /// Environment variables override the config file. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("ANTHROPIC_API_KEY") {
            self.anthropic_api_key = Some(key);
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(token) = get("GITHUB_TOKEN") {
            self.github_token = Some(token);
        }
        if let Some(port) = get("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid PORT value: {}", port))?;
        }
        if let Some(model) = get("FABRICA_CLAUDE_MODEL") {
            self.claude_model = model;
        }
        if let Some(model) = get("FABRICA_GEMINI_MODEL") {
            self.gemini_model = model;
        }
        if lookup("FABRICA_USE_MOCK").is_some() {
            self.use_mock = true;
        }

        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".fabrica"))
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }

    pub fn show_config_info(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        println!("Configuration file: {}", config_path.display());
        println!(
            "Status: {}",
            if config_path.exists() { "Found" } else { "Not found (using defaults)" }
        );

        let set = |value: &Option<String>| if value.is_some() { "Set" } else { "Not set" };
        println!("Anthropic API key: {}", set(&self.anthropic_api_key));
        println!("Gemini API key: {}", set(&self.gemini_api_key));
        println!("GitHub token: {}", set(&self.github_token));
        println!("Port: {}", self.port);
        println!("Models: {} / {}", self.claude_model, self.gemini_model);
        println!("Mock mode: {}", self.use_mock);

        println!("\nCredentials are read from the environment:");
        println!("  export ANTHROPIC_API_KEY=<your-key>");
        println!("  export GEMINI_API_KEY=<your-key>");
        println!("  export GITHUB_TOKEN=<your-token>");

        Ok(())
    }
}
