use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use url::Url;

pub const SETTINGS_FILE: &str = "route_planner.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    pub api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "https://openaicacllm.openai.azure.com".into(),
            deployment: "gpt-4o-mini".into(),
            api_version: "2024-08-01-preview".into(),
            api_key: None,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(SETTINGS_FILE, |key| std::env::var(key).ok())
}

/// Defaults, then the flat toml file at `path` if readable, then `env`.
pub fn load_settings_from(
    path: impl AsRef<Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path.as_ref()) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, &file_cfg),
            Err(err) => tracing::warn!(
                path = %path.as_ref().display(),
                %err,
                "ignoring unreadable settings file"
            ),
        }
    }

    apply_env(&mut settings, env);
    settings
}

fn apply_file(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("endpoint") {
        settings.endpoint = v.clone();
    }
    if let Some(v) = file_cfg.get("deployment") {
        settings.deployment = v.clone();
    }
    if let Some(v) = file_cfg.get("api_version") {
        settings.api_version = v.clone();
    }
    if let Some(v) = file_cfg.get("api_key") {
        settings.api_key = Some(v.clone());
    }
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    for key in ["ROUTE_PLANNER_ENDPOINT", "APP__ENDPOINT"] {
        if let Some(v) = env(key) {
            settings.endpoint = v;
        }
    }
    for key in ["ROUTE_PLANNER_DEPLOYMENT", "APP__DEPLOYMENT"] {
        if let Some(v) = env(key) {
            settings.deployment = v;
        }
    }
    for key in ["ROUTE_PLANNER_API_VERSION", "APP__API_VERSION"] {
        if let Some(v) = env(key) {
            settings.api_version = v;
        }
    }
    // Later keys win, matching the other settings.
    for key in ["REACT_APP_OPENAI_API_KEY", "OPENAI_API_KEY", "APP__API_KEY"] {
        if let Some(v) = env(key) {
            settings.api_key = Some(v);
        }
    }
}

/// Validated connection parameters for the completion endpoint.
#[derive(Clone)]
pub struct CompletionConfig {
    pub endpoint: Url,
    pub deployment: String,
    pub api_version: String,
    pub api_key: String,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl CompletionConfig {
    /// Refuses to build without an API key so a missing secret is reported at
    /// startup instead of as a failure on every submission.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let api_key = match settings.api_key.map(|key| key.trim().to_string()) {
            Some(key) if !key.is_empty() => key,
            _ => bail!(
                "missing completion API key; set OPENAI_API_KEY or api_key in {SETTINGS_FILE}"
            ),
        };

        let endpoint = Url::parse(settings.endpoint.trim())
            .with_context(|| format!("invalid completion endpoint '{}'", settings.endpoint))?;
        if endpoint.cannot_be_a_base() {
            bail!("completion endpoint '{endpoint}' cannot be used as a base url");
        }

        let deployment = settings.deployment.trim().to_string();
        if deployment.is_empty() {
            bail!("completion deployment name must not be empty");
        }

        Ok(Self {
            endpoint,
            deployment,
            api_version: settings.api_version.trim().to_string(),
            api_key,
        })
    }

    /// `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=..`
    pub fn chat_completions_url(&self) -> anyhow::Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("endpoint '{}' cannot be a base", self.endpoint))?
            .pop_if_empty()
            .extend(["openai", "deployments", self.deployment.as_str(), "chat", "completions"]);
        url.query_pairs_mut()
            .clear()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
