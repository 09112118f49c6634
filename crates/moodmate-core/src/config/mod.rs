use crate::error::{MoodmateError, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodmateConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub support: SupportConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub env_var: Option<String>,
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key: None,
            base_url: None,
            env_var: None,
            max_tokens: default_llm_max_tokens(),
        }
    }
}

/// A crisis line shown to users in severe distress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Helpline {
    pub region: String,
    pub number: String,
}

impl Helpline {
    pub fn new(region: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            number: number.into(),
        }
    }
}

/// Static support content: relaxation tips and crisis helplines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    #[serde(default = "default_tips")]
    pub tips: Vec<String>,
    #[serde(default = "default_helplines")]
    pub helplines: Vec<Helpline>,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            tips: default_tips(),
            helplines: default_helplines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// How many recent suggestions the mood report lists.
    #[serde(default = "default_recent_suggestions")]
    pub recent_suggestions: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            recent_suggestions: default_recent_suggestions(),
        }
    }
}

/// Valid LLM provider names.
pub const VALID_LLM_PROVIDERS: &[&str] = &["gemini", "ollama", "openai", "anthropic", "claude"];

// -- Defaults --

fn default_llm_provider() -> String {
    "gemini".to_string()
}
fn default_llm_model() -> String {
    "gemini-2.0-flash-001".to_string()
}
fn default_llm_max_tokens() -> usize {
    1024
}
fn default_greeting() -> String {
    "Hello! I'm here to listen. How are you feeling today?".to_string()
}
fn default_recent_suggestions() -> usize {
    5
}

pub fn default_tips() -> Vec<String> {
    [
        "Take 5 deep breaths. 🌬️",
        "Try a 5-min guided meditation. 🧘",
        "Go for a short walk. 🚶",
        "Write down three things you're grateful for. ✨",
        "Listen to calming music or nature sounds. 🎶",
        "Do simple stretches to release tension. 🧎",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_helplines() -> Vec<Helpline> {
    vec![
        Helpline::new("India", "9152987821"),
        Helpline::new("USA", "988"),
        Helpline::new("UK", "116 123"),
    ]
}

impl MoodmateConfig {
    /// Load configuration with three-layer TOML merge:
    /// 1. ~/.config/moodmate/config.toml (global)
    /// 2. .moodmate/config.toml (project)
    /// 3. .moodmate/config.local.toml (local, gitignored)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        Self::load_checked(project_dir).map(|(cfg, _)| cfg)
    }

    /// Like [`MoodmateConfig::load`], also returning the validation warnings
    /// for values that were repaired.
    pub fn load_checked(project_dir: Option<&Path>) -> Result<(Self, Vec<String>)> {
        Self::load_from(global_config_path().as_deref(), project_dir)
    }

    fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<(Self, Vec<String>)> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path.to_path_buf()).required(false));
            }
        }

        if let Some(dir) = project_dir {
            let project_config = dir.join(".moodmate").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            let local_config = dir.join(".moodmate").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| MoodmateError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| MoodmateError::Config(e.to_string()))?;

        let warnings = cfg.validate();
        Ok((cfg, warnings))
    }

    /// Defaults only (no files).
    pub fn default_config() -> Self {
        Self {
            llm: LlmConfig::default(),
            support: SupportConfig::default(),
            session: SessionConfig::default(),
        }
    }

    /// Validate config values, repairing bad ones and logging warnings.
    /// Lenient: it fixes values rather than rejecting the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !VALID_LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            warnings.push(format!(
                "unknown LLM provider '{}', valid: {}",
                self.llm.provider,
                VALID_LLM_PROVIDERS.join(", ")
            ));
        }

        if self.llm.max_tokens == 0 {
            warnings.push("llm.max_tokens = 0, setting to 256".to_string());
            self.llm.max_tokens = 256;
        }

        self.support.tips.retain(|t| !t.trim().is_empty());
        if self.support.tips.is_empty() {
            warnings.push("support.tips is empty, restoring built-in tips".to_string());
            self.support.tips = default_tips();
        }

        self.support
            .helplines
            .retain(|h| !h.region.trim().is_empty() && !h.number.trim().is_empty());
        if self.support.helplines.is_empty() {
            warnings.push("support.helplines is empty, restoring built-in helplines".to_string());
            self.support.helplines = default_helplines();
        }

        if self.session.recent_suggestions == 0 {
            warnings.push("session.recent_suggestions = 0, setting to 1".to_string());
            self.session.recent_suggestions = 1;
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }

    /// TOML rendering of the effective config with the API key masked.
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        shown.llm.api_key = shown.llm.api_key.as_deref().map(mask_secret);
        toml::to_string_pretty(&shown)
            .map_err(|e| MoodmateError::Config(format!("failed to render config: {e}")))
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("moodmate").join("config.toml"))
}

/// Keep the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Resolve an API key from config, a custom env var, or a default env var.
pub fn resolve_api_key(config: &LlmConfig, default_env_var: &str) -> Result<String> {
    if let Some(ref key) = config.api_key {
        if !key.is_empty() {
            return Ok(key.clone());
        }
    }

    let env_var_name = config.env_var.as_deref().unwrap_or(default_env_var);

    match std::env::var(env_var_name) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(MoodmateError::Config(format!(
            "{} LLM provider requires an API key (set llm.api_key or {})",
            config.provider, env_var_name
        ))),
    }
}
