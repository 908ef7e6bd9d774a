//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use skillvet_core::engine::InterviewConfig;
use skillvet_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;

/// Configuration for a single provider.
///
/// Note: custom Debug impl masks API keys to prevent accidental exposure in
/// logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Anthropic {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Whether this config carries a usable (non-empty) API key.
    pub fn has_credentials(&self) -> bool {
        match self {
            ProviderConfig::Gemini { api_key, .. } | ProviderConfig::Anthropic { api_key, .. } => {
                !api_key.trim().is_empty()
            }
        }
    }
}

/// Top-level skillvet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillvetConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Output directory for session snapshots and reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Interview behavior (question counts, difficulty domain, weights).
    #[serde(default)]
    pub interview: InterviewConfig,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-pro".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./skillvet-sessions")
}

impl Default for SkillvetConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            output_dir: default_output_dir(),
            interview: InterviewConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `skillvet.toml` in the current directory
/// 2. `~/.config/skillvet/config.toml`
///
/// Environment variable overrides: `GEMINI_API_KEY`, `ANTHROPIC_API_KEY`.
pub fn load_config() -> Result<SkillvetConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SkillvetConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("skillvet.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<SkillvetConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SkillvetConfig::default(),
    };

    // Apply env var overrides
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Gemini { api_key, .. }) = config.providers.get_mut("gemini") {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
        config
            .providers
            .entry("anthropic".into())
            .or_insert(ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Anthropic { api_key, .. }) =
            config.providers.get_mut("anthropic")
        {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("skillvet"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Ok(Box::new(GeminiProvider::new(api_key, base_url.clone())))
        }
        ProviderConfig::Anthropic { api_key, base_url } => {
            Ok(Box::new(AnthropicProvider::new(api_key, base_url.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SKILLVET_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SKILLVET_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SKILLVET_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_SKILLVET_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = SkillvetConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.default_model, "gemini-pro");
        assert_eq!(config.interview.max_questions, 5);
        assert_eq!(config.interview.min_questions, 3);
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "gemini"
default_model = "gemini-pro"

[providers.gemini]
type = "gemini"
api_key = "test-gemini"

[providers.anthropic]
type = "anthropic"
api_key = "test-anthropic"

[interview]
max_questions = 8
"#;
        let config: SkillvetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert!(matches!(
            config.providers.get("gemini"),
            Some(ProviderConfig::Gemini { .. })
        ));
        assert_eq!(config.interview.max_questions, 8);
        // Defaults fill the rest of the interview table.
        assert_eq!(config.interview.min_questions, 3);
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::Gemini {
            api_key: "secret-key".into(),
            base_url: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn has_credentials() {
        let empty = ProviderConfig::Gemini {
            api_key: "  ".into(),
            base_url: None,
        };
        assert!(!empty.has_credentials());
        let set = ProviderConfig::Anthropic {
            api_key: "k".into(),
            base_url: None,
        };
        assert!(set.has_credentials());
    }
}
