//! skillvet-providers — generative-AI provider integrations.
//!
//! Implements the core `LlmProvider` trait for Gemini and Anthropic, plus a
//! mock provider for tests. Provider failures are classified here; the core
//! recovers from all of them by falling back to its deterministic paths.

pub mod anthropic;
pub mod config;
pub mod error;
pub mod gemini;
pub mod mock;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, SkillvetConfig};
pub use error::ProviderError;
