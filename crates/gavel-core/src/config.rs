//! TOML configuration with `GAVEL_*` environment overrides.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Claude,
    #[default]
    OpenAi,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub embedding_model: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 2000,
            embedding_model: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Classifications below this confidence do not count as present
    /// during checklist validation.
    pub presence_threshold: f64,
    /// Upper bound on any single LLM-assisted step before the pipeline
    /// falls back to rule-only results.
    pub generation_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            presence_threshold: 0.5,
            generation_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("GAVEL_LLM_PROVIDER") {
            match v.to_lowercase().as_str() {
                "claude" => self.llm.provider = ProviderKind::Claude,
                "openai" => self.llm.provider = ProviderKind::OpenAi,
                _ => tracing::warn!("ignoring invalid GAVEL_LLM_PROVIDER value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("GAVEL_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("GAVEL_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("GAVEL_LLM_MAX_TOKENS")
            && let Ok(n) = v.parse::<u32>()
        {
            self.llm.max_tokens = n;
        }
        if let Ok(v) = std::env::var("GAVEL_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = Some(v);
        }
        if let Ok(v) = std::env::var("GAVEL_RETRIEVAL_TOP_K")
            && let Ok(k) = v.parse::<usize>()
        {
            self.retrieval.top_k = k;
        }
        if let Ok(v) = std::env::var("GAVEL_PRESENCE_THRESHOLD")
            && let Ok(t) = v.parse::<f64>()
        {
            self.analysis.presence_threshold = t;
        }
        if let Ok(v) = std::env::var("GAVEL_GENERATION_TIMEOUT_SECS")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.analysis.generation_timeout_secs = secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.retrieval.top_k, 3);
        assert!((config.analysis.presence_threshold - 0.5).abs() < 1e-9);
        assert_eq!(config.analysis.generation_timeout_secs, 30);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = Config::load(Path::new("/nonexistent/gavel.toml")).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gavel.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[llm]\nprovider = \"claude\"\nmodel = \"claude-sonnet-4-5\"\n\n[analysis]\npresence_threshold = 0.6"
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::Claude);
        assert_eq!(config.llm.model, "claude-sonnet-4-5");
        assert!((config.analysis.presence_threshold - 0.6).abs() < 1e-9);
        assert_eq!(config.retrieval.top_k, 3);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gavel.toml");
        std::fs::write(&path, "llm = not toml").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
