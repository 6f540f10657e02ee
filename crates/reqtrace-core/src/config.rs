//! Configuration loader, engine tunables and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars (`APP_ENGINE__MAP_THRESHOLD=0.4`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Thresholds and limits used across the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Chunks shorter than this (trimmed, in chars) are not mined for requirements.
    pub min_chunk_chars: usize,
    /// Sentence fallback only keeps sentences longer than this.
    pub generic_sentence_min_chars: usize,
    pub chunk_size: usize,
    /// Minimum Jaccard similarity for a mapper candidate.
    pub map_threshold: f64,
    pub max_matches: usize,
    pub explicit_link_boost: f64,
    pub broad_match_penalty: f64,
    /// Keep the best sub-threshold candidate when nothing clears `map_threshold`.
    pub keep_best_weak_match: bool,
    /// Tokens a sub-threshold match must share with the test case to be kept.
    pub weak_match_min_shared_words: usize,
    /// Shared words needed by the matrix keyword rule.
    pub coverage_min_overlap: usize,
    pub excerpt_chars: usize,
    pub uncovered_report_limit: usize,
    pub query_top_k: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_chunk_chars: 50,
            generic_sentence_min_chars: 60,
            chunk_size: 300,
            map_threshold: 0.3,
            max_matches: 3,
            explicit_link_boost: 0.2,
            broad_match_penalty: 0.8,
            keep_best_weak_match: true,
            weak_match_min_shared_words: 2,
            coverage_min_overlap: 3,
            excerpt_chars: 200,
            uncovered_report_limit: 10,
            query_top_k: 3,
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("map_threshold", self.map_threshold),
            ("explicit_link_boost", self.explicit_link_boost),
            ("broad_match_penalty", self.broad_match_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        for (name, value) in [
            ("min_chunk_chars", self.min_chunk_chars),
            ("chunk_size", self.chunk_size),
            ("max_matches", self.max_matches),
            ("excerpt_chars", self.excerpt_chars),
            ("query_top_k", self.query_top_k),
            ("coverage_min_overlap", self.coverage_min_overlap),
            ("uncovered_report_limit", self.uncovered_report_limit),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Self::defaults().merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.engine()?.validate()?;
        Ok(config)
    }

    /// Build from an inline TOML document layered over the defaults.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let config = Self { figment: Self::defaults().merge(Toml::string(toml)) };
        config.engine()?.validate()?;
        Ok(config)
    }

    fn defaults() -> Figment {
        Figment::new().merge(Serialized::default("engine", EngineSettings::default()))
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn engine(&self) -> Result<EngineSettings> {
        self.figment
            .extract_inner("engine")
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
