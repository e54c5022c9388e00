use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::openf1::DEFAULT_BASE_URL;
use crate::minisector::DEFAULT_MINISECTORS;

/// Choices offered by the front-end selection form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub seasons: Vec<i32>,
    pub tracks: Vec<String>,
    pub drivers: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            seasons: (2020..2025).collect(),
            tracks: [
                "Bahrain Grand Prix",
                "Emilia Romagna Grand Prix",
                "Spanish Grand Prix",
                "Monaco Grand Prix",
                "Azerbaijan Grand Prix",
                "French Grand Prix",
                "British Grand Prix",
                "Hungarian Grand Prix",
                "Belgian Grand Prix",
                "Dutch Grand Prix",
                "Italian Grand Prix",
                "United States Grand Prix",
                "Brazilian Grand Prix",
                "Saudi Arabian Grand Prix",
                "Abu Dhabi Grand Prix",
            ]
            .map(String::from)
            .to_vec(),
            drivers: ["VER", "LEC", "HAM", "PER", "RIC", "NOR", "SAI", "RUS", "ALO"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Service configuration, optionally loaded from a JSON file:
///
/// ```json
/// {
///   "bind_addr": "0.0.0.0:5000",
///   "cache_dir": "cache",
///   "minisectors": 25,
///   "catalog": { "seasons": [2023, 2024] }
/// }
/// ```
///
/// Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_addr: String,
    pub base_url: String,
    /// Bearer token for authenticated OpenF1 access.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// `None` disables the response cache.
    pub cache_dir: Option<PathBuf>,
    pub minisectors: u32,
    pub catalog: Catalog,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            cache_dir: Some(PathBuf::from("cache")),
            minisectors: DEFAULT_MINISECTORS,
            catalog: Catalog::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: ServiceConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config JSON in {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.minisectors > 0, "minisectors must be at least 1");
        anyhow::ensure!(!self.base_url.is_empty(), "base_url must not be empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form_catalog() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.minisectors, 25);
        assert_eq!(cfg.catalog.seasons, vec![2020, 2021, 2022, 2023, 2024]);
        assert_eq!(cfg.catalog.tracks.len(), 15);
        assert_eq!(cfg.catalog.drivers[0], "VER");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laptrace.json");
        std::fs::write(&path, r#"{"minisectors": 40, "catalog": {"seasons": [2024]}}"#).unwrap();

        let cfg = ServiceConfig::load(&path).unwrap();

        assert_eq!(cfg.minisectors, 40);
        assert_eq!(cfg.catalog.seasons, vec![2024]);
        assert_eq!(cfg.catalog.drivers.len(), 9);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_minisectors_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"minisectors": 0}"#).unwrap();

        assert!(ServiceConfig::load(&path).is_err());
    }

    #[test]
    fn test_token_never_serialized() {
        let cfg = ServiceConfig {
            api_token: Some("secret".into()),
            ..Default::default()
        };
        assert!(!serde_json::to_string(&cfg).unwrap().contains("secret"));
    }
}
