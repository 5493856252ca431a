// src/config/backend.rs
use anyhow::Context;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_BACKEND_CONFIG_PATH: &str = "config/backend.toml";

pub const ENV_BACKEND_CONFIG_PATH: &str = "FEED_BACKEND_CONFIG";
pub const ENV_MODEL_PATH: &str = "RANKING_MODEL_PATH";
pub const ENV_USE_MOCK: &str = "USE_MOCK_MODEL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendConfig {
    /// Trained checkpoint for the learned ranker. `None` means heuristic only.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Force the heuristic scorer even when a checkpoint is configured.
    #[serde(default)]
    pub use_mock: bool,
}

impl BackendConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: BackendConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading backend config from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing backend config {}", path.display()))
    }

    /// Resolve the effective config:
    /// 1) $FEED_BACKEND_CONFIG or config/backend.toml (missing file → defaults)
    /// 2) $RANKING_MODEL_PATH / $USE_MOCK_MODEL override the file
    pub fn load() -> anyhow::Result<Self> {
        let path = env::var(ENV_BACKEND_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BACKEND_CONFIG_PATH));

        let mut cfg = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Ok(p) = env::var(ENV_MODEL_PATH) {
            let p = p.trim();
            self.model_path = (!p.is_empty()).then(|| PathBuf::from(p));
        }
        if let Some(flag) = parse_flag(env::var(ENV_USE_MOCK).ok()) {
            self.use_mock = flag;
        }
    }
}

/// "true"/"1" → Some(true), "false"/"0" → Some(false), anything else → None.
fn parse_flag(raw: Option<String>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml() {
        let cfg = BackendConfig::from_toml_str(
            r#"
model_path = "models/ranker.ckpt"
use_mock = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.model_path, Some(PathBuf::from("models/ranker.ckpt")));
        assert!(cfg.use_mock);

        let empty = BackendConfig::from_toml_str("").unwrap();
        assert_eq!(empty, BackendConfig::default());
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag(Some("TRUE".into())), Some(true));
        assert_eq!(parse_flag(Some(" 1 ".into())), Some(true));
        assert_eq!(parse_flag(Some("false".into())), Some(false));
        assert_eq!(parse_flag(Some("maybe".into())), None);
        assert_eq!(parse_flag(None), None);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("backend.toml");
        fs::write(&p, "use_mock = false\n").unwrap();

        env::set_var(ENV_BACKEND_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_MODEL_PATH, "/tmp/ranker.ckpt");
        env::set_var(ENV_USE_MOCK, "true");

        let cfg = BackendConfig::load().unwrap();
        assert!(cfg.use_mock);
        assert_eq!(cfg.model_path, Some(PathBuf::from("/tmp/ranker.ckpt")));

        env::remove_var(ENV_BACKEND_CONFIG_PATH);
        env::remove_var(ENV_MODEL_PATH);
        env::remove_var(ENV_USE_MOCK);
    }

    #[serial_test::serial]
    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("backend.toml");
        fs::write(&p, "use_mock = \"yes please\"").unwrap();
        env::set_var(ENV_BACKEND_CONFIG_PATH, p.display().to_string());
        assert!(BackendConfig::load().is_err());
        env::remove_var(ENV_BACKEND_CONFIG_PATH);
    }
}
