use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Hosted backend used when running on the deployment host
pub const RENDER_API: &str = "https://mof-labassist-ai.onrender.com/api";
pub const LOCAL_API: &str = "http://localhost:8000/api";
pub const DEPLOY_HOST_SUFFIX: &str = "onrender.com";

/// Persisted client settings. Keys match the ones the web client kept in local storage.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(rename = "API", default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(rename = "LANG", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("mof-labassist").join("config.json"))
    }
}

/// Pick the API base URL. An explicit override is used verbatim; otherwise the
/// host decides between the hosted backend and a local development server.
pub fn resolve_api_base(override_url: Option<&str>, host: Option<&str>) -> String {
    if let Some(url) = override_url.filter(|u| !u.trim().is_empty()) {
        return url.to_string();
    }

    match host {
        Some(h) if h.trim_end_matches('.').ends_with(DEPLOY_HOST_SUFFIX) => RENDER_API.to_string(),
        _ => LOCAL_API.to_string(),
    }
}

/// The name this machine is reachable under, used for the deployment check.
pub fn current_host() -> Option<String> {
    std::env::var("LABASSIST_HOST")
        .ok()
        .or_else(|| std::env::var("HOSTNAME").ok())
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn override_wins_verbatim() {
        let base = resolve_api_base(Some("http://10.0.0.5:9000/api"), Some("app.onrender.com"));
        assert_eq!(base, "http://10.0.0.5:9000/api");
    }

    #[test]
    fn deployment_host_uses_hosted_backend() {
        assert_eq!(resolve_api_base(None, Some("mof-labassist.onrender.com")), RENDER_API);
    }

    #[test]
    fn other_hosts_use_local_backend() {
        assert_eq!(resolve_api_base(None, Some("workstation")), LOCAL_API);
        assert_eq!(resolve_api_base(None, None), LOCAL_API);
        // A blank override is treated as absent
        assert_eq!(resolve_api_base(Some("  "), None), LOCAL_API);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn save_and_load_keeps_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api: Some("http://example.test/api".to_string()),
            lang: Some("ar".to_string()),
        };
        config.save_to(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"API\""));
        assert!(raw.contains("\"LANG\""));
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
