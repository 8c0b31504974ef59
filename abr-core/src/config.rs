use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::access::Role;
use crate::error::{AbrError, Result};
use crate::table::DEFAULT_PAGE_SIZE;

/// Centralized configuration for the ABR dashboard and its preference
/// service, read from `~/.abr/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbrConfig {
    pub server: ServerSection,
    pub dashboard: DashboardSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address the preference service binds to
    pub bind: String,
    pub database_url: String,
    pub request_timeout_secs: u64,
    /// Allow any CORS origin (development only)
    pub cors_permissive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3030".to_string(),
            database_url: default_database_url(),
            request_timeout_secs: 30,
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSection {
    /// Base URL of the preference service
    pub api_url: String,
    pub user_id: String,
    pub role: Role,
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    /// Log file (stdout belongs to the terminal UI)
    pub log_file: Option<PathBuf>,
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3030".to_string(),
            user_id: "user1".to_string(),
            role: Role::Admin,
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![10, 25, 50],
            log_file: None,
        }
    }
}

impl AbrConfig {
    /// Load config from `ABR_CONFIG` or `~/.abr/config.toml`, then apply
    /// environment overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = env::var_os("ABR_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(Self::config_path);
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a specific file without environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| AbrError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| AbrError::config(format!("invalid TOML in {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Config file path: ~/.abr/config.toml
    pub fn config_path() -> PathBuf {
        abr_home().join("config.toml")
    }

    /// Default dashboard log file: ~/.abr/logs/dashboard.log
    pub fn dashboard_log_file(&self) -> PathBuf {
        self.dashboard
            .log_file
            .clone()
            .unwrap_or_else(|| abr_home().join("logs").join("dashboard.log"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("ABR_API_URL") {
            self.dashboard.api_url = url;
        }
        if let Ok(user) = env::var("ABR_USER") {
            self.dashboard.user_id = user;
        }
        if let Ok(url) = env::var("ABR_DATABASE_URL") {
            self.server.database_url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dashboard.page_size == 0 {
            return Err(AbrError::config("dashboard.page_size must be positive"));
        }
        if self.dashboard.page_size_options.contains(&0) {
            return Err(AbrError::config("dashboard.page_size_options must be positive"));
        }
        if self.dashboard.user_id.trim().is_empty() {
            return Err(AbrError::config("dashboard.user_id cannot be empty"));
        }
        Ok(())
    }
}

/// ~/.abr
fn abr_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".abr")
}

fn default_database_url() -> String {
    format!("sqlite://{}", abr_home().join("abr.db").display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AbrConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, AbrConfig::default());
        assert_eq!(config.dashboard.page_size, 10);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[dashboard]
user_id = "maria"
role = "technician"
page_size = 25

[server]
bind = "0.0.0.0:8080"
"#
        )
        .unwrap();

        let config = AbrConfig::load_from(file.path()).unwrap();
        assert_eq!(config.dashboard.user_id, "maria");
        assert_eq!(config.dashboard.role, Role::Technician);
        assert_eq!(config.dashboard.page_size, 25);
        assert_eq!(config.dashboard.api_url, "http://127.0.0.1:3030");
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout_secs, 30);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\npage_size = 0").unwrap();
        let err = AbrConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("page_size"));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\nrole = \"janitor\"").unwrap();
        assert!(matches!(
            AbrConfig::load_from(file.path()),
            Err(AbrError::Config { .. })
        ));
    }
}
