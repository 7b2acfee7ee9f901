//! Top-level application configuration.
//!
//! Configuration is stored in `.rideops/config.yaml` and includes:
//! - Dispatch backend base URL and admin session token
//! - Poll intervals, cache TTL, throttle and debounce windows
//! - Routing service URL and timeout
//! - Default map view used when no rides are on screen

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RideopsError};
use crate::types::GeoPoint;

/// Session token wrapper that redacts the value when formatted.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionAuth {
    pub token: String,
}

impl fmt::Debug for SessionAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionAuth")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the dispatch backend API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Admin session token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<SessionAuth>,

    /// Routing service URL for road geometry lookups
    #[serde(default = "default_routing_url")]
    pub routing_url: String,

    /// Hard timeout for a single route lookup in seconds (default: 5)
    #[serde(default = "default_route_timeout")]
    pub route_timeout_secs: u64,

    /// Dashboard snapshot refresh interval in seconds (default: 15)
    #[serde(default = "default_dashboard_interval")]
    pub dashboard_interval_secs: u64,

    /// Unread-notification refresh interval in seconds (default: 30)
    #[serde(default = "default_unread_interval")]
    pub unread_interval_secs: u64,

    /// Read-cache time-to-live in milliseconds (default: 5000)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_ms: u64,

    /// Minimum spacing between requests to the same endpoint in
    /// milliseconds (default: 500)
    #[serde(default = "default_throttle")]
    pub throttle_ms: u64,

    /// Debounce window collapsing refresh bursts in milliseconds
    /// (default: 1000)
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Map center shown when there are no rides to fit
    #[serde(default = "default_map_center")]
    pub default_map_center: GeoPoint,

    /// Zoom level for the default map view
    #[serde(default = "default_map_zoom")]
    pub default_map_zoom: u8,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_routing_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_route_timeout() -> u64 {
    5
}

fn default_dashboard_interval() -> u64 {
    15
}

fn default_unread_interval() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    5000
}

fn default_throttle() -> u64 {
    500
}

fn default_debounce() -> u64 {
    1000
}

// Centered between Mekelle and Adigrat.
fn default_map_center() -> GeoPoint {
    GeoPoint::new(13.88, 39.46)
}

fn default_map_zoom() -> u8 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            auth: None,
            routing_url: default_routing_url(),
            route_timeout_secs: default_route_timeout(),
            dashboard_interval_secs: default_dashboard_interval(),
            unread_interval_secs: default_unread_interval(),
            cache_ttl_ms: default_cache_ttl(),
            throttle_ms: default_throttle(),
            debounce_ms: default_debounce(),
            default_map_center: default_map_center(),
            default_map_zoom: default_map_zoom(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        if let Ok(dir) = env::var("RIDEOPS_CONFIG_DIR") {
            return PathBuf::from(dir).join("config.yaml");
        }
        PathBuf::from(".rideops").join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            RideopsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RideopsError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            RideopsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Restrict to owner read/write; the file holds a session token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions).map_err(|e| {
                RideopsError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to set permissions on config at {}: {}",
                        path.display(),
                        e
                    ),
                ))
            })?;
        }

        Ok(())
    }

    /// Get the session token from the environment or the config file
    pub fn session_token(&self) -> Option<SecretString> {
        if let Ok(token) = env::var("RIDEOPS_SESSION_TOKEN")
            && !token.is_empty()
        {
            return Some(SecretString::from(token));
        }

        self.auth
            .as_ref()
            .map(|a| SecretString::from(a.token.clone()))
    }

    /// Set the session token
    pub fn set_session_token(&mut self, token: String) {
        self.auth = Some(SessionAuth { token });
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_interval_secs)
    }

    pub fn unread_interval(&self) -> Duration {
        Duration::from_secs(self.unread_interval_secs)
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_secs(self.route_timeout_secs)
    }
}

/// Expose the configured token for request headers. Kept here so callers
/// outside the gateway never need to import secrecy directly.
pub fn token_header_value(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.auth.is_none());
        assert_eq!(config.cache_ttl_ms, 5000);
        assert_eq!(config.throttle_ms, 500);
        assert_eq!(config.debounce_ms, 1000);
        assert_eq!(config.dashboard_interval_secs, 15);
        assert_eq!(config.unread_interval_secs, 30);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.set_session_token("sess_abc123".to_string());
        config.api_base_url = "https://dispatch.example.com/api".to_string();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(parsed.api_base_url, "https://dispatch.example.com/api");
        assert_eq!(parsed.auth.as_ref().unwrap().token, "sess_abc123");
    }

    #[test]
    fn test_config_partial_yaml_uses_defaults() {
        let yaml = "api_base_url: https://ops.example.com/api\n";
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.api_base_url, "https://ops.example.com/api");
        assert_eq!(config.cache_ttl_ms, 5000);
        assert_eq!(config.default_map_zoom, 10);
    }

    #[test]
    fn test_auth_debug_redacted() {
        let auth = SessionAuth {
            token: "sess_secret".to_string(),
        };
        let debug = format!("{:?}", auth);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sess_secret"));
    }

    #[test]
    #[serial]
    fn test_session_token_env_override() {
        let dir = tempfile::tempdir().unwrap();
        // SAFETY: serialized test, no concurrent env access.
        unsafe {
            env::set_var("RIDEOPS_CONFIG_DIR", dir.path());
            env::set_var("RIDEOPS_SESSION_TOKEN", "from_env");
        }

        let mut config = Config::default();
        config.set_session_token("from_file".to_string());
        let token = config.session_token().unwrap();
        assert_eq!(token.expose_secret(), "from_env");

        unsafe {
            env::remove_var("RIDEOPS_SESSION_TOKEN");
        }
        let token = config.session_token().unwrap();
        assert_eq!(token.expose_secret(), "from_file");

        unsafe {
            env::remove_var("RIDEOPS_CONFIG_DIR");
        }
    }

    #[test]
    #[serial]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        unsafe {
            env::set_var("RIDEOPS_CONFIG_DIR", dir.path());
        }

        let mut config = Config::default();
        config.dashboard_interval_secs = 7;
        config.save().unwrap();

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.dashboard_interval_secs, 7);

        unsafe {
            env::remove_var("RIDEOPS_CONFIG_DIR");
        }
    }
}
