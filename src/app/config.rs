// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::data_path::resolve_required_data_path;
use crate::domain::constants::{
    CHAIN_ETHEREUM, DEFAULT_BATCH_TIMEOUT, DEFAULT_MULTICALL_BATCH_SIZE, DEFAULT_ROUTE_CACHE_TTL,
};
use crate::domain::error::AppError;
use crate::services::routing::optimizer::RoutingOptions;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default)]
    pub log_json: bool,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    pub http_providers: Option<HashMap<String, String>>,
    pub address_registry_path: Option<String>,
    pub data_dir: Option<String>,

    // Routing
    #[serde(default = "default_multicall_batch_size")]
    pub multicall_batch_size: usize,
    #[serde(default = "default_route_cache_ttl_secs")]
    pub route_cache_ttl_secs: u64,
    /// Per-batch timeout; 0 waits indefinitely.
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,
    /// Check at startup that configured quoters/routers have code.
    #[serde(default = "default_true")]
    pub validate_contracts: bool,
}

// Defaults
fn default_debug() -> bool {
    false
}
fn default_true() -> bool {
    true
}
fn default_chain_id() -> u64 {
    CHAIN_ETHEREUM
}
fn default_multicall_batch_size() -> usize {
    DEFAULT_MULTICALL_BATCH_SIZE
}
fn default_route_cache_ttl_secs() -> u64 {
    DEFAULT_ROUTE_CACHE_TTL.as_secs()
}
fn default_batch_timeout_ms() -> u64 {
    DEFAULT_BATCH_TIMEOUT.as_millis() as u64
}

/// Profiles probed, in order, for `THIS_ACTIVE = true` when no path is given.
const PROFILE_FILES: [&str; 4] = [
    "config.prod.toml",
    "config.dev.toml",
    "config.example.toml",
    "config.toml",
];

fn trimmed(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Env value first, then the file setting; blanks count as unset.
fn env_then(key: &str, configured: Option<&str>) -> Option<String> {
    trimmed(std::env::var(key).ok().as_deref()).or_else(|| trimmed(configured))
}

impl GlobalSettings {
    /// Precedence: CLI overrides (applied by the caller) > env and `.env` >
    /// the selected profile file.
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let profile = match path {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => active_profile(Path::new(".")),
        };
        let file_source = match &profile {
            Some(p) => File::from(p.as_path()).required(true),
            None => File::with_name("config").required(false),
        };
        let settings: GlobalSettings = Config::builder()
            .add_source(file_source)
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.multicall_batch_size == 0 {
            return Err(AppError::Config(
                "multicall_batch_size must be at least 1".to_string(),
            ));
        }
        if self.route_cache_ttl_secs == 0 {
            tracing::warn!(
                target: "config",
                "route_cache_ttl_secs is 0; every lookup will hit the network"
            );
        }
        Ok(())
    }

    /// Resolved registry override path, if one is configured. Must exist.
    pub fn address_registry_path(&self) -> Result<Option<String>, AppError> {
        let Some(raw) = env_then("ADDRESS_REGISTRY_PATH", self.address_registry_path.as_deref())
        else {
            return Ok(None);
        };
        let data_dir = env_then("DATA_DIR", self.data_dir.as_deref());
        let resolved = resolve_required_data_path(&raw, data_dir.as_deref())?;
        Ok(Some(resolved.to_string_lossy().into_owned()))
    }

    /// RPC URL for `chain_id`: the `http_providers` map, then
    /// `http_provider_<chain>`, then `http_provider`.
    pub fn get_http_provider(&self, chain_id: u64) -> Result<String, AppError> {
        let mapped = self
            .http_providers
            .as_ref()
            .and_then(|urls| urls.get(&chain_id.to_string()))
            .and_then(|url| trimmed(Some(url)));
        mapped
            .or_else(|| env_then(&format!("http_provider_{chain_id}"), None))
            .or_else(|| env_then("http_provider", None))
            .ok_or_else(|| {
                AppError::Config(format!("No HTTP RPC URL configured for chain {chain_id}"))
            })
    }

    pub fn routing_options(&self) -> RoutingOptions {
        RoutingOptions {
            batch_size: self.multicall_batch_size.max(1),
            batch_timeout: (self.batch_timeout_ms > 0)
                .then(|| Duration::from_millis(self.batch_timeout_ms)),
            cache_ttl: Duration::from_secs(self.route_cache_ttl_secs),
        }
    }
}

/// First profile under `dir` marked `THIS_ACTIVE = true`: the well-known
/// names first, then any other `config.*.toml`.
fn active_profile(dir: &Path) -> Option<PathBuf> {
    let known = PROFILE_FILES.iter().map(|name| dir.join(name));
    let mut others: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with("config.") && n.ends_with(".toml"))
                })
                .collect()
        })
        .unwrap_or_default();
    others.sort();
    known.chain(others).find(|p| is_marked_active(p))
}

fn is_marked_active(path: &Path) -> bool {
    path.is_file()
        && Config::builder()
            .add_source(File::from(path))
            .build()
            .and_then(|cfg| cfg.get_bool("THIS_ACTIVE"))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn base_settings() -> GlobalSettings {
        GlobalSettings {
            debug: default_debug(),
            log_json: false,
            chain_id: default_chain_id(),
            http_providers: None,
            address_registry_path: None,
            data_dir: None,
            multicall_batch_size: default_multicall_batch_size(),
            route_cache_ttl_secs: default_route_cache_ttl_secs(),
            batch_timeout_ms: default_batch_timeout_ms(),
            validate_contracts: default_true(),
        }
    }

    #[test]
    fn defaults_match_routing_constants() {
        let options = base_settings().routing_options();
        assert_eq!(options.batch_size, 15);
        assert_eq!(options.cache_ttl, Duration::from_secs(600));
        assert_eq!(options.batch_timeout, Some(DEFAULT_BATCH_TIMEOUT));
    }

    #[test]
    fn zero_timeout_disables_batch_deadline() {
        let mut settings = base_settings();
        settings.batch_timeout_ms = 0;
        assert_eq!(settings.routing_options().batch_timeout, None);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut settings = base_settings();
        settings.multicall_batch_size = 0;
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn http_provider_prefers_configured_map() {
        let mut settings = base_settings();
        settings.http_providers = Some(HashMap::from([(
            "8453".to_string(),
            "http://base.example".to_string(),
        )]));
        assert_eq!(
            settings.get_http_provider(8453).expect("configured"),
            "http://base.example"
        );
    }

    #[test]
    fn missing_http_provider_is_config_error() {
        let _env_lock = env_lock_guard();
        let old_chain = std::env::var("http_provider_424242").ok();
        let old_generic = std::env::var("http_provider").ok();
        unsafe {
            std::env::remove_var("http_provider_424242");
            std::env::remove_var("http_provider");
        }

        let err = base_settings().get_http_provider(424242).unwrap_err();
        match err {
            AppError::Config(msg) => assert!(msg.contains("424242")),
            other => panic!("Unexpected error variant: {other:?}"),
        }

        if let Some(v) = old_chain {
            unsafe { std::env::set_var("http_provider_424242", v) };
        }
        if let Some(v) = old_generic {
            unsafe { std::env::set_var("http_provider", v) };
        }
    }

    #[test]
    fn active_profile_requires_marker() {
        let dir = std::env::temp_dir().join(format!("router-profiles-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        fs::write(dir.join("config.toml"), "THIS_ACTIVE = false\nchain_id = 1\n").expect("write");
        assert_eq!(active_profile(&dir), None);

        fs::write(dir.join("config.staging.toml"), "THIS_ACTIVE = true\nchain_id = 10\n")
            .expect("write");
        assert_eq!(active_profile(&dir), Some(dir.join("config.staging.toml")));

        fs::write(dir.join("config.dev.toml"), "THIS_ACTIVE = true\n").expect("write");
        assert_eq!(active_profile(&dir), Some(dir.join("config.dev.toml")));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_registry_file_is_config_error() {
        let _env_lock = env_lock_guard();
        let old = std::env::var("ADDRESS_REGISTRY_PATH").ok();
        unsafe { std::env::remove_var("ADDRESS_REGISTRY_PATH") };

        let mut settings = base_settings();
        assert_eq!(settings.address_registry_path().expect("none"), None);
        settings.address_registry_path = Some("/definitely/not/here.json".to_string());
        assert!(matches!(
            settings.address_registry_path(),
            Err(AppError::Config(_))
        ));

        if let Some(v) = old {
            unsafe { std::env::set_var("ADDRESS_REGISTRY_PATH", v) };
        }
    }
}
