//! Dashboard configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::map::DEFAULT_GEOMETRY_URL;

/// Configuration for the dashboard server.
#[derive(Debug, Clone, PartialEq)]
pub struct DashConfig {
    /// CSV dataset loaded at startup
    pub data_path: PathBuf,

    /// HTTP listen address
    pub addr: SocketAddr,

    /// TopoJSON URL the browser fetches map shapes from
    pub geometry_url: String,

    /// Local copy of the geometry, used to check the region join
    pub geometry_path: Option<PathBuf>,

    /// Verbose logging and request tracing
    pub debug: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/processed/extra_clean.csv"),
            addr: SocketAddr::from(([127, 0, 0, 1], 8050)),
            geometry_url: DEFAULT_GEOMETRY_URL.to_string(),
            geometry_path: None,
            debug: false,
        }
    }
}

impl DashConfig {
    /// Create config from `JOYMAP_*` environment variables with defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("JOYMAP_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }

        if let Some(addr) = lookup("JOYMAP_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|_| Error::Config(format!("Invalid JOYMAP_ADDR: {addr:?}")))?;
        }

        if let Some(url) = lookup("JOYMAP_GEOMETRY_URL") {
            config.geometry_url = url;
        }

        config.geometry_path = lookup("JOYMAP_GEOMETRY_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        if let Some(debug) = lookup("JOYMAP_DEBUG") {
            config.debug = parse_flag(&debug)
                .ok_or_else(|| Error::Config(format!("Invalid JOYMAP_DEBUG: {debug:?}")))?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(vars: &[(&str, &str)]) -> Result<DashConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, DashConfig::default());
        assert_eq!(config.addr.port(), 8050);
        assert!(!config.debug);
    }

    #[test]
    fn variables_override_defaults() {
        let config = from_map(&[
            ("JOYMAP_DATA_PATH", "/srv/happy.csv"),
            ("JOYMAP_ADDR", "0.0.0.0:9000"),
            ("JOYMAP_GEOMETRY_PATH", "/srv/world-110m.json"),
            ("JOYMAP_DEBUG", "true"),
        ])
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/srv/happy.csv"));
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.geometry_path, Some(PathBuf::from("/srv/world-110m.json")));
        assert!(config.debug);
    }

    #[test]
    fn invalid_addr_is_a_config_error() {
        let err = from_map(&[("JOYMAP_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_debug_flag_is_a_config_error() {
        let err = from_map(&[("JOYMAP_DEBUG", "maybe")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
