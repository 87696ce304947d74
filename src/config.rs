use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pokedex_core::Toggles;

use crate::pager::DEFAULT_PAGE_SIZE;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address (default: "127.0.0.1")
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port number (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub items: ItemsConfig,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Remote catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_sprite_base")]
    pub sprite_base: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-request timeout in seconds; unset waits indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub toggles: Toggles,
}

fn default_api_base() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_sprite_base() -> String {
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl CatalogConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            sprite_base: default_sprite_base(),
            page_size: default_page_size(),
            timeout_secs: None,
            toggles: Toggles::default(),
        }
    }
}

/// Item list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsConfig {
    /// Start with the sample items (default: true)
    #[serde(default = "default_seed")]
    pub seed: bool,
}

fn default_seed() -> bool {
    true
}

impl Default for ItemsConfig {
    fn default() -> Self {
        Self { seed: default_seed() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            catalog: CatalogConfig::default(),
            items: ItemsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and CLI arguments
    pub fn load(
        config_path: Option<&PathBuf>,
        cli_bind: Option<&str>,
        cli_port: Option<u16>,
        cli_api_base: Option<&str>,
        cli_page_size: Option<u32>,
    ) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else if let Ok(content) = std::fs::read_to_string("pokedex.toml") {
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());

        if let Some(bind) = cli_bind {
            config.bind = bind.to_string();
        }
        if let Some(port) = cli_port {
            config.port = port;
        }
        if let Some(base) = cli_api_base {
            config.catalog.api_base = base.to_string();
        }
        if let Some(size) = cli_page_size {
            config.catalog.page_size = size;
        }

        if config.catalog.page_size == 0 {
            anyhow::bail!("catalog.page_size must be at least 1");
        }

        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = var("POKEDEX_BIND") {
            self.bind = bind;
        }
        if let Some(port) = var("POKEDEX_PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(base) = var("POKEDEX_API_BASE") {
            self.catalog.api_base = base;
        }
        if let Some(size) = var("POKEDEX_PAGE_SIZE").and_then(|s| s.parse().ok()) {
            self.catalog.page_size = size;
        }
    }
}
