//! Service configuration: loaded once at startup from a TOML file
//! overlaid with `COOKBOOK_`-prefixed environment variables, then
//! treated as immutable for the life of the process.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use recipe_cleanup::CleanupConfig;
use recipe_llm::OrchestratorConfig;
use serde::{Deserialize, Serialize};

use crate::args::CliArgs;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer tokens accepted as valid; the token itself is the
    /// resolved caller identity.
    pub tokens: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { tokens: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    #[serde(flatten)]
    pub orchestrator: OrchestratorConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub lookup_timeout_ms: u64,
    pub save_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lookup_timeout_ms: 200,
            save_timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilestoreConfig {
    pub root_dir: String,
    pub default_folder_name: String,
}

impl Default for FilestoreConfig {
    fn default() -> Self {
        Self {
            root_dir: "./data/recipes".to_string(),
            default_folder_name: "recipes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub cleanup: CleanupConfig,
    pub filestore: FilestoreConfig,
}

impl ServiceConfig {
    /// Loads configuration from (in ascending priority): built-in
    /// defaults, an optional TOML file, `COOKBOOK_`-prefixed
    /// environment variables, then CLI overrides for host/port.
    pub fn load(args: &CliArgs) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(ServiceConfig::default()));

        if let Some(path) = &args.config_file {
            figment = figment.merge(Toml::file(path));
        } else {
            figment = figment.merge(Toml::file("cookbook.toml"));
        }

        figment = figment.merge(Env::prefixed("COOKBOOK_").split("__"));

        let mut config: ServiceConfig = figment.extract()?;

        if let Some(host) = &args.host {
            config.server.host = host.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }

        Ok(config)
    }
}
