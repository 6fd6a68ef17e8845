use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub workflow: WorkflowSettings,
    #[serde(default)]
    pub routing: RoutingSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseSettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Case store backend selection
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkflowSettings {
    #[serde(default)]
    pub parallel_diagnostics: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSettings {
    #[serde(default = "default_true")]
    pub use_keyword_routing: bool,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

/// OpenAI-compatible endpoint used as the intent fallback
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBaseSettings {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Directory of `.txt`/`.md` documents; the built-in runbooks when unset
    #[serde(default)]
    pub documents_dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            table_name: default_table_name(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            use_keyword_routing: true,
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl Default for KnowledgeBaseSettings {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            documents_dir: None,
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_table_name() -> String {
    "incident_cases".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_confidence_threshold() -> f64 {
    0.8
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_top_k() -> usize {
    3
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
