//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, KnowledgeBaseSettings, LlmSettings, LogFormat, LoggingConfig, RoutingSettings,
    ServerConfig, StorageSettings, WorkflowSettings,
};
