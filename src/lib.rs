//! ChatOps Console
//!
//! Incident remediation workflow with a human approval gate, plus chat
//! intent routing for operators:
//! - Metric, log and change diagnostics feeding a root-cause synthesizer
//! - Suspend/resume at the approval gate against a durable case store
//! - Keyword and LLM intent classification over runbooks and live data

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::{CaseRecord, IntentFallback, IntentRouter, KnowledgeSearch, LiveDataSource};
use infrastructure::chatops::{
    ChatRouter, HttpClient, HybridIntentRouter, InMemoryKnowledgeSearch, KeywordIntentClassifier,
    LlmIntentFallback, SimulatedLiveData,
};
use infrastructure::incident::{
    IncidentEngineConfig, IncidentWorkflowEngine, SimulatedRemediation, SimulatedSource,
};
use infrastructure::storage::{StorageConfig, StorageFactory};
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_config = StorageConfig::from_backend(
        &config.storage.backend,
        config.storage.database_url.as_deref(),
        config.storage.max_connections,
    )?;

    info!("Storage backend: {:?}", storage_config.storage_type());

    let case_store =
        StorageFactory::create::<CaseRecord>(&storage_config, &config.storage.table_name).await?;

    let incident_engine = Arc::new(IncidentWorkflowEngine::with_config(
        case_store.clone(),
        SimulatedSource::all(),
        Arc::new(SimulatedRemediation::new()),
        IncidentEngineConfig {
            parallel_diagnostics: config.workflow.parallel_diagnostics,
        },
    ));

    let chat_router = Arc::new(create_chat_router(config)?);

    Ok(AppState::new(incident_engine, case_store, chat_router))
}

/// Build the chat router from the routing, LLM and knowledge base settings
pub fn create_chat_router(config: &AppConfig) -> anyhow::Result<ChatRouter> {
    let keywords = config
        .routing
        .use_keyword_routing
        .then(|| KeywordIntentClassifier::new(config.routing.confidence_threshold));

    let fallback: Option<Arc<dyn IntentFallback>> = if config.llm.enabled {
        let client = HttpClient::with_timeout(Duration::from_secs(config.llm.timeout_secs))?;
        let mut fallback = LlmIntentFallback::new(client, &config.llm.base_url, &config.llm.model);

        if let Some(api_key) = &config.llm.api_key {
            fallback = fallback.with_api_key(api_key);
        }

        info!(model = %config.llm.model, "LLM intent fallback enabled");
        Some(Arc::new(fallback))
    } else {
        None
    };

    let intents: Arc<dyn IntentRouter> = Arc::new(HybridIntentRouter::new(keywords, fallback));

    let knowledge: Arc<dyn KnowledgeSearch> = match &config.knowledge_base.documents_dir {
        Some(dir) => {
            let search = InMemoryKnowledgeSearch::from_dir(dir)?;
            if search.is_empty() {
                tracing::warn!(dir = %dir, "Knowledge base directory has no documents");
            }
            Arc::new(search)
        }
        None => Arc::new(InMemoryKnowledgeSearch::with_default_documents()),
    };

    let live_data: Arc<dyn LiveDataSource> = Arc::new(SimulatedLiveData::new());

    Ok(ChatRouter::new(
        intents,
        knowledge,
        live_data,
        config.knowledge_base.top_k,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_state_uses_memory_store() {
        let state = create_app_state().await.unwrap();

        assert_eq!(state.case_store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_postgres_without_url_is_rejected() {
        let mut config = AppConfig::default();
        config.storage.backend = "postgres".to_string();

        let err = create_app_state_with_config(&config).await.unwrap_err();
        assert!(err.to_string().contains("database_url"));
    }

    #[tokio::test]
    async fn test_missing_documents_dir_is_rejected() {
        let mut config = AppConfig::default();
        config.knowledge_base.documents_dir = Some("/nonexistent/chatops-docs".to_string());

        assert!(create_chat_router(&config).is_err());
    }
}
