//! Application state for shared services

use std::sync::Arc;

use crate::domain::storage::Storage;
use crate::domain::{CaseRecord, IncidentEngine};
use crate::infrastructure::chatops::ChatRouter;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone, Debug)]
pub struct AppState {
    pub incident_engine: Arc<dyn IncidentEngine>,
    /// Same store the engine writes to; pinged by `/ready`
    pub case_store: Arc<dyn Storage<CaseRecord>>,
    pub chat_router: Arc<ChatRouter>,
}

impl AppState {
    pub fn new(
        incident_engine: Arc<dyn IncidentEngine>,
        case_store: Arc<dyn Storage<CaseRecord>>,
        chat_router: Arc<ChatRouter>,
    ) -> Self {
        Self {
            incident_engine,
            case_store,
            chat_router,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_state_debug_names_components() {
        let state = crate::create_app_state_with_config(&AppConfig::default())
            .await
            .unwrap();

        let rendered = format!("{:?}", state);
        assert!(rendered.starts_with("AppState"));
        assert!(rendered.contains("IncidentWorkflowEngine"));
        assert!(rendered.contains("ChatRouter"));
    }
}
