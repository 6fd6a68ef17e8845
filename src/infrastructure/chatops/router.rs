//! Chat query routing

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::keyword_classifier::KeywordIntentClassifier;
use crate::domain::{
    DomainError, Intent, IntentFallback, IntentRouter, KnowledgeHit, KnowledgeSearch,
    LiveDataSnapshot, LiveDataSource,
};
use crate::infrastructure::observability::record_chat_query;

/// Time range used for trade volume lookups from chat
pub const DEFAULT_TIME_RANGE: &str = "today";

/// Keyword heuristics first, fallback classifier for the rest.
///
/// Without a fallback, undecided queries are routed as `hybrid`, which
/// consults every tool. A fallback error is treated the same way.
#[derive(Debug)]
pub struct HybridIntentRouter {
    keywords: Option<KeywordIntentClassifier>,
    fallback: Option<Arc<dyn IntentFallback>>,
}

impl HybridIntentRouter {
    pub fn new(
        keywords: Option<KeywordIntentClassifier>,
        fallback: Option<Arc<dyn IntentFallback>>,
    ) -> Self {
        Self { keywords, fallback }
    }

    /// Keyword routing only
    pub fn keywords_only(threshold: f64) -> Self {
        Self::new(Some(KeywordIntentClassifier::new(threshold)), None)
    }
}

#[async_trait]
impl IntentRouter for HybridIntentRouter {
    async fn route(&self, query: &str, history: &str) -> Intent {
        if let Some(intent) = self.keywords.as_ref().and_then(|k| k.classify(query)) {
            debug!(intent = %intent, "Routed by keywords");
            return intent;
        }

        let Some(fallback) = &self.fallback else {
            return Intent::Hybrid;
        };

        match fallback.classify(query, history).await {
            Ok(intent) => {
                debug!(intent = %intent, "Routed by fallback classifier");
                intent
            }
            Err(e) => {
                warn!(error = %e, "Fallback classifier failed, routing as hybrid");
                Intent::Hybrid
            }
        }
    }
}

/// What the router gathered for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRouting {
    pub intent: Intent,
    #[serde(default)]
    pub knowledge: Vec<KnowledgeHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_data: Option<LiveDataSnapshot>,
}

/// Classifies chat queries and dispatches them to the tools they need
#[derive(Debug)]
pub struct ChatRouter {
    intents: Arc<dyn IntentRouter>,
    knowledge: Arc<dyn KnowledgeSearch>,
    live_data: Arc<dyn LiveDataSource>,
    top_k: usize,
}

impl ChatRouter {
    pub fn new(
        intents: Arc<dyn IntentRouter>,
        knowledge: Arc<dyn KnowledgeSearch>,
        live_data: Arc<dyn LiveDataSource>,
        top_k: usize,
    ) -> Self {
        Self {
            intents,
            knowledge,
            live_data,
            top_k,
        }
    }

    pub async fn handle(&self, query: &str, history: &str) -> Result<ChatRouting, DomainError> {
        let intent = self.intents.route(query, history).await;
        record_chat_query(intent);

        let knowledge = if intent.needs_knowledge() {
            self.knowledge.search(query, self.top_k).await?
        } else {
            Vec::new()
        };

        let live_data = if intent.needs_data() {
            Some(self.snapshot().await?)
        } else {
            None
        };

        Ok(ChatRouting {
            intent,
            knowledge,
            live_data,
        })
    }

    async fn snapshot(&self) -> Result<LiveDataSnapshot, DomainError> {
        let (volume, status, matches) = futures::try_join!(
            self.live_data.trade_volume(DEFAULT_TIME_RANGE),
            self.live_data.system_status(None),
            self.live_data.match_count(),
        )?;

        Ok(LiveDataSnapshot {
            trade_volume: volume,
            trade_volume_unit: "USD".to_string(),
            time_range: DEFAULT_TIME_RANGE.to_string(),
            match_count: matches,
            component_status: status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chatops::MockIntentFallback;
    use crate::infrastructure::chatops::{InMemoryKnowledgeSearch, SimulatedLiveData};

    fn router_with(intents: HybridIntentRouter) -> ChatRouter {
        ChatRouter::new(
            Arc::new(intents),
            Arc::new(InMemoryKnowledgeSearch::with_default_documents()),
            Arc::new(SimulatedLiveData::new()),
            3,
        )
    }

    #[tokio::test]
    async fn test_keywords_win_without_calling_fallback() {
        let mut fallback = MockIntentFallback::new();
        fallback.expect_classify().times(0);

        let router = HybridIntentRouter::new(
            Some(KeywordIntentClassifier::default()),
            Some(Arc::new(fallback)),
        );

        let intent = router.route("Where is the deployment playbook?", "").await;
        assert_eq!(intent, Intent::Knowledge);
    }

    #[tokio::test]
    async fn test_ambiguous_query_uses_fallback() {
        let mut fallback = MockIntentFallback::new();
        fallback
            .expect_classify()
            .times(1)
            .returning(|_, _| Ok(Intent::Data));

        let router = HybridIntentRouter::new(
            Some(KeywordIntentClassifier::default()),
            Some(Arc::new(fallback)),
        );

        assert_eq!(router.route("zxcv qwerty", "").await, Intent::Data);
    }

    #[tokio::test]
    async fn test_fallback_error_routes_hybrid() {
        let mut fallback = MockIntentFallback::new();
        fallback
            .expect_classify()
            .returning(|_, _| Err(DomainError::provider("llm", "connection refused")));

        let router = HybridIntentRouter::new(None, Some(Arc::new(fallback)));

        assert_eq!(router.route("Where is the playbook?", "").await, Intent::Hybrid);
    }

    #[tokio::test]
    async fn test_disabled_keywords_send_everything_to_fallback() {
        let mut fallback = MockIntentFallback::new();
        fallback
            .expect_classify()
            .times(1)
            .returning(|_, _| Ok(Intent::General));

        let router = HybridIntentRouter::new(None, Some(Arc::new(fallback)));

        assert_eq!(
            router.route("Where is the deployment playbook?", "").await,
            Intent::General
        );
    }

    #[tokio::test]
    async fn test_knowledge_query_dispatches_to_knowledge_only() {
        let router = router_with(HybridIntentRouter::keywords_only(0.8));

        let routing = router
            .handle("Where is the deployment rollback procedure?", "")
            .await
            .unwrap();

        assert_eq!(routing.intent, Intent::Knowledge);
        assert!(!routing.knowledge.is_empty());
        assert!(routing.live_data.is_none());
    }

    #[tokio::test]
    async fn test_data_query_dispatches_to_live_data_only() {
        let router = router_with(HybridIntentRouter::keywords_only(0.8));

        let routing = router.handle("What's the trade volume right now?", "").await.unwrap();

        assert_eq!(routing.intent, Intent::Data);
        assert!(routing.knowledge.is_empty());
        let snapshot = routing.live_data.unwrap();
        assert_eq!(snapshot.component_status.len(), 3);
        assert_eq!(snapshot.time_range, DEFAULT_TIME_RANGE);
    }

    #[tokio::test]
    async fn test_general_query_calls_no_tools() {
        let router = router_with(HybridIntentRouter::keywords_only(0.8));

        let routing = router.handle("hello there, thanks!", "").await.unwrap();

        assert_eq!(routing.intent, Intent::General);
        assert!(routing.knowledge.is_empty());
        assert!(routing.live_data.is_none());
    }

    #[tokio::test]
    async fn test_undecided_without_fallback_is_hybrid() {
        let router = router_with(HybridIntentRouter::keywords_only(0.8));

        let routing = router
            .handle("Check deployment status and cpu", "")
            .await
            .unwrap();

        assert_eq!(routing.intent, Intent::Hybrid);
        assert!(routing.live_data.is_some());
    }
}
