//! Chat routing infrastructure - classifiers, knowledge base, live data tools

mod data_tools;
mod http_client;
mod keyword_classifier;
mod knowledge;
mod llm_fallback;
mod router;

pub use data_tools::{SimulatedLiveData, COMPONENTS, COMPONENT_STATUSES};
pub use http_client::{HttpClient, HttpClientTrait};
pub use keyword_classifier::{KeywordIntentClassifier, DEFAULT_CONFIDENCE_THRESHOLD};
pub use knowledge::InMemoryKnowledgeSearch;
pub use llm_fallback::{LlmIntentFallback, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL};
pub use router::{ChatRouter, ChatRouting, HybridIntentRouter, DEFAULT_TIME_RANGE};
