//! Knowledge base search contract

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// A document indexed for search (wiki page, SOP, ticket)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub source: String,
    pub content: String,
}

impl KnowledgeDocument {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeHit {
    pub source: String,
    pub snippet: String,
    pub score: f32,
}

/// Ranked lookup over the static knowledge base
#[async_trait]
pub trait KnowledgeSearch: Send + Sync + Debug {
    /// Return at most `top_k` hits, best first. No match is an empty list.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<KnowledgeHit>, DomainError>;
}
