//! Query intents and the routing contract

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// What a chat query needs to be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Documentation, SOPs, runbooks
    Knowledge,
    /// Live metrics and system status
    Data,
    /// Both knowledge and live data
    Hybrid,
    /// Conversation that needs no tools
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Knowledge => "knowledge",
            Self::Data => "data",
            Self::Hybrid => "hybrid",
            Self::General => "general",
        }
    }

    /// Parse a classifier reply. The first known label found wins, checked
    /// in the order knowledge, data, hybrid, general.
    pub fn from_label(text: &str) -> Option<Self> {
        let upper = text.trim().to_uppercase();

        [Self::Knowledge, Self::Data, Self::Hybrid, Self::General]
            .into_iter()
            .find(|intent| upper.contains(&intent.as_str().to_uppercase()))
    }

    pub fn needs_knowledge(&self) -> bool {
        matches!(self, Self::Knowledge | Self::Hybrid)
    }

    pub fn needs_data(&self) -> bool {
        matches!(self, Self::Data | Self::Hybrid)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies a query, given the conversation so far
#[async_trait]
pub trait IntentRouter: Send + Sync + fmt::Debug {
    async fn route(&self, query: &str, history: &str) -> Intent;
}

/// Second-opinion classifier consulted when keyword heuristics are not
/// confident (typically an LLM)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IntentFallback: Send + Sync + fmt::Debug {
    async fn classify(&self, query: &str, history: &str) -> Result<Intent, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(Intent::from_label("KNOWLEDGE"), Some(Intent::Knowledge));
        assert_eq!(Intent::from_label("  data\n"), Some(Intent::Data));
        assert_eq!(Intent::from_label("Answer: HYBRID."), Some(Intent::Hybrid));
        assert_eq!(Intent::from_label("general"), Some(Intent::General));
        assert_eq!(Intent::from_label("no idea"), None);
    }

    #[test]
    fn test_tool_needs() {
        assert!(Intent::Hybrid.needs_knowledge());
        assert!(Intent::Hybrid.needs_data());
        assert!(Intent::Knowledge.needs_knowledge());
        assert!(!Intent::Knowledge.needs_data());
        assert!(!Intent::General.needs_knowledge());
        assert!(!Intent::General.needs_data());
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&Intent::Hybrid).unwrap(), "\"hybrid\"");
    }
}
