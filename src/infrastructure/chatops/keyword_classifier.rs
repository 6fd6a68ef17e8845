//! Keyword heuristics for intent classification

use crate::domain::Intent;

/// Default share of keyword hits the winning intent must hold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

const KNOWLEDGE_KEYWORDS: &[&str] = &[
    "how to",
    "how do i",
    "deploy",
    "deployment",
    "configure",
    "configuration",
    "architecture",
    "documentation",
    "playbook",
    "sop",
    "guide",
    "tutorial",
    "setup",
    "install",
    "integration",
    "pipeline",
    "workflow",
    "procedure",
    "manual",
    "reference",
    "best practice",
    "design",
    "structure",
];

const DATA_KEYWORDS: &[&str] = &[
    "current",
    "status",
    "metric",
    "volume",
    "latency",
    "cpu",
    "memory",
    "trade",
    "match count",
    "health",
    "performance",
    "uptime",
    "throughput",
    "monitor",
    "alert",
    "error rate",
    "response time",
    "load",
    "capacity",
    "live",
    "real-time",
    "real time",
    "today",
    "now",
    "running",
];

const GENERAL_KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "thank",
    "thanks",
    "explain",
    "what is",
    "tell me about",
    "summarize",
    "describe",
    "compare",
    "difference",
    "why",
    "can you",
    "could you",
    "help me",
    "meaning",
    "definition",
];

/// Fast first-pass classifier. Returns `None` when the query is ambiguous.
///
/// Keywords match as substrings of the lowercased query, so `hi` also fires
/// inside `history`.
#[derive(Debug, Clone)]
pub struct KeywordIntentClassifier {
    confidence_threshold: f64,
}

impl Default for KeywordIntentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl KeywordIntentClassifier {
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    pub fn classify(&self, query: &str) -> Option<Intent> {
        let query = query.to_lowercase();

        let knowledge = hits(&query, KNOWLEDGE_KEYWORDS);
        let data = hits(&query, DATA_KEYWORDS);
        let general = hits(&query, GENERAL_KEYWORDS);

        let total = knowledge + data + general;
        if total == 0 {
            return None;
        }

        let max = knowledge.max(data).max(general);
        let confidence = max as f64 / total as f64;

        if confidence < self.confidence_threshold {
            return None;
        }

        if knowledge == max {
            Some(Intent::Knowledge)
        } else if data == max {
            Some(Intent::Data)
        } else {
            Some(Intent::General)
        }
    }
}

fn hits(query: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|kw| query.contains(*kw)).count()
}
