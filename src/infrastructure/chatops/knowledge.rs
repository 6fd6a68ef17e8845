//! In-memory knowledge base with term-overlap ranking

use std::collections::BTreeSet;
use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{DomainError, KnowledgeDocument, KnowledgeHit, KnowledgeSearch};

const SNIPPET_CHARS: usize = 300;

const STOPWORDS: &[&str] = &[
    "the",
    "and",
    "for",
    "are",
    "but",
    "not",
    "you",
    "with",
    "what",
    "how",
    "can",
    "this",
    "that",
    "from",
    "was",
    "our",
    "has",
    "have",
    "into",
    "does",
    "when",
    "where",
    "which",
];

/// Paragraph-level chunk of a document
#[derive(Debug, Clone)]
struct Chunk {
    source: String,
    content: String,
    terms: BTreeSet<String>,
}

/// Knowledge base held in memory and ranked by query term overlap.
///
/// Documents are split on blank lines; each paragraph is scored as the
/// fraction of distinct query terms it contains.
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeSearch {
    chunks: Vec<Chunk>,
}

impl InMemoryKnowledgeSearch {
    pub fn new(documents: Vec<KnowledgeDocument>) -> Self {
        let chunks = documents
            .into_iter()
            .flat_map(|doc| {
                let source = doc.source;
                doc.content
                    .split("\n\n")
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(|p| Chunk {
                        source: source.clone(),
                        content: p.to_string(),
                        terms: terms(p),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self { chunks }
    }

    /// Knowledge base seeded with the built-in operations runbooks
    pub fn with_default_documents() -> Self {
        Self::new(default_documents())
    }

    /// Load every `.txt` and `.md` file in `dir` (non-recursive)
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| {
            DomainError::knowledge_base(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        let mut documents = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path();
            let is_text = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("txt") | Some("md")
            );
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(true);

            if !is_text || hidden {
                continue;
            }

            match std::fs::read_to_string(&path) {
                Ok(content) if !content.trim().is_empty() => {
                    let source = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or_default()
                        .to_string();
                    documents.push(KnowledgeDocument::new(source, content));
                }
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable document"),
            }
        }

        info!(count = documents.len(), dir = %dir.display(), "Loaded knowledge documents");
        Ok(Self::new(documents))
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

fn snippet(content: &str) -> String {
    match content.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}

#[async_trait]
impl KnowledgeSearch for InMemoryKnowledgeSearch {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<KnowledgeHit>, DomainError> {
        let query_terms = terms(query);
        if query_terms.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<KnowledgeHit> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let matched = query_terms.intersection(&chunk.terms).count();
                (matched > 0).then(|| KnowledgeHit {
                    source: chunk.source.clone(),
                    snippet: snippet(&chunk.content),
                    score: matched as f32 / query_terms.len() as f32,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.source.cmp(&b.source))
        });
        hits.truncate(top_k);

        Ok(hits)
    }
}

fn default_documents() -> Vec<KnowledgeDocument> {
    vec![
        KnowledgeDocument::new(
            "sop-deployment.md",
            "Deployment SOP: every production deployment goes through the release pipeline. \
             Deploy to staging first, run the smoke suite, then promote to production during \
             the approved change window.\n\n\
             Rollback procedure: if error rate or latency regresses after a deployment, roll \
             back to the previous release with the pipeline's rollback job and open an incident \
             ticket referencing the deployment number.",
        ),
        KnowledgeDocument::new(
            "runbook-db-timeouts.md",
            "Database connection timeouts usually indicate pool exhaustion. Check the \
             connection pool size and active connections on the primary.\n\n\
             If timeouts started after a config change to the connection pool, revert the \
             change and restart the affected service.",
        ),
        KnowledgeDocument::new(
            "runbook-high-cpu.md",
            "High CPU on the RiskEngine or OrderMatching hosts: confirm with the latency \
             dashboard, correlate with recent deployments, and scale out capacity when no \
             change explains the load.",
        ),
        KnowledgeDocument::new(
            "architecture-overview.md",
            "Architecture: orders enter through the Gateway, are validated by the RiskEngine \
             and matched by OrderMatching. Each component reports Healthy, Degraded or Down \
             to the status service.",
        ),
        KnowledgeDocument::new(
            "incident-escalation.md",
            "Escalation guide: when automated diagnosis is inconclusive, page the on-call \
             engineer and escalate to manual investigation within 15 minutes.",
        ),
    ]
}
