//! Chat routing domain
//!
//! Questions typed into the console are classified into an [`Intent`] and
//! dispatched to the knowledge base, the live data tools, both, or neither.

mod data;
mod intent;
mod knowledge;

pub use data::{LiveDataSource, LiveDataSnapshot};
pub use intent::{Intent, IntentFallback, IntentRouter};
pub use knowledge::{KnowledgeDocument, KnowledgeHit, KnowledgeSearch};

#[cfg(test)]
pub use intent::MockIntentFallback;
