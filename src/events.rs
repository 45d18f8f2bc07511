//! Protocol events pushed from the turn sequencer to the client.

use serde::{Deserialize, Serialize};

use crate::concepts::ConceptPair;

/// Wire shape: `{"event": "<name>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Emitted before a turn's model calls begin.
    ActiveConcepts(ConceptPair),
    /// Emitted only when both model calls produced non-empty text.
    FinishedThought(FinishedThought),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedThought {
    pub thought: String,
    /// Raw critic output; parsing happens client-side.
    pub critique: String,
    pub concepts: ConceptPair,
}

impl StreamEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ActiveConcepts(_) => "active_concepts",
            Self::FinishedThought(_) => "finished_thought",
        }
    }
}
