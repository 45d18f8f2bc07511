//! The two model calls of a turn. Each is one request; empty output is
//! reported as `Ok(None)` and failures propagate untouched.

use tracing::debug;

use crate::clients::traits::{TextGenerator, non_empty};
use crate::concepts::ConceptPair;
use crate::error::Result;
use crate::prompts::{CRITIC, SYNTHESIZER, critique_prompt, synthesis_prompt};

pub async fn synthesize(generator: &dyn TextGenerator, pair: &ConceptPair) -> Result<Option<String>> {
    let prompt = synthesis_prompt(&pair.first, &pair.second);
    debug!(prompt_id = SYNTHESIZER.id, model = generator.model(), "Requesting synthesis");
    Ok(non_empty(generator.complete(&prompt).await?))
}

pub async fn critique(generator: &dyn TextGenerator, thought: &str) -> Result<Option<String>> {
    let prompt = critique_prompt(thought);
    debug!(prompt_id = CRITIC.id, model = generator.model(), "Requesting critique");
    Ok(non_empty(generator.complete(&prompt).await?))
}
