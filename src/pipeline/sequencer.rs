//! Turn sequencer.
//!
//! A run is a pull-driven stream: nothing is sampled or requested until the
//! consumer polls for the next event, so a slow transport holds back the
//! next model call and a dropped transport stops the run. Turns are strictly
//! sequential; each `finished_thought` directly follows the
//! `active_concepts` of its own turn.

use std::sync::Arc;

use futures_util::stream::{self, Stream};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clients::TextGenerator;
use crate::concepts::{ConceptPair, ConceptPool};
use crate::error::{DaydreamError, Result};
use crate::events::{FinishedThought, StreamEvent};
use crate::pipeline::steps;

pub struct TurnSequencer {
    run_id: Uuid,
    generator: Arc<dyn TextGenerator>,
    pool: Arc<ConceptPool>,
    turns: u32,
    rng: StdRng,
}

impl TurnSequencer {
    pub fn new(generator: Arc<dyn TextGenerator>, pool: Arc<ConceptPool>, turns: u32) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generator,
            pool,
            turns,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the sampling sequence (tests, reproducible demos).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Lazily run every turn. The stream ends after the last turn, or right
    /// after yielding the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<StreamEvent>> + Send + 'static {
        stream::unfold(Run::new(self), |mut run| async move {
            let item = run.advance().await?;
            Some((item, run))
        })
    }
}

enum Phase {
    Sampling,
    Pondering(ConceptPair),
    Done,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Running,
    Completed,
    Failed,
}

struct Run {
    seq: TurnSequencer,
    turn: u32,
    phase: Phase,
    outcome: Outcome,
}

impl Run {
    fn new(seq: TurnSequencer) -> Self {
        info!(run_id = %seq.run_id, turns = seq.turns, "Run started");
        Self {
            seq,
            turn: 0,
            phase: Phase::Sampling,
            outcome: Outcome::Running,
        }
    }

    async fn advance(&mut self) -> Option<Result<StreamEvent>> {
        loop {
            // Left as Done if the step fails or this future is dropped mid-call.
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Done => return None,
                Phase::Sampling => {
                    if self.turn >= self.seq.turns {
                        self.outcome = Outcome::Completed;
                        info!(run_id = %self.seq.run_id, turns = self.turn, "Run completed");
                        return None;
                    }
                    self.turn += 1;
                    let pair = match self.seq.pool.sample_with(&mut self.seq.rng) {
                        Ok(pair) => pair,
                        Err(e) => return Some(Err(self.fail(e))),
                    };
                    info!(run_id = %self.seq.run_id, turn = self.turn, concepts = %pair, "Pondering");
                    self.phase = Phase::Pondering(pair.clone());
                    return Some(Ok(StreamEvent::ActiveConcepts(pair)));
                }
                Phase::Pondering(pair) => match self.ponder(pair).await {
                    Ok(Some(finished)) => {
                        self.phase = Phase::Sampling;
                        return Some(Ok(StreamEvent::FinishedThought(finished)));
                    }
                    Ok(None) => {
                        self.phase = Phase::Sampling;
                    }
                    Err(e) => return Some(Err(self.fail(e))),
                },
            }
        }
    }

    /// Synthesis then critique; `None` when either came back empty.
    async fn ponder(&self, pair: ConceptPair) -> Result<Option<FinishedThought>> {
        let generator = self.seq.generator.as_ref();

        let Some(thought) = steps::synthesize(generator, &pair).await? else {
            info!(run_id = %self.seq.run_id, turn = self.turn, "Empty synthesis, skipping turn");
            return Ok(None);
        };
        debug!(run_id = %self.seq.run_id, turn = self.turn, chars = thought.len(), "Synthesis received");

        let Some(critique) = steps::critique(generator, &thought).await? else {
            info!(run_id = %self.seq.run_id, turn = self.turn, "Empty critique, skipping turn");
            return Ok(None);
        };
        debug!(run_id = %self.seq.run_id, turn = self.turn, chars = critique.len(), "Critique received");

        Ok(Some(FinishedThought {
            thought,
            critique,
            concepts: pair,
        }))
    }

    fn fail(&mut self, err: DaydreamError) -> DaydreamError {
        self.outcome = Outcome::Failed;
        warn!(run_id = %self.seq.run_id, turn = self.turn, "Run aborted: {}", err);
        err
    }
}

impl Drop for Run {
    fn drop(&mut self) {
        if self.outcome == Outcome::Running {
            info!(
                run_id = %self.seq.run_id,
                turn = self.turn,
                "Consumer disconnected, no further turns"
            );
        }
    }
}
