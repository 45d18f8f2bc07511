//! Client-side run state: the "currently pondering" slot and the
//! accumulated thoughts of one run.

use serde::Serialize;

use crate::concepts::ConceptPair;
use crate::critique::{Axis, parse_critique};
use crate::events::{FinishedThought, StreamEvent};
use crate::ranking::rank_indices;

/// A finished thought with its critique parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thought {
    pub concepts: ConceptPair,
    pub thought: String,
    pub novelty: u32,
    pub coherence: u32,
    pub usefulness: u32,
    pub justification: String,
}

impl Thought {
    pub fn score(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Novelty => self.novelty,
            Axis::Coherence => self.coherence,
            Axis::Usefulness => self.usefulness,
        }
    }
}

impl From<FinishedThought> for Thought {
    fn from(finished: FinishedThought) -> Self {
        let parsed = parse_critique(&finished.critique);
        Self {
            concepts: finished.concepts,
            thought: finished.thought,
            novelty: parsed.novelty,
            coherence: parsed.coherence,
            usefulness: parsed.usefulness,
            justification: parsed.justification,
        }
    }
}

#[derive(Debug, Default)]
pub struct ThoughtBoard {
    active: Option<ConceptPair>,
    thoughts: Vec<Thought>,
    ranking: Vec<usize>,
    rank_axis: Axis,
    running: bool,
}

impl ThoughtBoard {
    pub fn new(rank_axis: Axis) -> Self {
        Self {
            rank_axis,
            ..Self::default()
        }
    }

    /// Drop the previous run's thoughts and start accepting events.
    pub fn start_run(&mut self) {
        self.active = None;
        self.thoughts.clear();
        self.ranking.clear();
        self.running = true;
    }

    /// Stream ended, cleanly or not. Completed thoughts stay.
    pub fn finish_run(&mut self) {
        self.active = None;
        self.running = false;
    }

    /// Dispatch one decoded record. Returns the thought appended, if any.
    pub fn apply(&mut self, event: StreamEvent) -> Option<&Thought> {
        match event {
            StreamEvent::ActiveConcepts(pair) => {
                self.active = Some(pair);
                None
            }
            StreamEvent::FinishedThought(finished) => {
                self.active = None;
                self.thoughts.push(Thought::from(finished));
                self.ranking = rank_indices(&self.thoughts, self.rank_axis);
                self.thoughts.last()
            }
        }
    }

    pub fn active(&self) -> Option<&ConceptPair> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Append order.
    pub fn thoughts(&self) -> &[Thought] {
        &self.thoughts
    }

    pub fn ranked(&self) -> Vec<&Thought> {
        self.ranking.iter().map(|&i| &self.thoughts[i]).collect()
    }

    pub fn rank_axis(&self) -> Axis {
        self.rank_axis
    }

    pub fn set_rank_axis(&mut self, axis: Axis) {
        self.rank_axis = axis;
        self.ranking = rank_indices(&self.thoughts, axis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished(a: &str, b: &str, critique: &str) -> StreamEvent {
        StreamEvent::FinishedThought(FinishedThought {
            thought: format!("{a} meets {b}"),
            critique: critique.to_string(),
            concepts: ConceptPair::new(a, b),
        })
    }

    #[test]
    fn active_slot_follows_turns() {
        let mut board = ThoughtBoard::default();
        board.start_run();
        board.apply(StreamEvent::ActiveConcepts(ConceptPair::new("Jazz", "Tides")));
        assert_eq!(board.active(), Some(&ConceptPair::new("Jazz", "Tides")));

        board.apply(finished("Jazz", "Tides", "Novelty: 4/10 ok"));
        assert_eq!(board.active(), None);

        // an empty turn leaves the slot set until the next pair replaces it
        board.apply(StreamEvent::ActiveConcepts(ConceptPair::new("Salt", "Law")));
        board.apply(StreamEvent::ActiveConcepts(ConceptPair::new("Ice", "Debt")));
        assert_eq!(board.active(), Some(&ConceptPair::new("Ice", "Debt")));
    }

    #[test]
    fn finished_thought_is_parsed_and_ranked() {
        let mut board = ThoughtBoard::new(Axis::Novelty);
        board.start_run();
        board.apply(finished("A", "B", "Novelty: 2/10\nCoherence: 9/10\nUsefulness: 1/10\nlow"));
        let appended = board
            .apply(finished("C", "D", "Novelty: 8/10\nCoherence: 3/10\nUsefulness: 6/10\nhigh"))
            .cloned()
            .unwrap();
        assert_eq!(appended.justification, "high");
        assert_eq!(appended.usefulness, 6);

        let ranked: Vec<&str> = board.ranked().iter().map(|t| t.justification.as_str()).collect();
        assert_eq!(ranked, vec!["high", "low"]);
        let appended_order: Vec<&str> =
            board.thoughts().iter().map(|t| t.justification.as_str()).collect();
        assert_eq!(appended_order, vec!["low", "high"]);

        board.set_rank_axis(Axis::Coherence);
        assert_eq!(board.ranked()[0].justification, "low");
    }

    #[test]
    fn new_run_resets_and_abrupt_end_keeps_results() {
        let mut board = ThoughtBoard::default();
        board.start_run();
        board.apply(finished("A", "B", "Novelty: 2/10 x"));
        board.apply(StreamEvent::ActiveConcepts(ConceptPair::new("C", "D")));
        board.finish_run();
        assert!(!board.is_running());
        assert_eq!(board.active(), None);
        assert_eq!(board.thoughts().len(), 1);

        board.start_run();
        assert!(board.is_running());
        assert!(board.thoughts().is_empty());
        assert!(board.ranked().is_empty());
    }
}
