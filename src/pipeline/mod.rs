//! Server-side generation pipeline: sample, synthesize, critique, emit.

pub mod encoder;
pub mod sequencer;
pub mod steps;

pub use encoder::{encode_event, encode_stream, event_stream_response};
pub use sequencer::TurnSequencer;
