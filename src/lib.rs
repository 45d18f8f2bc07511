pub mod board;
pub mod client;
pub mod clients;
pub mod concepts;
pub mod config;
pub mod critique;
pub mod decoder;
pub mod error;
pub mod events;
pub mod http;
pub mod pipeline;
pub mod prompts;
pub mod ranking;
pub mod seeds;

pub use board::{Thought, ThoughtBoard};
pub use client::DaydreamClient;
pub use concepts::{ConceptPair, ConceptPool};
pub use config::Config;
pub use critique::{Axis, ParsedCritique, parse_critique};
pub use error::{DaydreamError, Result};
pub use events::{FinishedThought, StreamEvent};

// Load env from a simple, standardized location resolution.
// dotenvy::dotenv() loads .env if present; a missing file is ignored.
pub fn load_env() {
    let _ = dotenvy::dotenv();
}
