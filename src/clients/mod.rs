pub mod fake;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use fake::{FakeGenerator, FakeGeneratorFactory, FakeReply};
pub use openai::{OpenAiGenerator, OpenAiGeneratorFactory};
pub use traits::{GeneratorFactory, TextGenerator};

use crate::config::ModelConfig;
use crate::error::{DaydreamError, Result};

/// Pick the generator factory named by `model.provider`.
pub fn create_factory(cfg: &ModelConfig) -> Result<Arc<dyn GeneratorFactory>> {
    match cfg.provider.as_str() {
        "openai" => {
            tracing::info!(model = %cfg.model, base_url = %cfg.base_url, "Using OpenAI-compatible provider");
            Ok(Arc::new(OpenAiGeneratorFactory::new(cfg)?))
        }
        "fake" => {
            tracing::info!("Using FakeGenerator (deterministic, offline)");
            Ok(Arc::new(FakeGeneratorFactory::new(Arc::new(
                FakeGenerator::default(),
            ))))
        }
        other => Err(DaydreamError::config(format!(
            "unknown model provider '{}' (expected 'openai' or 'fake')",
            other
        ))),
    }
}
