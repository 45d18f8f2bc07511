//! Offline generator: scripted replies first, then deterministic text.
//!
//! Selected with `provider = "fake"` and used throughout the tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::clients::traits::{GeneratorFactory, TextGenerator, non_empty};
use crate::error::{DaydreamError, Result};

#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Empty,
    Fail(String),
}

#[derive(Debug, Default)]
pub struct FakeGenerator {
    script: Mutex<VecDeque<FakeReply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn scripted(replies: impl IntoIterator<Item = FakeReply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn next_scripted(&self) -> Option<FakeReply> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}

/// Cheap stable digest so unscripted output varies with the prompt.
fn digest(text: &str) -> u32 {
    text.bytes()
        .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619))
}

fn generated(prompt: &str) -> String {
    let d = digest(prompt);
    if prompt.contains("discerning critic") {
        format!(
            "Novelty: {}/10\nCoherence: {}/10\nUsefulness: {}/10\n\nA deterministic critique for offline runs.",
            d % 10 + 1,
            (d / 10) % 10 + 1,
            (d / 100) % 10 + 1
        )
    } else {
        format!("A deterministic synthesis #{:08x} for offline runs.", d)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, prompt: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());
        match self.next_scripted() {
            Some(FakeReply::Text(text)) => Ok(non_empty(Some(text))),
            Some(FakeReply::Empty) => Ok(None),
            Some(FakeReply::Fail(message)) => Err(DaydreamError::provider(message)),
            None => Ok(Some(generated(prompt))),
        }
    }

    fn model(&self) -> &str {
        "fake"
    }
}

/// Hands the same generator to every run and records the credentials seen.
#[derive(Debug)]
pub struct FakeGeneratorFactory {
    generator: Arc<FakeGenerator>,
    credentials: Mutex<Vec<String>>,
}

impl FakeGeneratorFactory {
    pub fn new(generator: Arc<FakeGenerator>) -> Self {
        Self {
            generator,
            credentials: Mutex::new(Vec::new()),
        }
    }

    pub fn generator(&self) -> &Arc<FakeGenerator> {
        &self.generator
    }

    pub fn credentials(&self) -> Vec<String> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl GeneratorFactory for FakeGeneratorFactory {
    fn for_credential(&self, credential: &str) -> Result<Arc<dyn TextGenerator>> {
        self.credentials
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(credential.to_string());
        Ok(self.generator.clone())
    }

    fn provider(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake"
    }
}
