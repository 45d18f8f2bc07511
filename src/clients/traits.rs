use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation capability: one prompt in, one completion out.
///
/// `Ok(None)` means the provider answered but produced no content. Transport,
/// auth and provider failures are `Err`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<Option<String>>;

    fn model(&self) -> &str;
}

/// Builds a generator bound to the credential supplied with a run request.
pub trait GeneratorFactory: Send + Sync {
    fn for_credential(&self, credential: &str) -> Result<Arc<dyn TextGenerator>>;

    fn provider(&self) -> &str;

    fn model(&self) -> &str;
}

/// Collapse missing and zero-length content into the empty signal.
pub fn non_empty(content: Option<String>) -> Option<String> {
    content.filter(|text| !text.is_empty())
}
