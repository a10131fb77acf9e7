//! The service trait the orchestrator calls through.

use crate::error::Result;
use crate::image::types::{DataUrl, ImageSize};
use async_trait::async_trait;

/// The two remote operations the application performs.
///
/// `Studio` only ever talks to this trait, so tests can substitute an
/// in-memory implementation for the real Gemini client.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Generates an image from a text prompt at the requested size tier,
    /// optionally conditioned on a reference image (a data URL).
    async fn generate(
        &self,
        prompt: &str,
        size: ImageSize,
        reference: Option<&str>,
    ) -> Result<DataUrl>;

    /// Applies a natural-language edit instruction to an existing image
    /// (a data URL) and returns the modified image.
    async fn edit(&self, image: &str, instruction: &str) -> Result<DataUrl>;
}
