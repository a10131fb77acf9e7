//! Image generation module: payload types, the service seam, and the
//! Gemini client.

mod gemini;
mod service;
mod types;

pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiModel};
pub use service::ImageService;
pub use types::{DataUrl, ImageFormat, ImageSize};
