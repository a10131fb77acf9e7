#![warn(missing_docs)]
//! PersonaForge - character-consistent AI image generation.
//!
//! Define a character "DNA" (species, style, permanent traits, optional
//! reference photo), then generate any number of images of that character
//! and refine them with natural-language edit instructions. Every prompt
//! is composed from the same DNA, which is what keeps the character
//! consistent across scenes.
//!
//! # Quick Start
//!
//! ```no_run
//! use personaforge::{EnvCredentialHost, GeminiClient, Studio};
//!
//! #[tokio::main]
//! async fn main() -> personaforge::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let mut studio = Studio::new(client, EnvCredentialHost::default());
//!
//!     studio.dna_mut().species = "A robotic red panda".into();
//!     studio.dna_mut().style = "Chibi 2D vector art, flat colors".into();
//!     studio.dna_mut().features.push("tiny antenna ears".into());
//!
//!     studio.generate("surfing a giant slice of pizza").await?;
//!     studio.gallery().latest().unwrap().save("panda.png")?;
//!     Ok(())
//! }
//! ```
//!
//! The session gallery is in-memory only: it lives and dies with the
//! [`Studio`] value that owns it.

mod dna;
mod error;
pub mod image;
mod session;
mod studio;

pub use dna::CharacterDNA;
pub use error::{PersonaError, Result};
pub use image::{DataUrl, GeminiClient, GeminiClientBuilder, GeminiModel, ImageService, ImageSize};
pub use session::{Gallery, GeneratedImage};
pub use studio::{AppView, CredentialHost, EnvCredentialHost, Studio};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dna::CharacterDNA;
    pub use crate::error::{PersonaError, Result};
    pub use crate::image::{DataUrl, GeminiClient, ImageService, ImageSize};
    pub use crate::session::{Gallery, GeneratedImage};
    pub use crate::studio::{AppView, CredentialHost, EnvCredentialHost, Studio};
}
