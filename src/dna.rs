//! Character DNA: the structured description injected into every prompt.

use serde::{Deserialize, Serialize};

/// The user-authored character definition.
///
/// Pure data: every field is independently mutable at any time, trait
/// duplicates are allowed, and feature order is the display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDNA {
    /// Base character or species, free text (e.g. "A robotic red panda").
    pub species: String,
    /// Visual art style, free text.
    pub style: String,
    /// Permanent traits, in display order. Duplicates allowed.
    #[serde(default)]
    pub features: Vec<String>,
    /// Optional reference image as a data URL, from a user file upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
}

impl CharacterDNA {
    /// Composes the full generation prompt from this DNA and a scene
    /// modifier.
    ///
    /// Deterministic string formatting with no validation: the output is
    /// `"{style}. {species} with {f1, f2, ...}. {modifier}"`. An empty
    /// modifier leaves the trailing separator in place.
    pub fn compose_prompt(&self, modifier: &str) -> String {
        format!(
            "{}. {} with {}. {}",
            self.style,
            self.species,
            self.features.join(", "),
            modifier
        )
    }
}
