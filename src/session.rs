//! The in-memory session gallery of generated images.

use crate::error::Result;
use crate::image::{DataUrl, ImageSize};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One generated image in the session.
///
/// Immutable after creation, except that an edit replaces `url` in place
/// while keeping the same `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Opaque unique token, generated client-side.
    pub id: String,
    /// Self-contained encoded image payload (data URL).
    pub url: String,
    /// The exact text sent to the generation call, retained for display.
    pub prompt: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    /// Resolution tier requested for this image.
    pub size: ImageSize,
}

impl GeneratedImage {
    /// Creates a new record with a fresh id and the current timestamp.
    pub fn new(url: String, prompt: String, size: ImageSize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            url,
            prompt,
            timestamp: Utc::now(),
            size,
        }
    }

    /// Writes the decoded payload to the given path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        DataUrl::parse(&self.url)?.save(path)
    }

    /// Suggested filename for downloads, e.g. `persona-<id>.png`.
    pub fn filename(&self) -> String {
        let ext = DataUrl::parse(&self.url)
            .map(|d| d.format().extension())
            .unwrap_or("png");
        format!("persona-{}.{}", self.id, ext)
    }
}

/// The ordered session list, newest first.
///
/// Append-only except for explicit deletion and in-place edit
/// replacement. Owns its entries exclusively; destroyed with the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gallery {
    images: Vec<GeneratedImage>,
}

impl Gallery {
    /// Creates an empty gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an image at the head of the list.
    pub fn prepend(&mut self, image: GeneratedImage) {
        self.images.insert(0, image);
    }

    /// Removes the entry with the given id. Returns true if one was
    /// removed; relative order of the remainder is unchanged.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|img| img.id != id);
        self.images.len() < before
    }

    /// Replaces the payload of the entry with the given id, keeping its
    /// id and position. Returns true if an entry was updated.
    pub fn replace_url(&mut self, id: &str, url: String) -> bool {
        match self.images.iter_mut().find(|img| img.id == id) {
            Some(img) => {
                img.url = url;
                true
            }
            None => false,
        }
    }

    /// Returns the entry with the given id.
    pub fn get(&self, id: &str) -> Option<&GeneratedImage> {
        self.images.iter().find(|img| img.id == id)
    }

    /// Returns the most recently generated image.
    pub fn latest(&self) -> Option<&GeneratedImage> {
        self.images.first()
    }

    /// Iterates newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.images.iter()
    }

    /// Number of images in the session.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if the session holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Writes every image to `dir` as `persona-{index}.{ext}`, newest
    /// first. Returns the written paths.
    pub fn export_all(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut written = Vec::with_capacity(self.images.len());
        for (idx, img) in self.images.iter().enumerate() {
            let payload = DataUrl::parse(&img.url)?;
            let path = dir.join(format!("persona-{}.{}", idx, payload.format().extension()));
            payload.save(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}
