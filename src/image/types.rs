//! Payload and resolution primitives for image generation.

use crate::error::{PersonaError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Resolution tiers supported by the image service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageSize {
    /// 1024px tier.
    #[default]
    #[serde(rename = "1K")]
    OneK,
    /// 2048px tier.
    #[serde(rename = "2K")]
    TwoK,
    /// 4096px tier.
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    /// Returns the wire string for this tier (e.g. `"1K"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneK => "1K",
            Self::TwoK => "2K",
            Self::FourK => "4K",
        }
    }

    /// Parses a wire string back into a tier.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "1K" => Some(Self::OneK),
            "2K" => Some(Self::TwoK),
            "4K" => Some(Self::FourK),
            _ => None,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Maps a MIME type string to a format, if recognized.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        None
    }
}

/// A self-contained encoded image: MIME type plus raw bytes.
///
/// This is the exchange currency of the crate. Reference uploads come in
/// as data URLs, the remote service returns inline base64 payloads, and
/// the session list stores the rendered `data:<mime>;base64,<data>` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    data: Vec<u8>,
}

impl DataUrl {
    /// Creates a data URL from a MIME type and raw bytes.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Parses an encoded image string leniently.
    ///
    /// Accepts a full `data:<mime>;base64,<data>` URL, or bare base64
    /// (assumed PNG), with or without padding, ignoring embedded
    /// whitespace. Inputs from browsers and model responses routinely
    /// violate strict base64, so both relaxations are load-bearing.
    pub fn parse(input: &str) -> Result<Self> {
        let (mime_type, b64) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (mime, data) = rest.split_once(";base64,").ok_or_else(|| {
                    PersonaError::InvalidRequest("data URL is not base64-encoded".into())
                })?;
                (mime.to_string(), data)
            }
            None => ("image/png".to_string(), input),
        };

        let cleaned: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();

        let data = base64::engine::general_purpose::STANDARD
            .decode(&cleaned)
            .or_else(|_| base64::engine::general_purpose::STANDARD_NO_PAD.decode(&cleaned))
            .map_err(|e| PersonaError::Decode(e.to_string()))?;

        Ok(Self { mime_type, data })
    }

    /// Reads a user-selected image file, typing it by magic bytes.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mime = ImageFormat::from_magic_bytes(&data)
            .map(|f| f.mime_type())
            .unwrap_or("image/png");
        Ok(Self::new(mime, data))
    }

    /// Returns the MIME type.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the raw image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the payload as base64 (no prefix), as the wire expects.
    pub fn base64_data(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the format implied by the MIME type, defaulting to PNG.
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_mime(&self.mime_type).unwrap_or_default()
    }

    /// Writes the raw bytes to the given path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.base64_data())
    }
}
