//! Session orchestration: sequences user actions against the image
//! service and owns all mutable application state.

use crate::dna::CharacterDNA;
use crate::error::{PersonaError, Result};
use crate::image::{ImageService, ImageSize};
use crate::session::{Gallery, GeneratedImage};
use serde::{Deserialize, Serialize};

/// The three view modes of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppView {
    /// Character DNA editor.
    #[default]
    Creator,
    /// Scene prompt studio.
    Studio,
    /// Generation gallery.
    Gallery,
}

/// Host capability gating access to the remote service.
///
/// Opaque boolean state: the host knows whether a credential has been
/// selected and can surface its own selection flow. Nothing else about
/// the credential is modeled here.
pub trait CredentialHost {
    /// Returns true if a credential has been selected.
    fn has_selected_key(&self) -> bool;

    /// Asks the host to open its credential-selection surface.
    /// Fire-and-forget; no result is consumed.
    fn open_key_selector(&self);
}

/// [`CredentialHost`] backed by an environment variable, for CLI use.
#[derive(Debug, Clone)]
pub struct EnvCredentialHost {
    var: &'static str,
}

impl EnvCredentialHost {
    /// Host checking the given environment variable.
    pub fn new(var: &'static str) -> Self {
        Self { var }
    }
}

impl Default for EnvCredentialHost {
    fn default() -> Self {
        Self::new("GOOGLE_API_KEY")
    }
}

impl CredentialHost for EnvCredentialHost {
    fn has_selected_key(&self) -> bool {
        std::env::var(self.var).map(|v| !v.is_empty()).unwrap_or(false)
    }

    fn open_key_selector(&self) {
        tracing::warn!(
            var = self.var,
            "no API key selected; set the environment variable and retry"
        );
    }
}

/// The single owner of session state: character DNA, the gallery, the
/// active view, the selected image, and the in-flight flag.
///
/// All state mutation happens through `&mut self` methods, so views can
/// borrow the state without any ambient globals.
pub struct Studio<S, C> {
    service: S,
    credentials: C,
    dna: CharacterDNA,
    gallery: Gallery,
    view: AppView,
    size: ImageSize,
    selected: Option<String>,
    busy: bool,
    has_key: bool,
}

impl<S: ImageService, C: CredentialHost> Studio<S, C> {
    /// Creates a studio over the given service and credential host and
    /// performs the initial credential check.
    pub fn new(service: S, credentials: C) -> Self {
        let has_key = credentials.has_selected_key();
        Self {
            service,
            credentials,
            dna: CharacterDNA::default(),
            gallery: Gallery::new(),
            view: AppView::default(),
            size: ImageSize::default(),
            selected: None,
            busy: false,
            has_key,
        }
    }

    /// Re-queries the host for credential presence.
    pub fn check_key(&mut self) -> bool {
        self.has_key = self.credentials.has_selected_key();
        self.has_key
    }

    /// Opens the host's credential-selection flow and assumes success,
    /// as the host reports no outcome. A later rejected call resets the
    /// flag again.
    pub fn authenticate(&mut self) {
        self.credentials.open_key_selector();
        self.has_key = true;
    }

    /// Generates an image of the character in the scene described by
    /// `modifier` and prepends it to the gallery.
    ///
    /// Without a selected credential, no remote call is made: the key
    /// selector is opened instead and `Ok(None)` is returned. A rejected
    /// credential resets the credential flag so the next attempt
    /// re-prompts. The busy flag is cleared on every return path.
    pub async fn generate(&mut self, modifier: &str) -> Result<Option<&GeneratedImage>> {
        if self.busy {
            return Err(PersonaError::Busy);
        }
        if !self.has_key {
            self.credentials.open_key_selector();
            return Ok(None);
        }

        self.busy = true;
        let prompt = self.dna.compose_prompt(modifier);
        let result = self
            .service
            .generate(&prompt, self.size, self.dna.reference_image.as_deref())
            .await;
        self.busy = false;

        match result {
            Ok(image) => {
                self.gallery
                    .prepend(GeneratedImage::new(image.to_string(), prompt, self.size));
                Ok(self.gallery.latest())
            }
            Err(e) => {
                tracing::error!(error = %e, "image generation failed");
                if e.is_credential_error() {
                    self.has_key = false;
                }
                Err(e)
            }
        }
    }

    /// Applies `instruction` to the currently selected image, replacing
    /// its payload in place (same id, same position).
    ///
    /// A missing selection or empty instruction is a silent no-op with no
    /// remote call; returns whether an edit was applied.
    pub async fn edit(&mut self, instruction: &str) -> Result<bool> {
        let Some(id) = self.selected.clone() else {
            return Ok(false);
        };
        if instruction.trim().is_empty() {
            return Ok(false);
        }
        let Some(url) = self.gallery.get(&id).map(|img| img.url.clone()) else {
            // Stale selection (image deleted since).
            return Ok(false);
        };
        if self.busy {
            return Err(PersonaError::Busy);
        }

        self.busy = true;
        let result = self.service.edit(&url, instruction).await;
        self.busy = false;

        match result {
            Ok(image) => {
                self.gallery.replace_url(&id, image.to_string());
                Ok(true)
            }
            Err(e) => {
                tracing::error!(error = %e, "image edit failed");
                Err(e)
            }
        }
    }

    /// Removes an image from the gallery by id. No confirmation, no
    /// cascading effects.
    pub fn delete(&mut self, id: &str) -> bool {
        self.gallery.remove(id)
    }

    /// Selects an image for the editor modal. Returns false if the id is
    /// not in the gallery.
    pub fn select(&mut self, id: &str) -> bool {
        if self.gallery.get(id).is_some() {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Closes the editor modal.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The currently selected image, if any.
    pub fn selected(&self) -> Option<&GeneratedImage> {
        self.selected.as_deref().and_then(|id| self.gallery.get(id))
    }

    /// The character DNA.
    pub fn dna(&self) -> &CharacterDNA {
        &self.dna
    }

    /// Mutable access to the character DNA.
    pub fn dna_mut(&mut self) -> &mut CharacterDNA {
        &mut self.dna
    }

    /// The session gallery.
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// The active view mode.
    pub fn view(&self) -> AppView {
        self.view
    }

    /// Switches the active view mode.
    pub fn set_view(&mut self, view: AppView) {
        self.view = view;
    }

    /// The resolution tier used for new generations.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Sets the resolution tier for new generations.
    pub fn set_size(&mut self, size: ImageSize) {
        self.size = size;
    }

    /// Returns true while a generation or edit is in flight.
    ///
    /// There is no cancellation: dropping an in-flight `generate` or
    /// `edit` future mid-await leaves the flag set, and the studio
    /// rejects further requests with [`PersonaError::Busy`].
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Returns true if a credential is believed to be selected.
    pub fn has_key(&self) -> bool {
        self.has_key
    }

    #[cfg(test)]
    fn force_busy(&mut self, busy: bool) {
        self.busy = busy;
    }
}
