//! Authenticated management console.
//!
//! Every write goes through the same discipline: `begin_*` validates locally
//! and disables the form's control, the request runs without touching the
//! console, and `finish_*` merges the server's answer into the lists only on
//! success. A failure leaves the lists exactly as they were. Answers issued
//! before the console was left are discarded.

use lumina_api_structs::{PasswordChange, Photo, PhotoId, Theme, ThemePayload};
use time::OffsetDateTime;

use crate::api::{GalleryApi, PhotoUpload};
use crate::client::Client;
use crate::error::{Error, ValidationError};
use crate::pending::{Generation, InFlight, Ticket};

pub mod settings;
pub mod stats;
pub mod themes;
pub mod upload;

pub use settings::PasswordForm;
pub use stats::Stats;
pub use themes::ThemeForm;
pub use upload::UploadForm;

pub const LOAD_FAILED: &str = "Failed to load data";
pub const PHOTO_DELETED: &str = "Photo deleted";
pub const PHOTO_DELETE_FAILED: &str = "Failed to delete photo";

/// Which overlay is up. Confirmations are their own states so that dismissing
/// one is a plain transition back to where it was raised from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Modal {
    None,
    Upload,
    Settings,
    Themes,
    ConfirmPhotoDelete(PhotoId),
    ConfirmThemeDelete(String),
}

#[derive(Debug, Default)]
struct Submissions {
    upload: InFlight,
    theme_create: InFlight,
    delete: InFlight,
    password: InFlight,
}

#[derive(Debug)]
pub struct AdminConsole {
    photos: Vec<Photo>,
    themes: Vec<Theme>,
    loading: bool,
    modal: Modal,
    pub upload_form: UploadForm,
    pub theme_form: ThemeForm,
    pub password_form: PasswordForm,
    submissions: Submissions,
    generation: Generation,
}

impl Default for AdminConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminConsole {
    pub fn new() -> Self {
        AdminConsole {
            photos: Vec::new(),
            themes: Vec::new(),
            loading: true,
            modal: Modal::None,
            upload_form: UploadForm::default(),
            theme_form: ThemeForm::default(),
            password_form: PasswordForm::default(),
            submissions: Submissions::default(),
            generation: Generation::default(),
        }
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn stats(&self, now: OffsetDateTime) -> Stats {
        Stats::project(&self.photos, &self.themes, now)
    }

    /// Re-verifies the session, then loads photos and themes together.
    ///
    /// `Unauthorized` means the token is gone and the caller must return to
    /// the login form.
    #[tracing::instrument(skip_all)]
    pub async fn mount<A: GalleryApi>(&mut self, client: &Client<A>) -> Result<(), Error> {
        self.loading = true;
        if let Err(err) = client.verify().await {
            self.loading = false;
            return Err(err);
        }

        let (photos, themes) =
            futures_lite::future::zip(client.list_photos(None), client.list_themes()).await;
        self.loading = false;

        match (photos, themes) {
            (Ok(photos), Ok(themes)) => {
                tracing::info!(photos = photos.len(), themes = themes.len(), "Loaded console data");
                self.photos = photos;
                self.themes = themes;
                Ok(())
            },
            (Err(err), _) | (_, Err(err)) => {
                tracing::error!("Failed to load console data: {}", err);
                Err(err)
            },
        }
    }

    /// Drops every outstanding answer and closes whatever was open.
    pub fn leave(&mut self) {
        self.generation.advance();
        self.submissions = Submissions::default();
        self.modal = Modal::None;
    }

    pub fn logout<A: GalleryApi>(&mut self, client: &Client<A>) -> &'static str {
        client.logout();
        self.leave();
        "Logged out successfully"
    }

    pub fn open_upload(&mut self) {
        self.modal = Modal::Upload;
    }

    pub fn open_settings(&mut self) {
        self.modal = Modal::Settings;
    }

    pub fn open_themes(&mut self) {
        self.modal = Modal::Themes;
    }

    /// Closes the current overlay. Closing the upload modal discards its form.
    pub fn close_modal(&mut self) {
        match self.modal {
            Modal::ConfirmPhotoDelete(_) | Modal::ConfirmThemeDelete(_) => self.cancel_confirmation(),
            Modal::Upload => {
                self.upload_form.reset();
                self.modal = Modal::None;
            },
            _ => self.modal = Modal::None,
        }
    }

    pub fn request_photo_delete(&mut self, photo_id: &str) {
        self.modal = Modal::ConfirmPhotoDelete(photo_id.to_string());
    }

    pub fn request_theme_delete(&mut self, slug: &str) {
        self.modal = Modal::ConfirmThemeDelete(slug.to_string());
    }

    pub fn cancel_confirmation(&mut self) {
        self.modal = match self.modal {
            Modal::ConfirmThemeDelete(_) => Modal::Themes,
            Modal::ConfirmPhotoDelete(_) => Modal::None,
            ref other => other.clone(),
        };
    }

    pub fn can_upload(&self) -> bool {
        !self.submissions.upload.is_busy() && self.upload_form.is_complete()
    }

    pub fn can_create_theme(&self) -> bool {
        !self.submissions.theme_create.is_busy() && self.theme_form.is_complete()
    }

    pub fn can_change_password(&self) -> bool {
        !self.submissions.password.is_busy()
    }

    pub fn is_deleting(&self) -> bool {
        self.submissions.delete.is_busy()
    }

    pub fn begin_upload(&mut self) -> Result<Ticket<PhotoUpload>, Error> {
        let request = self.upload_form.to_request()?;
        self.submissions.upload.acquire()?;
        Ok(self.generation.issue(request))
    }

    /// On success the new photo goes to the front of the list and the form resets.
    pub fn finish_upload(
        &mut self,
        ticket: Ticket<PhotoUpload>,
        result: Result<Photo, Error>,
    ) -> Result<(), Error> {
        if !self.generation.is_current(&ticket) {
            return Err(Error::Stale);
        }
        self.submissions.upload.release();

        let photo = result?;
        tracing::info!(id = %photo.id, "Photo uploaded");
        self.photos.insert(0, photo);
        self.upload_form.reset();
        if self.modal == Modal::Upload {
            self.modal = Modal::None;
        }
        Ok(())
    }

    pub async fn upload<A: GalleryApi>(&mut self, client: &Client<A>) -> Result<(), Error> {
        let ticket = self.begin_upload()?;
        let result = client.upload_photo(&ticket.request).await;
        self.finish_upload(ticket, result)
    }

    pub fn begin_theme_create(&mut self) -> Result<Ticket<ThemePayload>, Error> {
        let payload = self.theme_form.to_payload()?;
        self.submissions.theme_create.acquire()?;
        Ok(self.generation.issue(payload))
    }

    pub fn finish_theme_create(
        &mut self,
        ticket: Ticket<ThemePayload>,
        result: Result<Theme, Error>,
    ) -> Result<(), Error> {
        if !self.generation.is_current(&ticket) {
            return Err(Error::Stale);
        }
        self.submissions.theme_create.release();

        let theme = result?;
        tracing::info!(slug = %theme.slug, "Theme created");
        self.themes.push(theme);
        self.theme_form.reset();
        Ok(())
    }

    pub async fn create_theme<A: GalleryApi>(&mut self, client: &Client<A>) -> Result<(), Error> {
        let ticket = self.begin_theme_create()?;
        let result = client.create_theme(&ticket.request).await;
        self.finish_theme_create(ticket, result)
    }

    /// Only valid while a photo-delete confirmation is up.
    pub fn begin_photo_delete(&mut self) -> Result<Ticket<PhotoId>, Error> {
        let photo_id = match &self.modal {
            Modal::ConfirmPhotoDelete(photo_id) => photo_id.clone(),
            _ => return Err(ValidationError::NothingToConfirm.into()),
        };
        self.submissions.delete.acquire()?;
        Ok(self.generation.issue(photo_id))
    }

    /// The confirmation is dismissed whatever the outcome.
    pub fn finish_photo_delete(
        &mut self,
        ticket: Ticket<PhotoId>,
        result: Result<(), Error>,
    ) -> Result<(), Error> {
        if !self.generation.is_current(&ticket) {
            return Err(Error::Stale);
        }
        self.submissions.delete.release();
        if self.modal == Modal::ConfirmPhotoDelete(ticket.request.clone()) {
            self.modal = Modal::None;
        }

        result?;
        tracing::info!(id = %ticket.request, "Photo deleted");
        self.photos.retain(|photo| photo.id != ticket.request);
        Ok(())
    }

    pub async fn confirm_photo_delete<A: GalleryApi>(&mut self, client: &Client<A>) -> Result<(), Error> {
        let ticket = self.begin_photo_delete()?;
        let result = client.delete_photo(&ticket.request).await;
        self.finish_photo_delete(ticket, result)
    }

    /// Only valid while a theme-delete confirmation is up.
    pub fn begin_theme_delete(&mut self) -> Result<Ticket<String>, Error> {
        let slug = match &self.modal {
            Modal::ConfirmThemeDelete(slug) => slug.clone(),
            _ => return Err(ValidationError::NothingToConfirm.into()),
        };
        self.submissions.delete.acquire()?;
        Ok(self.generation.issue(slug))
    }

    /// Goes straight back to the theme modal whatever the outcome. Photos filed
    /// under the deleted theme are left alone.
    pub fn finish_theme_delete(
        &mut self,
        ticket: Ticket<String>,
        result: Result<(), Error>,
    ) -> Result<(), Error> {
        if !self.generation.is_current(&ticket) {
            return Err(Error::Stale);
        }
        self.submissions.delete.release();
        if self.modal == Modal::ConfirmThemeDelete(ticket.request.clone()) {
            self.modal = Modal::Themes;
        }

        result?;
        tracing::info!(slug = %ticket.request, "Theme deleted");
        self.themes.retain(|theme| theme.slug != ticket.request);
        Ok(())
    }

    pub async fn confirm_theme_delete<A: GalleryApi>(&mut self, client: &Client<A>) -> Result<(), Error> {
        let ticket = self.begin_theme_delete()?;
        let result = client.delete_theme(&ticket.request).await;
        self.finish_theme_delete(ticket, result)
    }

    /// Mismatched or short passwords are refused without a request.
    pub fn begin_password_change(&mut self) -> Result<Ticket<PasswordChange>, Error> {
        let change = self.password_form.to_change()?;
        self.submissions.password.acquire()?;
        Ok(self.generation.issue(change))
    }

    pub fn finish_password_change(
        &mut self,
        ticket: Ticket<PasswordChange>,
        result: Result<(), Error>,
    ) -> Result<(), Error> {
        if !self.generation.is_current(&ticket) {
            return Err(Error::Stale);
        }
        self.submissions.password.release();

        result?;
        tracing::info!("Admin password changed");
        self.password_form.reset();
        if self.modal == Modal::Settings {
            self.modal = Modal::None;
        }
        Ok(())
    }

    pub async fn change_password<A: GalleryApi>(&mut self, client: &Client<A>) -> Result<(), Error> {
        let ticket = self.begin_password_change()?;
        let result = client.change_password(&ticket.request).await;
        self.finish_password_change(ticket, result)
    }
}
