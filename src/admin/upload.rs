use crate::api::{ImageFile, PhotoUpload};
use crate::error::ValidationError;

pub const UPLOADED: &str = "Photo uploaded successfully!";
pub const UPLOAD_FAILED: &str = "Failed to upload photo";

/// The upload modal's form. The selected image doubles as its preview.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub theme: Option<String>,
    image: Option<ImageFile>,
}

impl UploadForm {
    pub fn select_image(&mut self, image: ImageFile) {
        self.image = Some(image);
    }

    pub fn preview(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    /// Title, theme and image are all present.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && self.theme.as_deref().map_or(false, |theme| !theme.is_empty())
            && self.image.is_some()
    }

    pub(crate) fn to_request(&self) -> Result<PhotoUpload, ValidationError> {
        match (&self.theme, &self.image) {
            (Some(theme), Some(image)) if self.is_complete() => Ok(PhotoUpload {
                title: self.title.clone(),
                description: self.description.clone(),
                theme: theme.clone(),
                image: image.clone(),
            }),
            _ => Err(ValidationError::IncompleteUpload),
        }
    }

    pub fn reset(&mut self) {
        *self = UploadForm::default();
    }
}
