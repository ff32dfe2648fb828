use crate::error::ValidationError;
use lumina_api_structs::ThemePayload;

pub const THEME_CREATED: &str = "Theme created successfully";
pub const THEME_CREATE_FAILED: &str = "Failed to create theme";
pub const THEME_DELETED: &str = "Theme deleted";
pub const THEME_DELETE_FAILED: &str = "Failed to delete theme";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThemeForm {
    pub name: String,
    pub description: String,
}

impl ThemeForm {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// The server derives the slug from the name.
    pub(crate) fn to_payload(&self) -> Result<ThemePayload, ValidationError> {
        if !self.is_complete() {
            return Err(ValidationError::EmptyThemeName);
        }
        Ok(ThemePayload {
            name: self.name.clone(),
            description: self.description.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = ThemeForm::default();
    }
}
