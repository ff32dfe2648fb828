use crate::error::{ValidationError, MIN_PASSWORD_LEN};
use lumina_api_structs::PasswordChange;

pub const PASSWORD_CHANGED: &str = "Password changed successfully";
pub const PASSWORD_CHANGE_FAILED: &str = "Failed to change password";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    pub(crate) fn to_change(&self) -> Result<PasswordChange, ValidationError> {
        if self.new_password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(PasswordChange {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = PasswordForm::default();
    }
}
