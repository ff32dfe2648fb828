use thiserror::Error;

/// Minimum length accepted for a new admin password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Input problems caught before anything is sent to the server.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username and password are required")]
    MissingCredentials,
    #[error("Please fill all required fields")]
    IncompleteUpload,
    #[error("Theme name is required")]
    EmptyThemeName,
    #[error("New passwords don't match")]
    PasswordMismatch,
    #[error("Password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("Nothing is awaiting confirmation")]
    NothingToConfirm,
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No session token is held, or the server refused the one that was sent.
    #[error("not authorized")]
    Unauthorized,

    #[error("request rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    #[error("network error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    /// The triggering control is disabled until the outstanding request resolves.
    #[error("another request from this form is still in flight")]
    Busy,

    /// The response arrived after the originating view was left or reloaded.
    #[error("response arrived for a view that is no longer current")]
    Stale,
}

impl Error {
    /// Text to show the user: local validation messages and server-provided
    /// details win, everything else falls back to `fallback`.
    pub fn notice(&self, fallback: &str) -> String {
        match self {
            Error::Validation(err) => err.to_string(),
            Error::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }
}
