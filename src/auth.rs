//! Admin entry point.
//!
//! The gate first asks whether an admin account exists, which picks the setup
//! or the login form. A held token is checked silently before either form is
//! offered. Both forms are identical apart from the endpoint they submit to.

use crate::api::GalleryApi;
use crate::client::{AuthMode, Client};
use crate::error::{Error, ValidationError};
use lumina_api_structs::Credentials;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Checking,
    NeedsSetup,
    NeedsLogin,
    Authenticating(AuthMode),
    Authenticated,
    /// The last submission was refused. The form for `mode` stays up with its input.
    Failed { mode: AuthMode, reason: String },
}

impl AuthState {
    fn form(mode: AuthMode) -> Self {
        match mode {
            AuthMode::Setup => AuthState::NeedsSetup,
            AuthMode::Login => AuthState::NeedsLogin,
        }
    }

    /// The form that should be on screen, if any.
    pub fn form_mode(&self) -> Option<AuthMode> {
        match self {
            AuthState::NeedsSetup => Some(AuthMode::Setup),
            AuthState::NeedsLogin => Some(AuthMode::Login),
            AuthState::Authenticating(mode) => Some(*mode),
            AuthState::Failed { mode, .. } => Some(*mode),
            AuthState::Checking | AuthState::Authenticated => None,
        }
    }
}

#[derive(Debug)]
pub struct AuthGate {
    state: AuthState,
    mode: AuthMode,
    pub form: Credentials,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGate {
    pub fn new() -> Self {
        AuthGate {
            state: AuthState::Checking,
            mode: AuthMode::Login,
            form: Credentials::default(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn submit_enabled(&self) -> bool {
        matches!(
            self.state,
            AuthState::NeedsSetup | AuthState::NeedsLogin | AuthState::Failed { .. }
        )
    }

    /// Resolves setup-vs-login and silently verifies a held token.
    #[tracing::instrument(skip_all)]
    pub async fn enter<A: GalleryApi>(&mut self, client: &Client<A>) -> &AuthState {
        self.state = AuthState::Checking;

        self.mode = match client.admin_exists().await {
            Ok(exists) => AuthMode::from_exists(exists),
            Err(err) => {
                tracing::error!("Failed to check for an admin account: {}", err);
                AuthMode::Login
            },
        };

        if client.session().is_held() {
            match client.verify().await {
                Ok(()) => {
                    tracing::info!("Held session token verified");
                    self.state = AuthState::Authenticated;
                    return &self.state;
                },
                Err(_) => tracing::info!("Held session token was not accepted"),
            }
        }

        self.state = AuthState::form(self.mode);
        &self.state
    }

    /// Submits the form to the endpoint chosen by `enter`.
    ///
    /// A refusal moves to `Failed` and keeps what was typed. Empty fields are
    /// rejected without a request.
    #[tracing::instrument(skip_all, fields(mode = ?self.mode))]
    pub async fn submit<A: GalleryApi>(&mut self, client: &Client<A>) -> Result<AuthMode, Error> {
        if !self.submit_enabled() {
            return Err(Error::Busy);
        }
        if self.form.username.trim().is_empty() || self.form.password.is_empty() {
            return Err(ValidationError::MissingCredentials.into());
        }

        let mode = self.mode;
        self.state = AuthState::Authenticating(mode);

        match client.authenticate(mode, &self.form).await {
            Ok(()) => {
                tracing::info!("Signed in");
                self.state = AuthState::Authenticated;
                self.form.password.clear();
                Ok(mode)
            },
            Err(err) => {
                let reason = err.notice("Authentication failed");
                tracing::warn!("Sign-in refused: {}", reason);
                self.state = AuthState::Failed { mode, reason };
                Err(err)
            },
        }
    }

    /// A privileged view found the session gone.
    pub fn session_lost(&mut self) {
        self.state = AuthState::NeedsLogin;
        self.mode = AuthMode::Login;
    }

    pub fn logout<A: GalleryApi>(&mut self, client: &Client<A>) -> &'static str {
        client.logout();
        self.form = Credentials::default();
        self.session_lost();
        "Logged out successfully"
    }
}
