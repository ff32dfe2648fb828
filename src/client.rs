use std::future::Future;

use crate::api::{resolve_image_url, GalleryApi, PhotoUpload};
use crate::error::Error;
use crate::session::SessionStore;
use lumina_api_structs::{
    Credentials, LikeResponse, LikedStatus, PasswordChange, Photo, Theme, ThemePayload,
};

/// Which admin endpoint a credentials submission goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    /// No admin account exists yet.
    Setup,
    Login,
}

impl AuthMode {
    pub fn from_exists(exists: bool) -> Self {
        if exists {
            AuthMode::Login
        } else {
            AuthMode::Setup
        }
    }

    pub fn success_notice(self) -> &'static str {
        match self {
            AuthMode::Setup => "Admin account created!",
            AuthMode::Login => "Welcome back!",
        }
    }
}

/// Dispatch layer between the gallery components and the remote collaborator.
///
/// This is the only place the session token is read. It is looked up when each
/// privileged request is sent, and dropped whenever the server answers 401.
pub struct Client<A> {
    api: A,
    session: SessionStore,
}

impl<A: GalleryApi> Client<A> {
    pub fn new(api: A, session: SessionStore) -> Self {
        Client { api, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn image_url(&self, photo: &Photo) -> String {
        resolve_image_url(self.api.origin(), &photo.image_url)
    }

    async fn privileged<T, F, Fut>(&self, call: F) -> Result<T, Error>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let token = match self.session.token() {
            Some(token) => token,
            None => return Err(Error::Unauthorized),
        };

        let result = call(token).await;
        if let Err(Error::Unauthorized) = result {
            tracing::warn!("Server rejected the session token");
            self.session.clear();
        }
        result
    }

    pub async fn admin_exists(&self) -> Result<bool, Error> {
        self.api.admin_exists().await
    }

    /// Sends credentials to the setup or login endpoint and stores the returned token.
    pub async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> Result<(), Error> {
        let response = match mode {
            AuthMode::Setup => self.api.setup_admin(credentials).await?,
            AuthMode::Login => self.api.login_admin(credentials).await?,
        };
        self.session.set(response.token);
        Ok(())
    }

    /// Checks the held token with the server. Any failure drops the token.
    pub async fn verify(&self) -> Result<(), Error> {
        let token = match self.session.token() {
            Some(token) => token,
            None => return Err(Error::Unauthorized),
        };

        match self.api.verify_session(&token).await {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::info!("Session verification failed: {}", err);
                self.session.clear();
                Err(Error::Unauthorized)
            },
        }
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), Error> {
        self.privileged(move |token| async move { self.api.change_password(&token, change).await })
            .await
    }

    pub async fn list_themes(&self) -> Result<Vec<Theme>, Error> {
        self.api.list_themes().await
    }

    pub async fn create_theme(&self, theme: &ThemePayload) -> Result<Theme, Error> {
        self.privileged(move |token| async move { self.api.create_theme(&token, theme).await })
            .await
    }

    pub async fn delete_theme(&self, slug: &str) -> Result<(), Error> {
        self.privileged(move |token| async move { self.api.delete_theme(&token, slug).await })
            .await
    }

    pub async fn list_photos(&self, theme: Option<&str>) -> Result<Vec<Photo>, Error> {
        self.api.list_photos(theme).await
    }

    pub async fn upload_photo(&self, upload: &PhotoUpload) -> Result<Photo, Error> {
        self.privileged(move |token| async move { self.api.upload_photo(&token, upload).await })
            .await
    }

    pub async fn delete_photo(&self, photo_id: &str) -> Result<(), Error> {
        self.privileged(move |token| async move { self.api.delete_photo(&token, photo_id).await })
            .await
    }

    pub async fn like_photo(&self, photo_id: &str) -> Result<LikeResponse, Error> {
        self.api.like_photo(photo_id).await
    }

    pub async fn liked_status(&self, photo_id: &str) -> Result<LikedStatus, Error> {
        self.api.liked_status(photo_id).await
    }
}
