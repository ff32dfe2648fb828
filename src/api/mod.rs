use url::Url;

use crate::error::Error;
use lumina_api_structs::{
    Credentials, LikeResponse, LikedStatus, PasswordChange, Photo, Theme, ThemePayload,
    TokenResponse,
};

pub mod http;

pub use http::HttpApi;

/// Binary image selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        ImageFile {
            file_name,
            content_type,
            data,
        }
    }

    pub async fn read(path: &std::path::Path) -> std::io::Result<Self> {
        let data = async_std::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, data))
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// The multipart upload request: three text fields plus the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoUpload {
    pub title: String,
    pub description: String,
    pub theme: String,
    pub image: ImageFile,
}

/// The remote gallery collaborator.
///
/// Privileged operations receive the bearer token explicitly; implementations
/// never hold on to one.
#[async_trait::async_trait]
pub trait GalleryApi: Send + Sync {
    /// Origin that relative image URLs are resolved against.
    fn origin(&self) -> &Url;

    async fn admin_exists(&self) -> Result<bool, Error>;

    async fn setup_admin(&self, credentials: &Credentials) -> Result<TokenResponse, Error>;

    async fn login_admin(&self, credentials: &Credentials) -> Result<TokenResponse, Error>;

    async fn verify_session(&self, token: &str) -> Result<(), Error>;

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), Error>;

    async fn list_themes(&self) -> Result<Vec<Theme>, Error>;

    async fn create_theme(&self, token: &str, theme: &ThemePayload) -> Result<Theme, Error>;

    async fn delete_theme(&self, token: &str, slug: &str) -> Result<(), Error>;

    async fn list_photos(&self, theme: Option<&str>) -> Result<Vec<Photo>, Error>;

    async fn upload_photo(&self, token: &str, upload: &PhotoUpload) -> Result<Photo, Error>;

    async fn delete_photo(&self, token: &str, photo_id: &str) -> Result<(), Error>;

    async fn like_photo(&self, photo_id: &str) -> Result<LikeResponse, Error>;

    async fn liked_status(&self, photo_id: &str) -> Result<LikedStatus, Error>;
}

/// Absolute http(s) URLs are kept; anything else is resolved against `origin`.
pub fn resolve_image_url(origin: &Url, image_url: &str) -> String {
    if let Ok(url) = Url::parse(image_url) {
        if url.scheme() == "http" || url.scheme() == "https" {
            return url.to_string();
        }
    }

    match origin.join(image_url) {
        Ok(url) => url.to_string(),
        Err(err) => {
            tracing::warn!("Could not resolve image URL {:?}: {}", image_url, err);
            image_url.to_string()
        },
    }
}
