pub type PhotoId = String;
pub type ThemeId = String;

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Photo {
    pub id: PhotoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Slug of the theme the photo was filed under. May no longer resolve to a theme.
    pub theme: String,
    pub image_url: String,
    pub likes: u64,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Theme {
    pub id: ThemeId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct ThemePayload {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct AdminCheck {
    pub exists: bool,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct LikeResponse {
    pub likes: u64,
    #[serde(default)]
    pub already_liked: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct LikedStatus {
    pub liked: bool,
}
