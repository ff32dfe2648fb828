use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;
use surf::{RequestBuilder, Response, StatusCode};
use url::Url;

use super::{GalleryApi, PhotoUpload};
use crate::error::Error;
use crate::multipart::Form;
use lumina_api_structs::{
    AdminCheck, Credentials, LikeResponse, LikedStatus, PasswordChange, Photo, Theme,
    ThemePayload, TokenResponse,
};

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Serialize)]
struct PhotoQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// `surf` client for the gallery's `/api` routes.
#[derive(Clone, Debug)]
pub struct HttpApi {
    http: surf::Client,
    endpoint: Url,
}

impl HttpApi {
    pub fn new(endpoint: Url) -> Self {
        HttpApi {
            http: surf::Client::new(),
            endpoint,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            path
        )
    }

    fn bearer(request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token))
    }

    fn json_body<T: Serialize>(
        request: RequestBuilder,
        payload: &T,
    ) -> Result<RequestBuilder, Error> {
        let body = surf::Body::from_json(payload).map_err(|err| Error::Decode(err.to_string()))?;
        Ok(request.body(body))
    }

    async fn send(request: RequestBuilder) -> Result<Response, Error> {
        Self::send_checked(request, true).await
    }

    /// `session` is false for setup and login, where a 401 refuses the
    /// submitted credentials rather than a session.
    async fn send_checked(request: RequestBuilder, session: bool) -> Result<Response, Error> {
        let mut res = request
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let status = res.status();
        let code = status as u16;
        tracing::debug!(status = code, "Gallery API responded");

        if status.is_success() {
            return Ok(res);
        }

        let detail = match res.body_json::<ErrorBody>().await {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
            }) => Some(detail),
            _ => None,
        };
        Err(status_error(code, detail, session))
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Error> {
        Self::decode(Self::send(request).await?).await
    }

    async fn credentials(request: RequestBuilder) -> Result<TokenResponse, Error> {
        Self::decode(Self::send_checked(request, false).await?).await
    }

    async fn decode<T: DeserializeOwned>(mut res: Response) -> Result<T, Error> {
        res.body_json()
            .await
            .map_err(|err| Error::Decode(err.to_string()))
    }
}

fn status_error(code: u16, detail: Option<String>, session: bool) -> Error {
    if session && code == StatusCode::Unauthorized as u16 {
        Error::Unauthorized
    } else {
        Error::Rejected {
            status: code,
            detail,
        }
    }
}

fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

#[async_trait::async_trait]
impl GalleryApi for HttpApi {
    fn origin(&self) -> &Url {
        &self.endpoint
    }

    #[tracing::instrument(skip(self))]
    async fn admin_exists(&self) -> Result<bool, Error> {
        let check: AdminCheck = Self::json(self.http.get(self.url("admin/check"))).await?;
        Ok(check.exists)
    }

    #[tracing::instrument(skip_all)]
    async fn setup_admin(&self, credentials: &Credentials) -> Result<TokenResponse, Error> {
        let request = Self::json_body(self.http.post(self.url("admin/setup")), credentials)?;
        Self::credentials(request).await
    }

    #[tracing::instrument(skip_all)]
    async fn login_admin(&self, credentials: &Credentials) -> Result<TokenResponse, Error> {
        let request = Self::json_body(self.http.post(self.url("admin/login")), credentials)?;
        Self::credentials(request).await
    }

    #[tracing::instrument(skip_all)]
    async fn verify_session(&self, token: &str) -> Result<(), Error> {
        Self::send(Self::bearer(self.http.get(self.url("admin/verify")), token)).await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), Error> {
        let request = Self::bearer(self.http.post(self.url("admin/change-password")), token);
        Self::send(Self::json_body(request, change)?).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_themes(&self) -> Result<Vec<Theme>, Error> {
        Self::json(self.http.get(self.url("themes"))).await
    }

    #[tracing::instrument(skip(self, token))]
    async fn create_theme(&self, token: &str, theme: &ThemePayload) -> Result<Theme, Error> {
        let request = Self::bearer(self.http.post(self.url("themes")), token);
        Self::json(Self::json_body(request, theme)?).await
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_theme(&self, token: &str, slug: &str) -> Result<(), Error> {
        let url = self.url(&format!("themes/{}", segment(slug)));
        Self::send(Self::bearer(self.http.delete(url), token)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn list_photos(&self, theme: Option<&str>) -> Result<Vec<Photo>, Error> {
        let query = serde_qs::to_string(&PhotoQuery { theme })
            .map_err(|err| Error::Decode(err.to_string()))?;
        let url = if query.is_empty() {
            self.url("photos")
        } else {
            format!("{}?{}", self.url("photos"), query)
        };
        Self::json(self.http.get(url)).await
    }

    #[tracing::instrument(skip_all, fields(title = %upload.title, theme = %upload.theme))]
    async fn upload_photo(&self, token: &str, upload: &PhotoUpload) -> Result<Photo, Error> {
        let (content_type, body) = Form::new()
            .text("title", &upload.title)
            .text("description", &upload.description)
            .text("theme", &upload.theme)
            .file(
                "image",
                &upload.image.file_name,
                &upload.image.content_type,
                &upload.image.data,
            )
            .finish();
        tracing::info!("Uploading {} bytes", body.len());

        let request = Self::bearer(self.http.post(self.url("photos")), token)
            .body(surf::Body::from_bytes(body))
            .header("Content-Type", content_type);
        Self::json(request).await
    }

    #[tracing::instrument(skip(self, token))]
    async fn delete_photo(&self, token: &str, photo_id: &str) -> Result<(), Error> {
        let url = self.url(&format!("photos/{}", segment(photo_id)));
        Self::send(Self::bearer(self.http.delete(url), token)).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn like_photo(&self, photo_id: &str) -> Result<LikeResponse, Error> {
        let url = self.url(&format!("photos/{}/like", segment(photo_id)));
        Self::json(self.http.post(url)).await
    }

    #[tracing::instrument(skip(self))]
    async fn liked_status(&self, photo_id: &str) -> Result<LikedStatus, Error> {
        let url = self.url(&format!("photos/{}/liked", segment(photo_id)));
        Self::json(self.http.get(url)).await
    }
}
