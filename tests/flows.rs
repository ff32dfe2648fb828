use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use lumina::admin::{AdminConsole, Modal, PasswordForm};
use lumina::api::{GalleryApi, ImageFile, PhotoUpload};
use lumina::auth::{AuthGate, AuthState};
use lumina::error::{Error, ValidationError};
use lumina::gallery::{Filter, GalleryState, LikeOutcome};
use lumina::session::{MemoryStorage, SessionStore};
use lumina::{AuthMode, Client};
use lumina_api_structs::{
    Credentials, LikeResponse, LikedStatus, PasswordChange, Photo, Theme, ThemePayload,
    TokenResponse,
};
use url::Url;

#[derive(Default)]
struct State {
    admin: Option<Credentials>,
    tokens: HashSet<String>,
    issued: u64,
    themes: Vec<Theme>,
    photos: Vec<Photo>,
    liked: HashSet<String>,
    fail_writes: bool,
    /// Photos whose liked-status lookup fails.
    broken_status: HashSet<String>,
    /// Photos whose liked-status lookup claims a like the server never recorded.
    phantom_likes: HashSet<String>,
    calls: HashMap<&'static str, usize>,
}

impl State {
    fn call(&mut self, name: &'static str) {
        *self.calls.entry(name).or_default() += 1;
    }

    fn authorize(&self, token: &str) -> Result<(), Error> {
        if self.tokens.contains(token) {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }

    fn issue_token(&mut self) -> TokenResponse {
        self.issued += 1;
        let token = format!("token-{}", self.issued);
        self.tokens.insert(token.clone());
        TokenResponse { token }
    }

    fn write_failure(&self) -> Result<(), Error> {
        if self.fail_writes {
            Err(Error::Rejected {
                status: 500,
                detail: None,
            })
        } else {
            Ok(())
        }
    }
}

/// In-memory gallery server. Clones share state, like two tabs on one backend.
#[derive(Clone)]
struct MockApi {
    origin: Url,
    state: Arc<Mutex<State>>,
}

impl MockApi {
    fn new() -> Self {
        MockApi {
            origin: Url::parse("https://gallery.example/").unwrap(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// A server with an admin account, one valid token and a small catalogue.
    fn seeded() -> Self {
        let api = Self::new();
        {
            let mut state = api.state();
            state.admin = Some(credentials("admin", "secret1"));
            state.tokens.insert("valid".to_string());
            state.themes = vec![theme("street"), theme("night")];
            state.photos = vec![
                photo("p", "street", 3),
                photo("q", "night", 0),
                photo("r", "street", 7),
            ];
        }
        api
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn calls(&self, name: &str) -> usize {
        self.state().calls.get(name).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl GalleryApi for MockApi {
    fn origin(&self) -> &Url {
        &self.origin
    }

    async fn admin_exists(&self) -> Result<bool, Error> {
        let mut state = self.state();
        state.call("admin_exists");
        Ok(state.admin.is_some())
    }

    async fn setup_admin(&self, credentials: &Credentials) -> Result<TokenResponse, Error> {
        let mut state = self.state();
        state.call("setup_admin");
        if state.admin.is_some() {
            return Err(Error::Rejected {
                status: 400,
                detail: Some("Admin already exists".to_string()),
            });
        }
        state.admin = Some(credentials.clone());
        Ok(state.issue_token())
    }

    async fn login_admin(&self, credentials: &Credentials) -> Result<TokenResponse, Error> {
        let mut state = self.state();
        state.call("login_admin");
        // Refusals arrive the way `HttpApi` reports a 401 on login.
        if state.admin.as_ref() != Some(credentials) {
            return Err(Error::Rejected {
                status: 401,
                detail: Some("Invalid credentials".to_string()),
            });
        }
        Ok(state.issue_token())
    }

    async fn verify_session(&self, token: &str) -> Result<(), Error> {
        let mut state = self.state();
        state.call("verify_session");
        state.authorize(token)
    }

    async fn change_password(&self, token: &str, change: &PasswordChange) -> Result<(), Error> {
        let mut state = self.state();
        state.call("change_password");
        state.authorize(token)?;
        match &mut state.admin {
            Some(admin) if admin.password == change.current_password => {
                admin.password = change.new_password.clone();
                Ok(())
            },
            _ => Err(Error::Rejected {
                status: 400,
                detail: Some("Current password is incorrect".to_string()),
            }),
        }
    }

    async fn list_themes(&self) -> Result<Vec<Theme>, Error> {
        let mut state = self.state();
        state.call("list_themes");
        Ok(state.themes.clone())
    }

    async fn create_theme(&self, token: &str, payload: &ThemePayload) -> Result<Theme, Error> {
        let mut state = self.state();
        state.call("create_theme");
        state.authorize(token)?;
        state.write_failure()?;
        let mut created = theme(&payload.name.to_lowercase().replace(' ', "-"));
        created.name = payload.name.clone();
        state.themes.push(created.clone());
        Ok(created)
    }

    async fn delete_theme(&self, token: &str, slug: &str) -> Result<(), Error> {
        let mut state = self.state();
        state.call("delete_theme");
        state.authorize(token)?;
        state.write_failure()?;
        let before = state.themes.len();
        state.themes.retain(|theme| theme.slug != slug);
        if state.themes.len() == before {
            return Err(Error::Rejected {
                status: 404,
                detail: Some("Theme not found".to_string()),
            });
        }
        Ok(())
    }

    async fn list_photos(&self, theme: Option<&str>) -> Result<Vec<Photo>, Error> {
        let mut state = self.state();
        state.call("list_photos");
        Ok(state
            .photos
            .iter()
            .filter(|photo| theme.map_or(true, |theme| photo.theme == theme))
            .cloned()
            .collect())
    }

    async fn upload_photo(&self, token: &str, upload: &PhotoUpload) -> Result<Photo, Error> {
        let mut state = self.state();
        state.call("upload_photo");
        state.authorize(token)?;
        state.write_failure()?;
        let mut created = photo(&format!("up-{}", state.photos.len()), &upload.theme, 0);
        created.title = upload.title.clone();
        state.photos.insert(0, created.clone());
        Ok(created)
    }

    async fn delete_photo(&self, token: &str, photo_id: &str) -> Result<(), Error> {
        let mut state = self.state();
        state.call("delete_photo");
        state.authorize(token)?;
        state.write_failure()?;
        state.photos.retain(|photo| photo.id != photo_id);
        Ok(())
    }

    async fn like_photo(&self, photo_id: &str) -> Result<LikeResponse, Error> {
        let mut state = self.state();
        state.call("like_photo");
        let already_liked = !state.liked.insert(photo_id.to_string());
        let photo = state
            .photos
            .iter_mut()
            .find(|photo| photo.id == photo_id)
            .ok_or(Error::Rejected {
                status: 404,
                detail: None,
            })?;
        if !already_liked {
            photo.likes += 1;
        }
        Ok(LikeResponse {
            likes: photo.likes,
            already_liked,
        })
    }

    async fn liked_status(&self, photo_id: &str) -> Result<LikedStatus, Error> {
        let mut state = self.state();
        state.call("liked_status");
        if state.broken_status.contains(photo_id) {
            return Err(Error::Transport("connection reset".to_string()));
        }
        Ok(LikedStatus {
            liked: state.liked.contains(photo_id) || state.phantom_likes.contains(photo_id),
        })
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn theme(slug: &str) -> Theme {
    Theme {
        id: format!("t-{}", slug),
        slug: slug.to_string(),
        name: slug.to_string(),
        description: None,
    }
}

fn photo(id: &str, theme: &str, likes: u64) -> Photo {
    Photo {
        id: id.to_string(),
        title: format!("Photo {}", id),
        description: None,
        theme: theme.to_string(),
        image_url: format!("/uploads/{}.jpg", id),
        likes,
        created_at: "2026-10-14T09:30:00Z".to_string(),
    }
}

fn signed_in(api: &MockApi) -> Arc<Client<MockApi>> {
    let session = SessionStore::open(MemoryStorage::with_token("valid"));
    Arc::new(Client::new(api.clone(), session))
}

fn anonymous(api: &MockApi) -> Arc<Client<MockApi>> {
    Arc::new(Client::new(api.clone(), SessionStore::ephemeral()))
}

#[async_std::test]
async fn liking_twice_counts_once() {
    let api = MockApi::seeded();
    let client = anonymous(&api);
    let mut gallery = GalleryState::new();
    gallery.load(&client).await.unwrap();
    assert!(!gallery.is_liked("p"));

    let outcome = gallery.like(&client, "p").await.unwrap();
    assert_eq!(outcome, LikeOutcome::Liked { likes: 4 });
    assert_eq!(gallery.photo("p").map(|photo| photo.likes), Some(4));
    assert!(gallery.is_liked("p"));

    let outcome = gallery.like(&client, "p").await.unwrap();
    assert_eq!(outcome, LikeOutcome::AlreadyLiked);
    assert_eq!(outcome.notice(), "You've already liked this photo");
    assert_eq!(gallery.photo("p").map(|photo| photo.likes), Some(4));

    // A fresh visit learns the like from the server.
    let mut revisit = GalleryState::new();
    revisit.load(&client).await.unwrap();
    assert!(revisit.is_liked("p"));
    assert_eq!(
        revisit.like(&client, "p").await.unwrap(),
        LikeOutcome::AlreadyLiked
    );
    assert_eq!(revisit.photo("p").map(|photo| photo.likes), Some(4));
}

#[async_std::test]
async fn image_urls_resolve_against_the_api_origin() {
    let api = MockApi::seeded();
    let client = anonymous(&api);
    let photos = client.list_photos(None).await.unwrap();
    assert_eq!(
        client.image_url(&photos[0]),
        "https://gallery.example/uploads/p.jpg"
    );
}

#[async_std::test]
async fn setup_then_reload_verifies_silently() {
    let api = MockApi::new();
    let storage = MemoryStorage::new();

    let client = Client::new(api.clone(), SessionStore::open(storage.clone()));
    let mut gate = AuthGate::new();
    assert_eq!(gate.enter(&client).await, &AuthState::NeedsSetup);

    gate.form = credentials("admin", "secret1");
    assert_eq!(gate.submit(&client).await, Ok(AuthMode::Setup));
    assert!(gate.is_authenticated());
    assert!(gate.form.password.is_empty());
    assert!(storage.persisted().is_some());

    let reloaded = Client::new(api.clone(), SessionStore::open(storage.clone()));
    let mut gate = AuthGate::new();
    assert_eq!(gate.enter(&reloaded).await, &AuthState::Authenticated);
    assert_eq!(api.calls("login_admin"), 0);
    assert_eq!(api.calls("verify_session"), 1);
}

#[async_std::test]
async fn failed_login_keeps_the_form() {
    let api = MockApi::seeded();
    let client = anonymous(&api);
    let mut gate = AuthGate::new();
    assert_eq!(gate.enter(&client).await, &AuthState::NeedsLogin);

    gate.form = credentials("admin", "wrong-password");
    assert!(gate.submit(&client).await.is_err());
    assert_eq!(
        gate.state(),
        &AuthState::Failed {
            mode: AuthMode::Login,
            reason: "Invalid credentials".to_string(),
        }
    );
    assert_eq!(gate.form.password, "wrong-password");
    assert!(!client.session().is_held());
}

#[async_std::test]
async fn rejected_stored_token_falls_back_to_login() {
    let api = MockApi::seeded();
    let storage = MemoryStorage::with_token("expired");
    let client = Client::new(api.clone(), SessionStore::open(storage.clone()));

    let mut gate = AuthGate::new();
    assert_eq!(gate.enter(&client).await, &AuthState::NeedsLogin);
    assert!(!client.session().is_held());
    assert_eq!(storage.persisted(), None);
}

#[async_std::test]
async fn unauthorized_answer_clears_the_token() {
    let api = MockApi::seeded();
    let storage = MemoryStorage::with_token("revoked");
    let client = Client::new(api.clone(), SessionStore::open(storage.clone()));

    assert_eq!(client.delete_photo("p").await, Err(Error::Unauthorized));
    assert!(!client.session().is_held());
    assert_eq!(storage.persisted(), None);

    // Without a token the request is never sent.
    assert_eq!(client.delete_photo("p").await, Err(Error::Unauthorized));
    assert_eq!(api.calls("delete_photo"), 1);
    assert_eq!(api.state().photos.len(), 3);
}

#[async_std::test]
async fn logout_drops_the_persisted_token() {
    let api = MockApi::seeded();
    let storage = MemoryStorage::with_token("valid");
    let client = Client::new(api.clone(), SessionStore::open(storage.clone()));

    let mut console = AdminConsole::new();
    console.mount(&client).await.unwrap();
    assert_eq!(console.logout(&client), "Logged out successfully");
    assert_eq!(storage.persisted(), None);

    let mut console = AdminConsole::new();
    assert_eq!(console.mount(&client).await, Err(Error::Unauthorized));
}

#[async_std::test]
async fn deleting_a_theme_spares_its_photos() {
    let api = MockApi::seeded();
    let client = signed_in(&api);
    let mut console = AdminConsole::new();
    console.mount(&client).await.unwrap();
    assert!(!console.is_loading());
    assert_eq!(console.themes().len(), 2);

    console.open_themes();
    console.request_theme_delete("street");
    console.confirm_theme_delete(&client).await.unwrap();

    assert_eq!(console.modal(), &Modal::Themes);
    assert!(console.themes().iter().all(|theme| theme.slug != "street"));
    assert!(console.photos().iter().any(|photo| photo.id == "p"));

    let street = client.list_photos(Some("street")).await.unwrap();
    assert!(street.iter().any(|photo| photo.id == "p"));
}

#[async_std::test]
async fn failed_writes_leave_the_lists_alone() {
    let api = MockApi::seeded();
    let client = signed_in(&api);
    let mut console = AdminConsole::new();
    console.mount(&client).await.unwrap();
    let photos = console.photos().to_vec();
    let themes = console.themes().to_vec();

    api.state().fail_writes = true;

    console.open_upload();
    console.upload_form.title = "Harbour".to_string();
    console.upload_form.theme = Some("night".to_string());
    console
        .upload_form
        .select_image(ImageFile::new("harbour.png", vec![0x89, 0x50, 0x4e, 0x47]));
    let err = console.upload(&client).await.unwrap_err();
    assert_eq!(err.notice("Failed to upload photo"), "Failed to upload photo");
    assert_eq!(console.photos(), &photos[..]);
    assert!(console.upload_form.is_complete());
    assert!(console.can_upload());

    console.request_photo_delete("q");
    assert!(console.confirm_photo_delete(&client).await.is_err());
    assert_eq!(console.photos(), &photos[..]);
    assert_eq!(console.modal(), &Modal::None);
    assert!(!console.is_deleting());

    console.theme_form.name = "Portraits".to_string();
    assert!(console.create_theme(&client).await.is_err());
    assert_eq!(console.themes(), &themes[..]);
    assert_eq!(console.theme_form.name, "Portraits");
}

#[async_std::test]
async fn successful_upload_goes_to_the_front() {
    let api = MockApi::seeded();
    let client = signed_in(&api);
    let mut console = AdminConsole::new();
    console.mount(&client).await.unwrap();

    console.open_upload();
    console.upload_form.title = "Harbour".to_string();
    console.upload_form.theme = Some("night".to_string());
    console
        .upload_form
        .select_image(ImageFile::new("harbour.jpg", vec![0xff, 0xd8]));
    console.upload(&client).await.unwrap();

    assert_eq!(console.photos().len(), 4);
    assert_eq!(console.photos()[0].title, "Harbour");
    assert_eq!(console.modal(), &Modal::None);
    assert!(!console.upload_form.is_complete());
}

#[async_std::test]
async fn liked_status_failure_reads_as_not_liked() {
    let api = MockApi::seeded();
    {
        let mut state = api.state();
        state.liked.insert("p".to_string());
        state.broken_status = ["p", "q", "r"].iter().map(|id| id.to_string()).collect();
    }

    let client = anonymous(&api);
    let mut gallery = GalleryState::new();
    gallery.load(&client).await.unwrap();

    assert_eq!(gallery.photos().len(), 3);
    assert_eq!(gallery.themes().len(), 2);
    assert!(gallery.photos().iter().all(|photo| !gallery.is_liked(&photo.id)));
    assert_eq!(api.calls("liked_status"), 3);
}

#[async_std::test]
async fn one_failed_liked_status_only_affects_its_photo() {
    let api = MockApi::seeded();
    {
        let mut state = api.state();
        state.liked.insert("p".to_string());
        state.liked.insert("q".to_string());
        state.broken_status.insert("q".to_string());
    }

    let client = anonymous(&api);
    let mut gallery = GalleryState::new();
    gallery.load(&client).await.unwrap();

    assert_eq!(gallery.photos().len(), 3);
    assert!(gallery.is_liked("p"));
    assert!(!gallery.is_liked("q"));
    assert!(!gallery.is_liked("r"));
}

#[async_std::test]
async fn fresh_like_takes_the_server_count_over_the_ledger() {
    let api = MockApi::seeded();
    api.state().phantom_likes.insert("p".to_string());

    let client = anonymous(&api);
    let mut gallery = GalleryState::new();
    gallery.load(&client).await.unwrap();
    assert!(gallery.is_liked("p"));
    assert_eq!(gallery.photo("p").map(|photo| photo.likes), Some(3));

    let outcome = gallery.like(&client, "p").await.unwrap();
    assert_eq!(outcome, LikeOutcome::Liked { likes: 4 });
    assert_eq!(gallery.photo("p").map(|photo| photo.likes), Some(4));
    assert_eq!(
        api.state().photos.iter().find(|photo| photo.id == "p").map(|photo| photo.likes),
        Some(4)
    );
    assert!(gallery.is_liked("p"));
}

#[async_std::test]
async fn only_the_latest_filter_is_applied() {
    let api = MockApi::seeded();
    let client = anonymous(&api);
    let mut gallery = GalleryState::new();

    let street = gallery.set_filter(Filter::Theme("street".to_string()));
    let night = gallery.set_filter(Filter::Theme("night".to_string()));

    let street = GalleryState::fetch(&client, street).await;
    let night = GalleryState::fetch(&client, night).await;

    gallery.apply(night).unwrap();
    assert_eq!(gallery.apply(street), Err(Error::Stale));

    assert_eq!(gallery.filter(), &Filter::Theme("night".to_string()));
    assert_eq!(gallery.photos().len(), 1);
    assert_eq!(gallery.photos()[0].id, "q");
}

#[async_std::test]
async fn bad_password_confirmation_never_reaches_the_server() {
    let api = MockApi::seeded();
    let client = signed_in(&api);
    let mut console = AdminConsole::new();
    console.mount(&client).await.unwrap();

    console.open_settings();
    console.password_form = PasswordForm {
        current_password: "secret1".to_string(),
        new_password: "longenough".to_string(),
        confirm_password: "different".to_string(),
    };
    assert_eq!(
        console.change_password(&client).await,
        Err(Error::Validation(ValidationError::PasswordMismatch))
    );
    assert_eq!(api.calls("change_password"), 0);
    assert_eq!(console.modal(), &Modal::Settings);
}

#[async_std::test]
async fn changed_password_is_used_for_the_next_login() {
    let api = MockApi::seeded();
    let client = signed_in(&api);
    let mut console = AdminConsole::new();
    console.mount(&client).await.unwrap();

    console.open_settings();
    console.password_form = PasswordForm {
        current_password: "secret1".to_string(),
        new_password: "secret2".to_string(),
        confirm_password: "secret2".to_string(),
    };
    console.change_password(&client).await.unwrap();
    assert_eq!(console.password_form, PasswordForm::default());
    assert_eq!(console.modal(), &Modal::None);

    let fresh = anonymous(&api);
    let mut gate = AuthGate::new();
    gate.enter(&fresh).await;
    gate.form = credentials("admin", "secret2");
    assert_eq!(gate.submit(&fresh).await, Ok(AuthMode::Login));
    assert!(fresh.session().is_held());
}
