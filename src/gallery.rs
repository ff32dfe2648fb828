//! Public browsing state.
//!
//! Loads are split in three steps so that several can be outstanding at once:
//! `begin_load`/`set_filter` stamp a ticket with the current generation,
//! [`GalleryState::fetch`] talks to the server without touching the state, and
//! `apply` merges the batch only if no newer load was started in between.

use std::collections::HashMap;
use std::sync::Arc;

use async_std::task::JoinHandle;
use futures_lite::stream::StreamExt;

use crate::api::GalleryApi;
use crate::client::Client;
use crate::error::Error;
use crate::likes::LikeLedger;
use crate::pending::{Generation, Ticket};
use lumina_api_structs::{Photo, PhotoId, Theme};

pub const LIKE_FAILED: &str = "Failed to like photo";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    All,
    Theme(String),
}

impl Default for Filter {
    fn default() -> Self {
        Filter::All
    }
}

impl Filter {
    pub fn theme(&self) -> Option<&str> {
        match self {
            Filter::All => None,
            Filter::Theme(slug) => Some(slug),
        }
    }
}

impl std::str::FromStr for Filter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "all" => Filter::All,
            slug => Filter::Theme(slug.to_string()),
        })
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Theme(slug) => write!(f, "{}", slug),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub filter: Filter,
    pub with_themes: bool,
}

/// Everything one load fetched, not yet merged.
#[derive(Debug)]
pub struct LoadBatch {
    ticket: Ticket<LoadRequest>,
    themes: Option<Result<Vec<Theme>, Error>>,
    photos: Result<Vec<Photo>, Error>,
    liked: HashMap<PhotoId, bool>,
}

/// What the photo grid shows.
#[derive(Debug, PartialEq, Eq)]
pub enum Grid<'a> {
    Loading,
    Photos(&'a [Photo]),
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked { likes: u64 },
    AlreadyLiked,
}

impl LikeOutcome {
    pub fn notice(&self) -> &'static str {
        match self {
            LikeOutcome::Liked { .. } => "Photo liked!",
            LikeOutcome::AlreadyLiked => "You've already liked this photo",
        }
    }
}

#[derive(Debug)]
pub struct GalleryState {
    filter: Filter,
    themes: Vec<Theme>,
    photos: Vec<Photo>,
    ledger: LikeLedger,
    loading: bool,
    generation: Generation,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryState {
    pub fn new() -> Self {
        GalleryState {
            filter: Filter::All,
            themes: Vec::new(),
            photos: Vec::new(),
            ledger: LikeLedger::new(),
            loading: true,
            generation: Generation::default(),
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn photo(&self, photo_id: &str) -> Option<&Photo> {
        self.photos.iter().find(|photo| photo.id == photo_id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn ledger(&self) -> &LikeLedger {
        &self.ledger
    }

    pub fn is_liked(&self, photo_id: &str) -> bool {
        self.ledger.is_liked(photo_id)
    }

    /// The previous photos stay up while a reload is outstanding.
    pub fn grid(&self) -> Grid<'_> {
        if !self.photos.is_empty() {
            Grid::Photos(&self.photos)
        } else if self.loading {
            Grid::Loading
        } else {
            Grid::Empty
        }
    }

    /// Starts a full load (themes and photos) for the active filter.
    pub fn begin_load(&mut self) -> Ticket<LoadRequest> {
        self.issue(true)
    }

    /// Switches the active filter and starts a photo reload for it.
    pub fn set_filter(&mut self, filter: Filter) -> Ticket<LoadRequest> {
        tracing::debug!(%filter, "Changing gallery filter");
        self.filter = filter;
        self.issue(false)
    }

    fn issue(&mut self, with_themes: bool) -> Ticket<LoadRequest> {
        self.loading = true;
        self.generation.advance();
        self.generation.issue(LoadRequest {
            filter: self.filter.clone(),
            with_themes,
        })
    }

    /// Drops anything still outstanding for this view.
    pub fn leave(&mut self) {
        self.generation.advance();
        self.loading = false;
    }

    /// Fetches themes and photos concurrently, then the liked status of each photo.
    #[tracing::instrument(skip_all, fields(filter = %ticket.request.filter, generation = ticket.generation()))]
    pub async fn fetch<A: GalleryApi + 'static>(
        client: &Arc<Client<A>>,
        ticket: Ticket<LoadRequest>,
    ) -> LoadBatch {
        let with_themes = ticket.request.with_themes;
        let themes = async {
            if with_themes {
                Some(client.list_themes().await)
            } else {
                None
            }
        };
        let photos = client.list_photos(ticket.request.filter.theme());

        let (themes, photos) = futures_lite::future::zip(themes, photos).await;

        let liked = match &photos {
            Ok(photos) => liked_statuses(client, photos).await,
            Err(_) => HashMap::new(),
        };

        LoadBatch {
            ticket,
            themes,
            photos,
            liked,
        }
    }

    /// Merges a fetched batch. Batches from superseded loads are discarded.
    ///
    /// A failed photo fetch keeps the previous list. A failed theme fetch
    /// keeps the previous themes; it is reported only when the photos loaded.
    pub fn apply(&mut self, batch: LoadBatch) -> Result<(), Error> {
        if !self.generation.is_current(&batch.ticket) {
            tracing::debug!(
                generation = batch.ticket.generation(),
                current = self.generation.current(),
                "Discarding stale gallery batch"
            );
            return Err(Error::Stale);
        }
        self.loading = false;

        let themes_result = match batch.themes {
            Some(Ok(themes)) => {
                self.themes = themes;
                Ok(())
            },
            Some(Err(err)) => {
                tracing::error!("Failed to fetch themes: {}", err);
                Err(err)
            },
            None => Ok(()),
        };

        match batch.photos {
            Ok(photos) => {
                for (photo_id, liked) in batch.liked {
                    self.ledger.observe(&photo_id, liked);
                }
                tracing::info!(count = photos.len(), "Loaded gallery photos");
                self.photos = photos;
                themes_result
            },
            Err(err) => {
                tracing::error!("Failed to fetch photos: {}", err);
                Err(err)
            },
        }
    }

    pub async fn load<A: GalleryApi + 'static>(&mut self, client: &Arc<Client<A>>) -> Result<(), Error> {
        let ticket = self.begin_load();
        let batch = Self::fetch(client, ticket).await;
        self.apply(batch)
    }

    pub async fn select<A: GalleryApi + 'static>(
        &mut self,
        client: &Arc<Client<A>>,
        filter: Filter,
    ) -> Result<(), Error> {
        let ticket = self.set_filter(filter);
        let batch = Self::fetch(client, ticket).await;
        self.apply(batch)
    }

    /// Likes a photo. The server decides whether the like is new.
    ///
    /// A fresh like takes the server's count. When the server reports the
    /// photo as already liked the displayed count is left alone. Either way
    /// the ledger ends up holding the like.
    #[tracing::instrument(skip(self, client))]
    pub async fn like<A: GalleryApi>(
        &mut self,
        client: &Client<A>,
        photo_id: &str,
    ) -> Result<LikeOutcome, Error> {
        let response = match client.like_photo(photo_id).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Like request failed: {}", err);
                return Err(err);
            },
        };

        self.ledger.record(photo_id);
        if response.already_liked {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        if let Some(photo) = self.photos.iter_mut().find(|photo| photo.id == photo_id) {
            photo.likes = response.likes;
        }
        Ok(LikeOutcome::Liked {
            likes: response.likes,
        })
    }
}

async fn liked_statuses<A: GalleryApi + 'static>(
    client: &Arc<Client<A>>,
    photos: &[Photo],
) -> HashMap<PhotoId, bool> {
    let handles: Vec<JoinHandle<(PhotoId, bool)>> = photos
        .iter()
        .map(|photo| {
            let client = Arc::clone(client);
            let photo_id = photo.id.clone();
            async_std::task::spawn(async move {
                let liked = match client.liked_status(&photo_id).await {
                    Ok(status) => status.liked,
                    Err(err) => {
                        tracing::debug!("Liked status for {} unavailable: {}", photo_id, err);
                        false
                    },
                };
                (photo_id, liked)
            })
        })
        .collect();

    futures_lite::stream::iter(handles)
        .then(|handle| handle)
        .collect()
        .await
}
