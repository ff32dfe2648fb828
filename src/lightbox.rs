use lumina_api_structs::{Photo, PhotoId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Escape,
    Other,
}

impl std::str::FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "right" | "arrowright" | "n" | "next" => Key::ArrowRight,
            "left" | "arrowleft" | "p" | "prev" => Key::ArrowLeft,
            "esc" | "escape" | "q" => Key::Escape,
            _ => Key::Other,
        })
    }
}

/// Single-photo viewer with circular navigation over the gallery's current list.
///
/// Only the identity of the open photo is kept; the photo itself is always
/// looked up in the list handed in, so like counts stay live.
#[derive(Clone, Debug, Default)]
pub struct Lightbox {
    open: Option<PhotoId>,
}

impl Lightbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_id(&self) -> Option<&str> {
        self.open.as_deref()
    }

    /// Keyboard bindings exist exactly while a photo is open.
    pub fn bindings_active(&self) -> bool {
        self.is_open()
    }

    pub fn open(&mut self, photos: &[Photo], photo_id: &str) -> bool {
        if photos.iter().any(|photo| photo.id == photo_id) {
            self.open = Some(photo_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn current<'a>(&self, photos: &'a [Photo]) -> Option<&'a Photo> {
        let open = self.open.as_deref()?;
        photos.iter().find(|photo| photo.id == open)
    }

    pub fn next(&mut self, photos: &[Photo]) {
        self.step(photos, Direction::Next)
    }

    pub fn prev(&mut self, photos: &[Photo]) {
        self.step(photos, Direction::Prev)
    }

    /// Returns `true` when the key was bound and handled.
    pub fn handle_key(&mut self, key: Key, photos: &[Photo]) -> bool {
        if !self.bindings_active() {
            return false;
        }
        match key {
            Key::ArrowRight => self.next(photos),
            Key::ArrowLeft => self.prev(photos),
            Key::Escape => self.close(),
            Key::Other => return false,
        }
        true
    }

    fn step(&mut self, photos: &[Photo], direction: Direction) {
        let open = match &self.open {
            Some(open) => open,
            None => return,
        };
        if photos.is_empty() {
            return;
        }

        let last = photos.len() - 1;
        let position = photos.iter().position(|photo| &photo.id == open);
        let index = match (position, direction) {
            (Some(i), Direction::Next) if i == last => 0,
            (Some(i), Direction::Next) => i + 1,
            (Some(0), Direction::Prev) => last,
            (Some(i), Direction::Prev) => i - 1,
            // The open photo left the list after a filter change.
            (None, Direction::Next) => 0,
            (None, Direction::Prev) => last,
        };
        self.open = Some(photos[index].id.clone());
    }
}

#[derive(Clone, Copy, Debug)]
enum Direction {
    Next,
    Prev,
}
