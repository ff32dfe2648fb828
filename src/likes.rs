use std::collections::HashMap;

use lumina_api_structs::PhotoId;

/// What this visitor is known to have liked.
///
/// A `true` entry is never turned back to `false` by the client.
#[derive(Clone, Debug, Default)]
pub struct LikeLedger {
    liked: HashMap<PhotoId, bool>,
}

impl LikeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_liked(&self, photo_id: &str) -> bool {
        self.liked.get(photo_id).copied().unwrap_or(false)
    }

    pub fn record(&mut self, photo_id: &str) {
        self.liked.insert(photo_id.to_string(), true);
    }

    /// Merges a liked-status answer from the server.
    pub fn observe(&mut self, photo_id: &str, liked: bool) {
        let entry = self.liked.entry(photo_id.to_string()).or_insert(false);
        *entry |= liked;
    }

    pub fn len(&self) -> usize {
        self.liked.values().filter(|liked| **liked).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
