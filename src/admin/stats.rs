use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

use lumina_api_structs::{Photo, Theme};

/// Dashboard figures, always projected from the loaded lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_photos: usize,
    pub total_likes: u64,
    pub themes: usize,
    /// Photos created within the trailing seven days.
    pub recent_photos: usize,
}

impl Stats {
    pub fn project(photos: &[Photo], themes: &[Theme], now: OffsetDateTime) -> Self {
        let week_ago = now - Duration::days(7);
        Stats {
            total_photos: photos.len(),
            total_likes: photos.iter().map(|photo| photo.likes).sum(),
            themes: themes.len(),
            recent_photos: photos
                .iter()
                .filter_map(|photo| parse_timestamp(&photo.created_at))
                .filter(|created| *created > week_ago)
                .count(),
        }
    }
}

/// RFC 3339, or ISO 8601 without an offset read as UTC.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(parsed);
    }
    match PrimitiveDateTime::parse(value, &Iso8601::DEFAULT) {
        Ok(parsed) => Some(parsed.assume_utc()),
        Err(err) => {
            tracing::debug!("Unparseable created_at {:?}: {}", value, err);
            None
        },
    }
}
