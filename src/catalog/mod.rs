//! Catalog data model and service traits.
//!
//! This module describes the items a media server exposes (movies, shows,
//! seasons, episodes) together with the traits used to query a server and
//! to establish a connection to one.
mod plex;
mod plex_types;

pub use plex::{PlexConnector, PlexServer};

use crate::table::ServerRecord;
use thiserror::Error;

/// Errors that can occur while talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Request to the catalog service failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The server rejected the configured token
    #[error("Authentication rejected by {url}")]
    Unauthorized { url: String },

    /// Failed to parse the server's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The configured server URL cannot be used
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A single genre or person label attached to an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub tag: String,
}

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Technical description of one media file backing a playable item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaFile {
    pub container: Option<String>,
    pub video_codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Frame rate label as reported by the server (`24p`, `PAL`, ...)
    pub video_frame_rate: Option<String>,
    pub audio_codec: Option<String>,
    pub audio_channels: Option<u32>,
}

/// Content rating plus audience and critic scores.
///
/// Scores are fractions in `0.0..=1.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ratings {
    pub content_rating: Option<String>,
    pub audience: Option<f64>,
    pub critic: Option<f64>,
}

/// Fields every catalog item carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemHeader {
    /// Globally unique identifier (`plex://movie/...`)
    pub guid: String,
    /// Server-local key used for child lookups
    pub rating_key: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movie {
    pub header: ItemHeader,
    pub year: Option<i32>,
    pub tagline: Option<String>,
    pub ratings: Ratings,
    pub genres: Vec<Tag>,
    pub directors: Vec<Tag>,
    pub writers: Vec<Tag>,
    pub actors: Vec<Tag>,
    pub media: Vec<MediaFile>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Show {
    pub header: ItemHeader,
    pub year: Option<i32>,
    pub tagline: Option<String>,
    pub ratings: Ratings,
    pub genres: Vec<Tag>,
    pub network: Option<String>,
    pub studio: Option<String>,
    /// Average episode runtime in milliseconds
    pub duration_ms: Option<u64>,
    /// Number of seasons
    pub child_count: Option<u32>,
    /// Number of episodes across all seasons
    pub leaf_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Season {
    pub header: ItemHeader,
    pub index: Option<u32>,
    /// Title of the show this season belongs to
    pub show_title: String,
    /// Number of episodes in this season
    pub leaf_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Episode {
    pub header: ItemHeader,
    /// Title of the show this episode belongs to
    pub show_title: String,
    pub season_index: Option<u32>,
    pub index: Option<u32>,
    pub ratings: Ratings,
    pub directors: Vec<Tag>,
    pub writers: Vec<Tag>,
    pub actors: Vec<Tag>,
    pub media: Vec<MediaFile>,
}

/// An item of a type this crate has no dedicated representation for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownItem {
    pub header: ItemHeader,
    pub year: Option<i32>,
    /// Raw type reported by the server (`clip`, `artist`, `photo`, ...)
    pub kind: String,
}

/// A single entry of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItem {
    Movie(Movie),
    Show(Show),
    Season(Season),
    Episode(Episode),
    Unknown(UnknownItem),
}

/// Raw type of the only unrecognized item kind that is still video content.
const CLIP_KIND: &str = "clip";

impl CatalogItem {
    pub fn header(&self) -> &ItemHeader {
        match self {
            CatalogItem::Movie(m) => &m.header,
            CatalogItem::Show(s) => &s.header,
            CatalogItem::Season(s) => &s.header,
            CatalogItem::Episode(e) => &e.header,
            CatalogItem::Unknown(u) => &u.header,
        }
    }

    pub fn guid(&self) -> &str {
        &self.header().guid
    }

    pub fn title(&self) -> &str {
        &self.header().title
    }

    pub fn summary(&self) -> &str {
        &self.header().summary
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            CatalogItem::Movie(m) => m.year,
            CatalogItem::Show(s) => s.year,
            CatalogItem::Unknown(u) => u.year,
            CatalogItem::Season(_) | CatalogItem::Episode(_) => None,
        }
    }

    /// Whether the item represents video content a user can browse to.
    pub fn is_video(&self) -> bool {
        match self {
            CatalogItem::Movie(_)
            | CatalogItem::Show(_)
            | CatalogItem::Season(_)
            | CatalogItem::Episode(_) => true,
            CatalogItem::Unknown(u) => u.kind == CLIP_KIND,
        }
    }
}

/// Trait for catalog services that can be searched and browsed.
///
/// Implementors wrap a connection to a concrete media server.
pub trait CatalogService: Send + Sync {
    /// Runs a free-text search across all libraries.
    ///
    /// Results are returned in the order the server ranks them and may
    /// include non-video items.
    fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError>;

    /// Looks up a single item by its guid.
    ///
    /// Returns `Ok(None)` when no library contains the guid.
    fn fetch_by_guid(&self, guid: &str) -> Result<Option<CatalogItem>, CatalogError>;

    /// Lists the seasons of a show in the order the server returns them.
    fn seasons(&self, show: &Show) -> Result<Vec<Season>, CatalogError>;
}

/// Trait for establishing a connection to a catalog service from a
/// persisted server record.
pub trait CatalogConnector: Send + Sync {
    /// Connects to the server described by `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or rejects the token.
    fn connect(&self, record: &ServerRecord) -> Result<Box<dyn CatalogService>, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown(kind: &str) -> CatalogItem {
        CatalogItem::Unknown(UnknownItem {
            kind: kind.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_video_variants() {
        assert!(CatalogItem::Movie(Movie::default()).is_video());
        assert!(CatalogItem::Show(Show::default()).is_video());
        assert!(CatalogItem::Season(Season::default()).is_video());
        assert!(CatalogItem::Episode(Episode::default()).is_video());
        assert!(unknown("clip").is_video());
    }

    #[test]
    fn test_non_video_variants() {
        assert!(!unknown("artist").is_video());
        assert!(!unknown("track").is_video());
        assert!(!unknown("photo").is_video());
    }

    #[test]
    fn test_header_accessors() {
        let item = CatalogItem::Movie(Movie {
            header: ItemHeader {
                guid: "plex://movie/1".to_string(),
                title: "Heat".to_string(),
                summary: "A heist.".to_string(),
                ..Default::default()
            },
            year: Some(1995),
            ..Default::default()
        });

        assert_eq!(item.guid(), "plex://movie/1");
        assert_eq!(item.title(), "Heat");
        assert_eq!(item.summary(), "A heist.");
        assert_eq!(item.year(), Some(1995));
    }
}
