/// Plex API response types for deserialization.
///
/// These structures mirror the JSON format Plex returns when asked for
/// `application/json`. Every response is wrapped in a `MediaContainer`.
use serde::Deserialize;

/// The envelope around every Plex response.
#[derive(Debug, Deserialize)]
pub(super) struct PlexResponse {
    #[serde(rename = "MediaContainer")]
    pub media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MediaContainer {
    /// Present on `/identity`
    pub machine_identifier: Option<String>,
    /// Present on `/identity`
    pub version: Option<String>,
    /// Present on `/hubs/search`
    #[serde(rename = "Hub", default)]
    pub hubs: Vec<PlexHub>,
    /// Present on library listings
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMetadata>,
}

/// A group of search results of the same type.
#[derive(Debug, Deserialize)]
pub(super) struct PlexHub {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMetadata>,
}

/// A single library entry of any type.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlexMetadata {
    pub rating_key: Option<String>,
    pub guid: Option<String>,
    /// `movie`, `show`, `season`, `episode`, `clip`, `artist`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    pub year: Option<i32>,
    pub summary: Option<String>,
    pub tagline: Option<String>,
    pub content_rating: Option<String>,
    /// Audience score on a 0-10 scale
    pub audience_rating: Option<f64>,
    /// Critic score on a 0-10 scale
    pub rating: Option<f64>,
    pub studio: Option<String>,
    pub network: Option<String>,
    /// Milliseconds
    pub duration: Option<u64>,
    pub index: Option<u32>,
    pub parent_index: Option<u32>,
    pub parent_title: Option<String>,
    pub grandparent_title: Option<String>,
    pub child_count: Option<u32>,
    pub leaf_count: Option<u32>,
    #[serde(rename = "Genre", default)]
    pub genres: Vec<PlexTag>,
    #[serde(rename = "Director", default)]
    pub directors: Vec<PlexTag>,
    #[serde(rename = "Writer", default)]
    pub writers: Vec<PlexTag>,
    #[serde(rename = "Role", default)]
    pub roles: Vec<PlexTag>,
    #[serde(rename = "Media", default)]
    pub media: Vec<PlexMedia>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlexTag {
    pub tag: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlexMedia {
    pub container: Option<String>,
    pub video_codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub video_frame_rate: Option<String>,
    pub audio_codec: Option<String>,
    pub audio_channels: Option<u32>,
}
