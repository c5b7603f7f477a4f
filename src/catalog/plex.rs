//! Plex media server catalog implementation.
use super::plex_types::{MediaContainer, PlexMedia, PlexMetadata, PlexResponse, PlexTag};
use super::{
    CatalogConnector, CatalogError, CatalogItem, CatalogService, Episode, ItemHeader, MediaFile,
    Movie, Ratings, Season, Show, Tag, UnknownItem,
};
use crate::config::PluginConfig;
use crate::table::ServerRecord;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Product name announced to the server with every request.
const PRODUCT: &str = "plex_search";

/// Plex library type numbers used to narrow guid lookups.
const SEASON_TYPE: &str = "3";
const EPISODE_TYPE: &str = "4";

/// A connection to a single Plex media server.
///
/// Requests are blocking and authenticated with the server token stored
/// for the guild.
pub struct PlexServer {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
    client_identifier: String,
    search_limit: usize,
}

impl PlexServer {
    /// Connects to the server at `record.server_url`.
    ///
    /// The connection is verified by requesting the server identity, so an
    /// unreachable server or a rejected token fails here rather than on the
    /// first search.
    pub fn connect(record: &ServerRecord, config: &PluginConfig) -> Result<Self, CatalogError> {
        let base_url = normalize_base_url(&record.server_url)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CatalogError::RequestError(e.to_string()))?;

        let server = Self {
            client,
            base_url,
            token: record.token.clone(),
            client_identifier: config.client_identifier.clone(),
            search_limit: config.search_limit,
        };

        let identity = server.get("/identity", &[])?;
        tracing::info!(
            url = %server.base_url,
            machine = identity.machine_identifier.as_deref().unwrap_or("unknown"),
            version = identity.version.as_deref().unwrap_or("unknown"),
            "connected to Plex server"
        );

        Ok(server)
    }

    /// Issues an authenticated GET request and unwraps the media container.
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<MediaContainer, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("X-Plex-Token", self.token.as_str())
            .header("X-Plex-Product", PRODUCT)
            .header("X-Plex-Client-Identifier", self.client_identifier.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| CatalogError::RequestError(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Unauthorized {
                url: self.base_url.clone(),
            });
        }

        if !response.status().is_success() {
            return Err(CatalogError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: PlexResponse = response
            .json()
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        Ok(body.media_container)
    }
}

impl CatalogService for PlexServer {
    fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        let limit = self.search_limit.to_string();
        let container = self.get("/hubs/search", &[("query", query), ("limit", limit.as_str())])?;

        Ok(flatten_hubs(container))
    }

    fn fetch_by_guid(&self, guid: &str) -> Result<Option<CatalogItem>, CatalogError> {
        let mut query = vec![("guid", guid)];
        if let Some(library_type) = library_type_for(guid) {
            query.push(("type", library_type));
        }

        let container = self.get("/library/all", &query)?;

        Ok(container.metadata.into_iter().next().map(convert_item))
    }

    fn seasons(&self, show: &Show) -> Result<Vec<Season>, CatalogError> {
        let path = format!("/library/metadata/{}/children", show.header.rating_key);
        let container = self.get(&path, &[])?;

        Ok(container
            .metadata
            .into_iter()
            .filter_map(|metadata| match convert_item(metadata) {
                CatalogItem::Season(season) => Some(season),
                _ => None,
            })
            .collect())
    }
}

/// Connector that builds [`PlexServer`] handles from persisted records.
pub struct PlexConnector {
    config: PluginConfig,
}

impl PlexConnector {
    pub fn new(config: PluginConfig) -> Self {
        Self { config }
    }
}

impl CatalogConnector for PlexConnector {
    fn connect(&self, record: &ServerRecord) -> Result<Box<dyn CatalogService>, CatalogError> {
        Ok(Box::new(PlexServer::connect(record, &self.config)?))
    }
}

/// Validates the configured URL and strips trailing slashes.
fn normalize_base_url(url: &str) -> Result<String, CatalogError> {
    let trimmed = url.trim().trim_end_matches('/');

    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(CatalogError::InvalidUrl {
            url: url.to_string(),
            reason: "expected an http:// or https:// URL".to_string(),
        });
    }

    Ok(trimmed.to_string())
}

/// Library type filter for a guid, derived from its path segment.
fn library_type_for(guid: &str) -> Option<&'static str> {
    if guid.contains("/season/") {
        Some(SEASON_TYPE)
    } else if guid.contains("/episode/") {
        Some(EPISODE_TYPE)
    } else {
        None
    }
}

/// Collects the results of all hubs in hub order.
fn flatten_hubs(container: MediaContainer) -> Vec<CatalogItem> {
    container
        .hubs
        .into_iter()
        .flat_map(|hub| hub.metadata)
        .map(convert_item)
        .collect()
}

fn convert_tags(tags: Vec<PlexTag>) -> Vec<Tag> {
    tags.into_iter().map(|t| Tag::new(t.tag)).collect()
}

fn convert_media(media: Vec<PlexMedia>) -> Vec<MediaFile> {
    media
        .into_iter()
        .map(|m| MediaFile {
            container: m.container,
            video_codec: m.video_codec,
            width: m.width,
            height: m.height,
            video_frame_rate: m.video_frame_rate,
            audio_codec: m.audio_codec,
            audio_channels: m.audio_channels,
        })
        .collect()
}

/// Converts a 0-10 Plex score to a fraction of whole percents.
///
/// The score is rounded to a percent here, half away from zero, so later
/// formatting does not re-round a value that drifted below the half.
fn score_fraction(score: f64) -> f64 {
    (score * 10.0).round() / 100.0
}

/// Converts a Plex metadata entry to our internal item representation.
fn convert_item(metadata: PlexMetadata) -> CatalogItem {
    let header = ItemHeader {
        guid: metadata.guid.unwrap_or_default(),
        rating_key: metadata.rating_key.unwrap_or_default(),
        title: metadata.title,
        summary: metadata.summary.unwrap_or_default(),
    };

    let ratings = Ratings {
        content_rating: metadata.content_rating,
        audience: metadata.audience_rating.map(score_fraction),
        critic: metadata.rating.map(score_fraction),
    };

    match metadata.kind.as_str() {
        "movie" => CatalogItem::Movie(Movie {
            header,
            year: metadata.year,
            tagline: metadata.tagline,
            ratings,
            genres: convert_tags(metadata.genres),
            directors: convert_tags(metadata.directors),
            writers: convert_tags(metadata.writers),
            actors: convert_tags(metadata.roles),
            media: convert_media(metadata.media),
        }),
        "show" => CatalogItem::Show(Show {
            header,
            year: metadata.year,
            tagline: metadata.tagline,
            ratings,
            genres: convert_tags(metadata.genres),
            network: metadata.network,
            studio: metadata.studio,
            duration_ms: metadata.duration,
            child_count: metadata.child_count,
            leaf_count: metadata.leaf_count,
        }),
        "season" => CatalogItem::Season(Season {
            header,
            index: metadata.index,
            show_title: metadata.parent_title.unwrap_or_default(),
            leaf_count: metadata.leaf_count,
        }),
        "episode" => CatalogItem::Episode(Episode {
            header,
            show_title: metadata.grandparent_title.unwrap_or_default(),
            season_index: metadata.parent_index,
            index: metadata.index,
            ratings,
            directors: convert_tags(metadata.directors),
            writers: convert_tags(metadata.writers),
            actors: convert_tags(metadata.roles),
            media: convert_media(metadata.media),
        }),
        other => CatalogItem::Unknown(UnknownItem {
            header,
            year: metadata.year,
            kind: other.to_string(),
        }),
    }
}
