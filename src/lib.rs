//! plex_search - Browse a Plex media server from chat
//!
//! This library provides a chat bot plugin that searches a guild's Plex server
//! and lets users drill from search results into shows, seasons and episodes
//! through interactive selectors, re-rendering a single message in place.
//!
//! The chat platform, the media server and the persistence layer are reached
//! through traits ([`ChatSurface`], [`CatalogService`], [`Table`]) so the
//! plugin can be hosted by any bot framework.
//!
//! # Examples
//!
//! ```no_run
//! use plex_search::{
//!     CatalogRegistry, ChannelId, CommandContext, ConsoleSurface, GuildId, MessageId,
//!     PlexSearch, PluginConfig, Requester, UserId,
//! };
//!
//! let config = PluginConfig::from_project_dirs().unwrap();
//! let registry = CatalogRegistry::open(&config).unwrap();
//! let plugin = PlexSearch::new(ConsoleSurface::new(false), registry);
//!
//! let ctx = CommandContext {
//!     guild: GuildId::from("1"),
//!     channel: ChannelId::from("general"),
//!     message: MessageId::from("1001"),
//!     author: Requester {
//!         id: UserId::from("100"),
//!         name: "alice".to_string(),
//!         avatar_url: None,
//!     },
//! };
//!
//! plugin.search(&ctx, "The Wire").unwrap();
//! ```

mod associations;
mod catalog;
mod chat;
mod config;
mod resolver;
mod search;
mod table;

#[cfg(test)]
mod testing;

pub use associations::{ASSOCIATION_TABLE, AssociationMap, AssociationRow};
pub use catalog::{
    CatalogConnector, CatalogError, CatalogItem, CatalogService, Episode, ItemHeader, MediaFile,
    Movie, PlexConnector, PlexServer, Ratings, Season, Show, Tag, UnknownItem,
};
pub use chat::{
    Button, ButtonStyle, ChannelId, ChatError, ChatSurface, CommandContext, Component,
    ComponentEvent, ConsoleSurface, Embed, EmbedField, EmbedFooter, GuildId, MAX_SELECT_OPTIONS,
    MessageId, OutgoingMessage, Requester, SelectMenu, SelectOption, UserId,
};
pub use config::{ConfigError, PluginConfig};
pub use resolver::{CatalogRegistry, CatalogResolver, ResolveError, ServerHandle};
pub use search::{
    ACCENT_COLOR, CANCEL_PREFIX, COMMAND_ALIASES, COMMAND_NAME, ComponentAction, EventOutcome,
    InteractionSession, PlexSearch, SELECT_PREFIX, SearchOutcome, SelectionIntent,
    SessionRegistry, SessionState, content_hash, detail_embed, format_media, format_rating,
    format_ratings, format_runtime, join_tags,
};
pub use table::{JsonTable, SERVER_TABLE, ServerRecord, Table, TableError};

use thiserror::Error;

/// Top-level error type for plex_search operations
#[derive(Debug, Error)]
pub enum PlexSearchError {
    /// The guild's catalog could not be resolved
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// A request to the catalog failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The chat platform rejected a message
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// A table could not be read or written
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// The configuration could not be determined
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
