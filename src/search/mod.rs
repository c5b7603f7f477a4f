//! Content search command
//!
//! Implements the `content_search` command and the handling of the selectors
//! it renders. A search with several results shows a selector; choosing an
//! entry renders its details into the same message, and shows offer a further
//! selector for their seasons until the user cancels.

mod render;
mod selection;
mod session;

pub use render::{
    ACCENT_COLOR, detail_embed, format_media, format_rating, format_ratings, format_runtime,
    join_tags,
};
pub use selection::{CANCEL_PREFIX, ComponentAction, SELECT_PREFIX, SelectionIntent, content_hash};
pub use session::{InteractionSession, SessionRegistry, SessionState};

use crate::PlexSearchError;
use crate::catalog::{CatalogItem, CatalogService};
use crate::chat::{
    ChatSurface, CommandContext, ComponentEvent, MAX_SELECT_OPTIONS, MessageId, OutgoingMessage,
    Requester,
};
use crate::resolver::CatalogResolver;

/// Name of the search command
pub const COMMAND_NAME: &str = "content_search";

/// Alternative names of the search command
pub const COMMAND_ALIASES: &[&str] = &["cs"];

const NO_RESULTS: &str = "No results found.";
const SINGLE_RESULT: &str = "Found 1 result. Showing details...";

/// How a search was presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Nothing matched; a plain notice was sent
    NoResults,
    /// Exactly one item matched and its details were rendered
    Detail(MessageId),
    /// Several items matched and a selector was rendered
    Selector { message: MessageId, options: usize },
}

/// How a component interaction was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The message was closed
    Cancelled,
    /// The selected item was rendered into the message
    Rendered,
    /// The event did not belong to an active selector
    Ignored,
}

/// The search plugin
pub struct PlexSearch<S, R> {
    surface: S,
    resolver: R,
    sessions: SessionRegistry,
}

impl<S, R> PlexSearch<S, R>
where
    S: ChatSurface,
    R: CatalogResolver,
{
    pub fn new(surface: S, resolver: R) -> Self {
        Self {
            surface,
            resolver,
            sessions: SessionRegistry::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Whether `name` invokes the search command
    pub fn handles_command(name: &str) -> bool {
        name == COMMAND_NAME || COMMAND_ALIASES.contains(&name)
    }

    /// Searches the guild's catalog for `query` and presents the results
    ///
    /// Only video content is presented. A single match is rendered directly,
    /// several matches are offered in a selector paired with a cancel button.
    /// At most [`MAX_SELECT_OPTIONS`] results are offered.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The invoking command: guild, channel, command message and author
    /// * `query` - The free-text search query
    ///
    /// # Returns
    ///
    /// How the results were presented
    ///
    /// # Errors
    ///
    /// Fails if the guild's catalog cannot be resolved, the search request
    /// fails or the chat surface rejects a message.
    pub fn search(
        &self,
        ctx: &CommandContext,
        query: &str,
    ) -> Result<SearchOutcome, PlexSearchError> {
        // Resolve the guild's catalog
        let handle = self.resolver.resolve(&ctx.guild)?;

        // Search and keep the video content
        let mut results: Vec<CatalogItem> = handle
            .catalog()
            .search(query)?
            .into_iter()
            .filter(CatalogItem::is_video)
            .collect();

        tracing::debug!(guild = %ctx.guild, query, results = results.len(), "search completed");

        if results.len() > MAX_SELECT_OPTIONS {
            tracing::debug!(
                query,
                dropped = results.len() - MAX_SELECT_OPTIONS,
                "truncating results"
            );
            results.truncate(MAX_SELECT_OPTIONS);
        }

        // Present nothing, the single item, or a selector
        match results.as_slice() {
            [] => {
                self.surface
                    .send(&ctx.channel, OutgoingMessage::text(NO_RESULTS))?;
                Ok(SearchOutcome::NoResults)
            }
            [item] => {
                let message = self
                    .surface
                    .send(&ctx.channel, OutgoingMessage::text(SINGLE_RESULT))?;
                self.content_details(handle.catalog(), &message, item, &ctx.author, false)?;
                Ok(SearchOutcome::Detail(message))
            }
            items => {
                let correlation = ctx.message.as_str();
                let options = items.iter().map(selection::result_option).collect();
                let outgoing = OutgoingMessage::embed(render::results_embed(query, items))
                    .with_components(selection::selector(correlation, options));

                let message = self.surface.send(&ctx.channel, outgoing)?;
                self.sessions
                    .open(message.clone(), correlation, ctx.author.id.clone());

                Ok(SearchOutcome::Selector {
                    message,
                    options: items.len(),
                })
            }
        }
    }

    /// Handles a select menu choice or a cancel button press
    ///
    /// Cancelling always disables the message's components. A selection is
    /// only handled while the message has an active selector with the same
    /// correlation id.
    pub fn on_component(&self, event: &ComponentEvent) -> Result<EventOutcome, PlexSearchError> {
        match ComponentAction::parse(&event.custom_id) {
            ComponentAction::Cancel(_) => {
                self.surface.disable_components(&event.message)?;
                self.sessions.finish(&event.message, SessionState::Cancelled);
                Ok(EventOutcome::Cancelled)
            }
            ComponentAction::Select(correlation) => self.on_select(event, &correlation),
            ComponentAction::Foreign => Ok(EventOutcome::Ignored),
        }
    }

    fn on_select(
        &self,
        event: &ComponentEvent,
        correlation: &str,
    ) -> Result<EventOutcome, PlexSearchError> {
        let active = self.sessions.get(&event.message).is_some_and(|session| {
            session.state == SessionState::AwaitingSelection && session.correlation == correlation
        });
        if !active {
            tracing::debug!(message = %event.message, correlation, "selection without active session");
            return Ok(EventOutcome::Ignored);
        }

        let Some(value) = event.values.first() else {
            tracing::debug!(message = %event.message, "selection without value");
            return Ok(EventOutcome::Ignored);
        };

        let handle = self.resolver.resolve(&event.guild)?;
        let catalog = handle.catalog();

        let intent = SelectionIntent::decode(value);
        tracing::debug!(message = %event.message, ?intent, "selection received");

        let (item, reference) = match &intent {
            SelectionIntent::Season(guid) | SelectionIntent::Episode(guid) => {
                (catalog.fetch_by_guid(guid)?, guid.clone())
            }
            SelectionIntent::Search { title, .. } => {
                // Prefer the result the option was built from, titles need not be unique
                let mut results: Vec<CatalogItem> = catalog
                    .search(title)?
                    .into_iter()
                    .filter(CatalogItem::is_video)
                    .collect();
                let index = results
                    .iter()
                    .position(|item| intent.matches(item))
                    .unwrap_or(0);
                let item = (index < results.len()).then(|| results.swap_remove(index));

                (item, title.clone())
            }
        };

        match item {
            Some(item) => {
                self.content_details(catalog, &event.message, &item, &event.author, true)?;
            }
            None => {
                tracing::warn!(message = %event.message, reference = %reference, "selected item not found");
                self.surface.disable_components(&event.message)?;
                self.surface.edit(
                    &event.message,
                    OutgoingMessage::embed(render::missing_embed(&reference, &event.author)),
                )?;
                self.sessions.finish(&event.message, SessionState::Resolved);
            }
        }

        Ok(EventOutcome::Rendered)
    }

    /// Renders the details of `item` into `message`
    ///
    /// When `from_selection` is set the message's current components are
    /// disabled first. Shows with seasons get a new season selector and keep
    /// the session open; every other item ends it.
    fn content_details(
        &self,
        catalog: &dyn CatalogService,
        message: &MessageId,
        item: &CatalogItem,
        requester: &Requester,
        from_selection: bool,
    ) -> Result<(), PlexSearchError> {
        let seasons = match item {
            CatalogItem::Show(show) => {
                let mut seasons = catalog.seasons(show)?;
                seasons.sort_by_key(|season| season.index);
                if seasons.len() > MAX_SELECT_OPTIONS {
                    tracing::debug!(
                        show = %show.header.title,
                        dropped = seasons.len() - MAX_SELECT_OPTIONS,
                        "truncating seasons"
                    );
                    seasons.truncate(MAX_SELECT_OPTIONS);
                }
                seasons
            }
            _ => Vec::new(),
        };

        // The previous selector must not be answered twice
        if from_selection {
            self.surface.disable_components(message)?;
        }

        let mut outgoing = OutgoingMessage::embed(render::detail_embed(item, requester));

        if seasons.is_empty() {
            self.surface.edit(message, outgoing)?;
            self.sessions.finish(message, SessionState::Resolved);
        } else {
            let correlation = message.as_str();
            let options = seasons.iter().map(selection::season_option).collect();
            outgoing = outgoing.with_components(selection::selector(correlation, options));

            self.surface.edit(message, outgoing)?;
            self.sessions
                .open(message.clone(), correlation, requester.id.clone());
        }

        Ok(())
    }
}
