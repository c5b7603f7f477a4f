//! Chat platform abstraction
//!
//! The plugin never talks to a chat platform directly. Everything it needs
//! (sending and editing messages, disabling components) goes through the
//! [`ChatSurface`] trait, and everything it receives arrives as a
//! [`CommandContext`] or a [`ComponentEvent`].

mod console;
mod message;

pub use console::ConsoleSurface;
pub use message::{
    Button, ButtonStyle, Component, Embed, EmbedField, EmbedFooter, OutgoingMessage, SelectMenu,
    SelectOption,
};

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by a chat surface
#[derive(Debug, Error)]
pub enum ChatError {
    /// The message to edit does not exist (anymore)
    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),

    /// The platform rejected the request
    #[error("Chat platform rejected the request: {0}")]
    Rejected(String),
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a guild (community), the unit of per-tenant configuration
    GuildId
);
string_id!(
    /// Identifier of a text channel
    ChannelId
);
string_id!(
    /// Identifier of a chat message
    MessageId
);
string_id!(
    /// Identifier of a chat user
    UserId
);

/// The user who triggered a command or component interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: UserId,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Context of an invoked command
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub guild: GuildId,
    pub channel: ChannelId,
    /// The message that contained the command
    pub message: MessageId,
    pub author: Requester,
}

/// A user interacting with a component (select menu or button)
#[derive(Debug, Clone)]
pub struct ComponentEvent {
    pub guild: GuildId,
    /// The message carrying the component
    pub message: MessageId,
    /// Custom id of the component that was used
    pub custom_id: String,
    /// Selected values; empty for buttons
    pub values: Vec<String>,
    pub author: Requester,
}

/// Most options a select menu may carry
///
/// Chat platforms reject larger menus; Discord caps them at 25.
pub const MAX_SELECT_OPTIONS: usize = 25;

/// Trait for chat platforms the plugin can render to
///
/// Implementors deliver messages to users and apply edits to messages that
/// were sent earlier. Select menus handed to a surface never carry more than
/// [`MAX_SELECT_OPTIONS`] options.
pub trait ChatSurface: Send + Sync {
    /// Sends a new message to `channel` and returns its id
    fn send(&self, channel: &ChannelId, message: OutgoingMessage) -> Result<MessageId, ChatError>;

    /// Edits an existing message
    ///
    /// Components are always replaced; text content and embed only if set.
    fn edit(&self, message_id: &MessageId, message: OutgoingMessage) -> Result<(), ChatError>;

    /// Disables every interactive component on a message
    fn disable_components(&self, message_id: &MessageId) -> Result<(), ChatError>;
}

impl<S: ChatSurface + ?Sized> ChatSurface for Arc<S> {
    fn send(&self, channel: &ChannelId, message: OutgoingMessage) -> Result<MessageId, ChatError> {
        (**self).send(channel, message)
    }

    fn edit(&self, message_id: &MessageId, message: OutgoingMessage) -> Result<(), ChatError> {
        (**self).edit(message_id, message)
    }

    fn disable_components(&self, message_id: &MessageId) -> Result<(), ChatError> {
        (**self).disable_components(message_id)
    }
}
