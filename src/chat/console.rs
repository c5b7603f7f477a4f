//! Terminal chat surface
//!
//! Keeps every message in memory and prints each send and edit to stdout,
//! either as readable text or as the JSON a chat platform would receive.

use super::{ChannelId, ChatError, ChatSurface, Component, MessageId, OutgoingMessage};
use std::sync::{Mutex, MutexGuard};

/// A chat surface that renders to the terminal
pub struct ConsoleSurface {
    /// Print JSON payloads instead of text
    json: bool,
    /// Messages in the order they were sent
    messages: Mutex<Vec<(MessageId, OutgoingMessage)>>,
}

impl ConsoleSurface {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current state of a message
    pub fn message(&self, message_id: &MessageId) -> Option<OutgoingMessage> {
        self.lock()
            .iter()
            .find(|(id, _)| id == message_id)
            .map(|(_, message)| message.clone())
    }

    /// Returns the most recent message that still has enabled components
    pub fn latest_interactive(&self) -> Option<(MessageId, OutgoingMessage)> {
        self.lock()
            .iter()
            .rev()
            .find(|(_, message)| message.is_interactive())
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(MessageId, OutgoingMessage)>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn print(&self, message_id: &MessageId, message: &OutgoingMessage) {
        if self.json {
            match serde_json::to_string_pretty(message) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "failed to serialize message"),
            }
        } else {
            println!("--- message {} ---", message_id);
            println!("{}", render_text(message));
        }
    }
}

impl ChatSurface for ConsoleSurface {
    fn send(&self, _channel: &ChannelId, message: OutgoingMessage) -> Result<MessageId, ChatError> {
        let message_id = MessageId(ulid::Ulid::new().to_string());

        self.print(&message_id, &message);
        self.lock().push((message_id.clone(), message));

        Ok(message_id)
    }

    fn edit(&self, message_id: &MessageId, message: OutgoingMessage) -> Result<(), ChatError> {
        let updated = {
            let mut messages = self.lock();
            let (_, existing) = messages
                .iter_mut()
                .find(|(id, _)| id == message_id)
                .ok_or_else(|| ChatError::UnknownMessage(message_id.clone()))?;

            if message.content.is_some() {
                existing.content = message.content;
            }
            if message.embed.is_some() {
                existing.embed = message.embed;
            }
            existing.components = message.components;

            existing.clone()
        };

        self.print(message_id, &updated);
        Ok(())
    }

    fn disable_components(&self, message_id: &MessageId) -> Result<(), ChatError> {
        let mut messages = self.lock();
        let (_, existing) = messages
            .iter_mut()
            .find(|(id, _)| id == message_id)
            .ok_or_else(|| ChatError::UnknownMessage(message_id.clone()))?;

        existing.components.iter_mut().for_each(Component::disable);
        Ok(())
    }
}

/// Renders a message as plain text
fn render_text(message: &OutgoingMessage) -> String {
    let mut text = String::new();

    if let Some(content) = &message.content {
        text.push_str(content);
        text.push('\n');
    }

    if let Some(embed) = &message.embed {
        text.push_str(&format!("== {} ==\n", embed.title));
        if let Some(description) = &embed.description {
            text.push_str(description);
            text.push('\n');
        }
        for field in &embed.fields {
            text.push_str(&format!("{}: {}\n", field.name, field.value));
        }
        if let Some(footer) = &embed.footer {
            text.push_str(&format!("-- {}\n", footer.text));
        }
    }

    for component in &message.components {
        let state = if component.is_disabled() { " (disabled)" } else { "" };
        match component {
            Component::Select(select) => {
                text.push_str(&format!("[select {}{}]\n", select.custom_id, state));
                for (index, option) in select.options.iter().enumerate() {
                    text.push_str(&format!("  {}) {}\n", index + 1, option.label));
                }
            }
            Component::Button(button) => {
                text.push_str(&format!("[button {}{}] {}\n", button.custom_id, state, button.label));
            }
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Button, ButtonStyle, Embed};

    fn cancel_button() -> Component {
        Component::Button(Button {
            label: "Cancel".to_string(),
            style: ButtonStyle::Danger,
            custom_id: "cancel_1".to_string(),
            disabled: false,
        })
    }

    #[test]
    fn test_send_assigns_unique_ids() {
        let surface = ConsoleSurface::new(false);
        let channel = ChannelId::from("c");

        let first = surface.send(&channel, OutgoingMessage::text("a")).unwrap();
        let second = surface.send(&channel, OutgoingMessage::text("b")).unwrap();

        assert_ne!(first, second);
        assert_eq!(surface.message(&first).unwrap().content.as_deref(), Some("a"));
    }

    #[test]
    fn test_edit_keeps_content_when_unset() {
        let surface = ConsoleSurface::new(false);
        let id = surface
            .send(&ChannelId::from("c"), OutgoingMessage::text("Found 1 result."))
            .unwrap();

        surface
            .edit(&id, OutgoingMessage::embed(Embed::new("Heat (1995)", 0x00ff00)))
            .unwrap();

        let message = surface.message(&id).unwrap();
        assert_eq!(message.content.as_deref(), Some("Found 1 result."));
        assert_eq!(message.embed.unwrap().title, "Heat (1995)");
    }

    #[test]
    fn test_edit_unknown_message_fails() {
        let surface = ConsoleSurface::new(false);

        let result = surface.edit(&MessageId::from("nope"), OutgoingMessage::text("x"));
        assert!(matches!(result, Err(ChatError::UnknownMessage(_))));
    }

    #[test]
    fn test_disable_components_ends_interaction() {
        let surface = ConsoleSurface::new(false);
        let id = surface
            .send(
                &ChannelId::from("c"),
                OutgoingMessage::text("pick").with_components(vec![cancel_button()]),
            )
            .unwrap();
        assert_eq!(surface.latest_interactive().unwrap().0, id);

        surface.disable_components(&id).unwrap();

        assert!(surface.latest_interactive().is_none());
    }

    #[test]
    fn test_render_text() {
        let message = OutgoingMessage::embed(
            Embed::new("Heat (1995)", 0x00ff00)
                .description("A Los Angeles crime saga")
                .field("Genres", "Crime, Drama", true)
                .footer("plex://movie/1", None),
        )
        .with_components(vec![cancel_button()]);

        let text = render_text(&message);
        assert!(text.contains("== Heat (1995) =="));
        assert!(text.contains("Genres: Crime, Drama"));
        assert!(text.contains("-- plex://movie/1"));
        assert!(text.contains("[button cancel_1] Cancel"));
    }
}
