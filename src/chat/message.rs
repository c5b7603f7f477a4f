//! Rendered message structures
//!
//! Platform neutral descriptions of embeds and interactive components. They
//! serialize to the JSON shape most chat platforms accept for rich messages.

use serde::Serialize;

/// Value shown for fields that would otherwise be empty
///
/// Chat platforms reject embed fields without a value.
const EMPTY_FIELD_VALUE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// A titled block of rich content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            footer: None,
        }
    }

    /// Sets the description; blank descriptions are left out
    pub fn description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    /// Appends a field; fields are displayed in insertion order
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        let value = value.into();
        let value = if value.trim().is_empty() {
            EMPTY_FIELD_VALUE.to_string()
        } else {
            value
        };

        self.fields.push(EmbedField {
            name: name.into(),
            value,
            inline,
        });
        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(EmbedFooter {
            text: text.into(),
            icon_url,
        });
        self
    }

    /// Returns the value of the first field called `name`
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub default: bool,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            default: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectMenu {
    pub custom_id: String,
    pub options: Vec<SelectOption>,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    pub style: ButtonStyle,
    pub custom_id: String,
    pub disabled: bool,
}

/// An interactive element attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Select(SelectMenu),
    Button(Button),
}

impl Component {
    pub fn custom_id(&self) -> &str {
        match self {
            Component::Select(select) => &select.custom_id,
            Component::Button(button) => &button.custom_id,
        }
    }

    pub fn is_disabled(&self) -> bool {
        match self {
            Component::Select(select) => select.disabled,
            Component::Button(button) => button.disabled,
        }
    }

    pub fn disable(&mut self) {
        match self {
            Component::Select(select) => select.disabled = true,
            Component::Button(button) => button.disabled = true,
        }
    }
}

/// Content for a new message or an edit of an existing one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    pub components: Vec<Component>,
}

impl OutgoingMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Default::default()
        }
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }

    /// Returns the select menu, if the message carries one
    pub fn select_menu(&self) -> Option<&SelectMenu> {
        self.components.iter().find_map(|c| match c {
            Component::Select(select) => Some(select),
            Component::Button(_) => None,
        })
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.components.iter().filter_map(|c| match c {
            Component::Button(button) => Some(button),
            Component::Select(_) => None,
        })
    }

    /// Whether any component on the message still accepts input
    pub fn is_interactive(&self) -> bool {
        self.components.iter().any(|c| !c.is_disabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_value_is_replaced() {
        let embed = Embed::new("Heat", 0x00ff00)
            .field("Writers", "", true)
            .field("Genres", "Crime", true);

        assert_eq!(embed.field_value("Writers"), Some("N/A"));
        assert_eq!(embed.field_value("Genres"), Some("Crime"));
        assert_eq!(embed.field_value("Missing"), None);
    }

    #[test]
    fn test_blank_description_is_left_out() {
        let embed = Embed::new("Heat", 0x00ff00).description("  ");
        assert_eq!(embed.description, None);

        let embed = embed.description("A Los Angeles crime saga");
        assert_eq!(embed.description.as_deref(), Some("A Los Angeles crime saga"));
    }

    #[test]
    fn test_disable_component() {
        let mut message = OutgoingMessage::text("pick one").with_components(vec![
            Component::Select(SelectMenu {
                custom_id: "content_search_1".to_string(),
                options: vec![SelectOption::new("Heat (1995)", "Heat_abc")],
                disabled: false,
            }),
            Component::Button(Button {
                label: "Cancel".to_string(),
                style: ButtonStyle::Danger,
                custom_id: "cancel_1".to_string(),
                disabled: false,
            }),
        ]);
        assert!(message.is_interactive());

        message.components.iter_mut().for_each(Component::disable);

        assert!(!message.is_interactive());
        assert_eq!(message.select_menu().unwrap().custom_id, "content_search_1");
        assert_eq!(message.buttons().count(), 1);
    }

    #[test]
    fn test_component_serializes_with_type_tag() {
        let button = Component::Button(Button {
            label: "Cancel".to_string(),
            style: ButtonStyle::Danger,
            custom_id: "cancel_1".to_string(),
            disabled: false,
        });

        let json = serde_json::to_value(&button).unwrap();
        assert_eq!(json["type"], "button");
        assert_eq!(json["style"], "danger");
        assert_eq!(json["custom_id"], "cancel_1");
    }
}
