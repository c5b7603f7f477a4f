//! Component identifiers and selection values
//!
//! Select menus and buttons carry string identifiers, and select options carry
//! string values. This module owns both encodings and decodes incoming strings
//! once into [`ComponentAction`] and [`SelectionIntent`].

use crate::catalog::{CatalogItem, Season};
use crate::chat::{Button, ButtonStyle, Component, SelectMenu, SelectOption};

/// Custom id prefix of result and season select menus
pub const SELECT_PREFIX: &str = "content_search_";

/// Custom id prefix of cancel buttons
pub const CANCEL_PREFIX: &str = "cancel_";

const SEASON_PREFIX: &str = "season_";
const EPISODE_PREFIX: &str = "episode_";

/// Separates the hash from the rest of a selection value
const HASH_DELIMITER: char = '_';

/// Number of hex digits of the content hash kept in selection values
const HASH_LEN: usize = 16;

/// What a component interaction asks for, keyed by its correlation id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    /// An option of a select menu was chosen
    Select(String),
    /// The cancel button was pressed
    Cancel(String),
    /// A component this plugin does not own
    Foreign,
}

impl ComponentAction {
    pub fn parse(custom_id: &str) -> Self {
        if let Some(correlation) = custom_id.strip_prefix(CANCEL_PREFIX) {
            ComponentAction::Cancel(correlation.to_string())
        } else if let Some(correlation) = custom_id.strip_prefix(SELECT_PREFIX) {
            ComponentAction::Select(correlation.to_string())
        } else {
            ComponentAction::Foreign
        }
    }
}

/// The item a selected option points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIntent {
    /// A season, identified by guid
    Season(String),
    /// An episode, identified by guid
    Episode(String),
    /// A title to search for again, and the hash of the chosen item's guid
    Search { title: String, hash: String },
}

impl SelectionIntent {
    /// Decodes a select option value
    ///
    /// `season_<guid>_<hash>` and `episode_<guid>_<hash>` address an item by
    /// guid. Everything else is `<title>_<hash>`; the title is everything
    /// before the last delimiter so titles containing underscores survive.
    pub fn decode(value: &str) -> Self {
        if let Some(guid) = value.strip_prefix(SEASON_PREFIX).and_then(strip_hash) {
            return SelectionIntent::Season(guid.to_string());
        }
        if let Some(guid) = value.strip_prefix(EPISODE_PREFIX).and_then(strip_hash) {
            return SelectionIntent::Episode(guid.to_string());
        }

        let (title, hash) = value.rsplit_once(HASH_DELIMITER).unwrap_or((value, ""));
        SelectionIntent::Search {
            title: title.to_string(),
            hash: hash.to_string(),
        }
    }

    /// Encodes the intent as a select option value
    ///
    /// Season and episode values carry the hash of their own guid.
    pub fn encode(&self) -> String {
        match self {
            SelectionIntent::Season(guid) => format!(
                "{SEASON_PREFIX}{guid}{HASH_DELIMITER}{}",
                content_hash(guid)
            ),
            SelectionIntent::Episode(guid) => format!(
                "{EPISODE_PREFIX}{guid}{HASH_DELIMITER}{}",
                content_hash(guid)
            ),
            SelectionIntent::Search { title, hash } => format!("{title}{HASH_DELIMITER}{hash}"),
        }
    }

    /// Whether `item` is the item a `Search` intent was encoded from
    ///
    /// Always false for season and episode intents.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            SelectionIntent::Search { hash, .. } => {
                !hash.is_empty() && content_hash(item.guid()) == *hash
            }
            SelectionIntent::Season(_) | SelectionIntent::Episode(_) => false,
        }
    }
}

/// Strips the trailing hash, returning `None` if nothing is left
fn strip_hash(rest: &str) -> Option<&str> {
    let guid = rest
        .rsplit_once(HASH_DELIMITER)
        .map(|(guid, _)| guid)
        .unwrap_or(rest);

    (!guid.is_empty()).then_some(guid)
}

/// Content-derived hash distinguishing options with equal labels
pub fn content_hash(guid: &str) -> String {
    let hex = blake3::hash(guid.as_bytes()).to_hex();
    hex.as_str()[..HASH_LEN].to_string()
}

/// Label of an item in a result list: `title (year)`
pub fn item_label(item: &CatalogItem) -> String {
    match item.year() {
        Some(year) => format!("{} ({})", item.title(), year),
        None => item.title().to_string(),
    }
}

/// Select option re-running a search for the item's title
pub fn result_option(item: &CatalogItem) -> SelectOption {
    let intent = SelectionIntent::Search {
        title: item.title().to_string(),
        hash: content_hash(item.guid()),
    };
    SelectOption::new(item_label(item), intent.encode())
}

/// Select option drilling into a season
pub fn season_option(season: &Season) -> SelectOption {
    let label = match season.index {
        Some(index) => format!("Season {}", index),
        None => season.header.title.clone(),
    };
    let value = SelectionIntent::Season(season.header.guid.clone()).encode();

    SelectOption::new(label, value)
}

/// A select menu with the given options paired with its cancel button
pub fn selector(correlation: &str, options: Vec<SelectOption>) -> Vec<Component> {
    vec![
        Component::Select(SelectMenu {
            custom_id: format!("{SELECT_PREFIX}{correlation}"),
            options,
            disabled: false,
        }),
        Component::Button(Button {
            label: "Cancel".to_string(),
            style: ButtonStyle::Danger,
            custom_id: format!("{CANCEL_PREFIX}{correlation}"),
            disabled: false,
        }),
    ]
}
