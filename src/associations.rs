//! Identity associations
//!
//! Maps chat users of a guild to the media server accounts they are linked
//! with. The rows are maintained elsewhere; this crate only reads them.

use crate::chat::{GuildId, UserId};
use crate::table::{Table, TableError};
use std::collections::HashMap;

/// Name of the table holding per-guild identity associations
pub const ASSOCIATION_TABLE: &str = "discord_associations";

/// Persisted form of a guild's associations: user id to account name
pub type AssociationRow = HashMap<String, String>;

/// The identity associations of a single guild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationMap {
    guild: GuildId,
    accounts: HashMap<UserId, String>,
}

impl AssociationMap {
    pub fn new(guild: GuildId) -> Self {
        Self {
            guild,
            accounts: HashMap::new(),
        }
    }

    /// Loads the associations of `guild` from `table`
    ///
    /// A guild without a row has no associations.
    pub fn load(table: &dyn Table<AssociationRow>, guild: &GuildId) -> Result<Self, TableError> {
        let row = table.get_row(guild.as_str())?.unwrap_or_default();

        Ok(Self {
            guild: guild.clone(),
            accounts: row
                .into_iter()
                .map(|(user, account)| (UserId(user), account))
                .collect(),
        })
    }

    pub fn guild(&self) -> &GuildId {
        &self.guild
    }

    pub fn insert(&mut self, user: UserId, account: impl Into<String>) {
        self.accounts.insert(user, account.into());
    }

    /// Returns the media server account linked to `user`
    pub fn catalog_account(&self, user: &UserId) -> Option<&str> {
        self.accounts.get(user).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
