//! Per-guild catalog resolution
//!
//! Resolves a guild to a ready-to-use handle on its media server. Handles are
//! created on first use from the persisted connection record and then kept for
//! the lifetime of the process.
//!
//! Cached handles are not refreshed when the persisted record changes. Callers
//! that rewrite a guild's record must call [`CatalogRegistry::invalidate`] for
//! the new record to take effect.

use crate::associations::{ASSOCIATION_TABLE, AssociationMap, AssociationRow};
use crate::catalog::{CatalogConnector, CatalogError, CatalogService, PlexConnector};
use crate::chat::GuildId;
use crate::config::PluginConfig;
use crate::table::{JsonTable, SERVER_TABLE, ServerRecord, Table, TableError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors that can occur while resolving a guild's catalog
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No server record exists for the guild
    #[error("No Plex server is configured for guild {guild}")]
    NotConfigured { guild: GuildId },

    /// A record exists but connecting to the server failed
    #[error("The Plex server of guild {guild} is offline")]
    ServiceOffline {
        guild: GuildId,
        #[source]
        source: CatalogError,
    },

    /// The server record could not be read
    #[error("Failed to read server configuration: {0}")]
    Table(#[from] TableError),
}

/// A connected catalog together with the guild data attached to it
pub struct ServerHandle {
    guild: GuildId,
    catalog: Box<dyn CatalogService>,
    associations: Arc<AssociationMap>,
    table: Arc<dyn Table<ServerRecord>>,
}

impl ServerHandle {
    pub fn new(
        guild: GuildId,
        catalog: Box<dyn CatalogService>,
        associations: Arc<AssociationMap>,
        table: Arc<dyn Table<ServerRecord>>,
    ) -> Self {
        Self {
            guild,
            catalog,
            associations,
            table,
        }
    }

    pub fn guild(&self) -> &GuildId {
        &self.guild
    }

    pub fn catalog(&self) -> &dyn CatalogService {
        self.catalog.as_ref()
    }

    pub fn associations(&self) -> &AssociationMap {
        &self.associations
    }

    /// The table the handle's connection record was read from
    pub fn table(&self) -> &dyn Table<ServerRecord> {
        self.table.as_ref()
    }
}

/// Trait for resolving a guild to its catalog handle
pub trait CatalogResolver: Send + Sync {
    /// Returns the catalog handle of `guild`
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotConfigured`] if the guild has no server
    /// record and [`ResolveError::ServiceOffline`] if the server cannot be
    /// reached.
    fn resolve(&self, guild: &GuildId) -> Result<Arc<ServerHandle>, ResolveError>;
}

/// Process-wide cache of catalog handles keyed by guild
pub struct CatalogRegistry {
    connector: Box<dyn CatalogConnector>,
    servers: Arc<dyn Table<ServerRecord>>,
    association_table: Box<dyn Table<AssociationRow>>,
    handles: Mutex<HashMap<GuildId, Arc<ServerHandle>>>,
    associations: Mutex<HashMap<GuildId, Arc<AssociationMap>>>,
}

impl CatalogRegistry {
    pub fn new(
        connector: Box<dyn CatalogConnector>,
        servers: Arc<dyn Table<ServerRecord>>,
        association_table: Box<dyn Table<AssociationRow>>,
    ) -> Self {
        Self {
            connector,
            servers,
            association_table,
            handles: Mutex::new(HashMap::new()),
            associations: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a registry backed by the JSON tables in `config.data_dir`
    /// and connecting to Plex servers
    pub fn open(config: &PluginConfig) -> Result<Self, TableError> {
        let servers: JsonTable<ServerRecord> = JsonTable::open(&config.data_dir, SERVER_TABLE)?;
        let associations: JsonTable<AssociationRow> =
            JsonTable::open(&config.data_dir, ASSOCIATION_TABLE)?;

        Ok(Self::new(
            Box::new(PlexConnector::new(config.clone())),
            Arc::new(servers),
            Box::new(associations),
        ))
    }

    /// Drops the cached handle of `guild`
    ///
    /// The next resolution reads the persisted record again. Returns whether
    /// a handle was cached.
    pub fn invalidate(&self, guild: &GuildId) -> bool {
        let removed = lock(&self.handles).remove(guild).is_some();
        if removed {
            tracing::debug!(guild = %guild, "invalidated cached catalog handle");
        }
        removed
    }

    /// Stores the server record of `guild` and drops its cached handle
    ///
    /// # Arguments
    ///
    /// * `guild` - The guild the server belongs to
    /// * `record` - Connection details of the new server
    ///
    /// # Returns
    ///
    /// The record that was replaced, if there was one
    pub fn store_server(
        &self,
        guild: &GuildId,
        record: &ServerRecord,
    ) -> Result<Option<ServerRecord>, TableError> {
        let previous = self.servers.get_row(guild.as_str())?;

        self.servers.put_row(guild.as_str(), record)?;
        self.invalidate(guild);

        tracing::info!(guild = %guild, url = %record.server_url, "stored server record");
        Ok(previous)
    }

    /// Removes the server record of `guild` and drops its cached handle
    ///
    /// Returns whether a record existed.
    pub fn remove_server(&self, guild: &GuildId) -> Result<bool, TableError> {
        let removed = self.servers.delete_row(guild.as_str())?;
        self.invalidate(guild);

        if removed {
            tracing::info!(guild = %guild, "removed server record");
        }
        Ok(removed)
    }

    /// Number of guilds with a cached handle
    pub fn cached_len(&self) -> usize {
        lock(&self.handles).len()
    }

    /// Returns the association map of `guild`, loading it on first use
    ///
    /// A map that cannot be loaded is replaced by an empty one and retried on
    /// the next connection.
    fn associations_for(&self, guild: &GuildId) -> Arc<AssociationMap> {
        if let Some(map) = lock(&self.associations).get(guild) {
            return Arc::clone(map);
        }

        match AssociationMap::load(self.association_table.as_ref(), guild) {
            Ok(map) => {
                let map = Arc::new(map);
                lock(&self.associations)
                    .entry(guild.clone())
                    .or_insert(map)
                    .clone()
            }
            Err(e) => {
                tracing::warn!(guild = %guild, error = %e, "failed to load identity associations");
                Arc::new(AssociationMap::new(guild.clone()))
            }
        }
    }
}

impl CatalogResolver for CatalogRegistry {
    /// Returns the cached handle of `guild`, connecting on first use
    ///
    /// # Arguments
    ///
    /// * `guild` - The guild whose media server is needed
    ///
    /// # Returns
    ///
    /// A shared handle on the guild's catalog. Fails with `NotConfigured`
    /// when no record is stored and with `ServiceOffline` when connecting
    /// fails; failed attempts are not cached.
    fn resolve(&self, guild: &GuildId) -> Result<Arc<ServerHandle>, ResolveError> {
        // Reuse the handle from an earlier resolution
        if let Some(handle) = lock(&self.handles).get(guild) {
            return Ok(Arc::clone(handle));
        }

        // Read the persisted connection record
        let record = self
            .servers
            .get_row(guild.as_str())?
            .ok_or_else(|| ResolveError::NotConfigured {
                guild: guild.clone(),
            })?;

        tracing::debug!(guild = %guild, url = %record.server_url, "connecting to catalog");

        // Connect, keeping the cause when the server is unreachable
        let catalog = self
            .connector
            .connect(&record)
            .map_err(|source| ResolveError::ServiceOffline {
                guild: guild.clone(),
                source,
            })?;

        // Attach the guild's associations and cache the handle
        let handle = Arc::new(ServerHandle::new(
            guild.clone(),
            catalog,
            self.associations_for(guild),
            Arc::clone(&self.servers),
        ));

        Ok(lock(&self.handles)
            .entry(guild.clone())
            .or_insert(handle)
            .clone())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::UserId;
    use crate::testing::{FakeCatalog, FakeConnector, MemoryTable};
    use std::error::Error;

    fn record() -> ServerRecord {
        ServerRecord {
            server_url: "http://plex.local:32400".to_string(),
            token: "secret".to_string(),
        }
    }

    fn other_record() -> ServerRecord {
        ServerRecord {
            server_url: "https://plex.example.com".to_string(),
            token: "rotated".to_string(),
        }
    }

    fn registry(connector: FakeConnector) -> CatalogRegistry {
        let servers = MemoryTable::new();
        servers.insert("1", record());

        let associations = MemoryTable::new();
        associations.insert(
            "1",
            AssociationRow::from([("100".to_string(), "alice".to_string())]),
        );

        CatalogRegistry::new(Box::new(connector), Arc::new(servers), Box::new(associations))
    }

    #[test]
    fn test_unconfigured_guild() {
        let registry = registry(FakeConnector::online(FakeCatalog::default()));

        let result = registry.resolve(&GuildId::from("2"));

        assert!(matches!(
            result,
            Err(ResolveError::NotConfigured { guild }) if guild == GuildId::from("2")
        ));
        assert_eq!(registry.cached_len(), 0);
    }

    #[test]
    fn test_offline_server_preserves_cause() {
        let registry = registry(FakeConnector::offline());

        let error = registry.resolve(&GuildId::from("1")).err().unwrap();

        assert!(matches!(error, ResolveError::ServiceOffline { .. }));
        let source = error.source().unwrap();
        assert!(source.to_string().contains("connection refused"));
        assert_eq!(registry.cached_len(), 0);
    }

    #[test]
    fn test_handle_is_cached_per_guild() {
        let connector = FakeConnector::online(FakeCatalog::default());
        let connects = connector.connect_count();
        let registry = registry(connector);

        let first = registry.resolve(&GuildId::from("1")).unwrap();
        let second = registry.resolve(&GuildId::from("1")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(connects.get(), 1);
        assert_eq!(registry.cached_len(), 1);
    }

    #[test]
    fn test_handle_carries_associations() {
        let registry = registry(FakeConnector::online(FakeCatalog::default()));

        let handle = registry.resolve(&GuildId::from("1")).unwrap();

        assert_eq!(handle.guild(), &GuildId::from("1"));
        assert_eq!(
            handle.associations().catalog_account(&UserId::from("100")),
            Some("alice")
        );
        assert_eq!(handle.table().get_row("1").unwrap(), Some(record()));
    }

    #[test]
    fn test_invalidate_forces_reconnect() {
        let connector = FakeConnector::online(FakeCatalog::default());
        let connects = connector.connect_count();
        let registry = registry(connector);

        let first = registry.resolve(&GuildId::from("1")).unwrap();
        assert!(registry.invalidate(&GuildId::from("1")));
        assert!(!registry.invalidate(&GuildId::from("1")));
        let second = registry.resolve(&GuildId::from("1")).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(connects.get(), 2);
        // Associations are loaded once and reused
        assert!(std::ptr::eq(first.associations(), second.associations()));
    }

    #[test]
    fn test_store_server_replaces_cached_handle() {
        let connector = FakeConnector::online(FakeCatalog::default());
        let connects = connector.connect_count();
        let registry = registry(connector);
        let first = registry.resolve(&GuildId::from("1")).unwrap();

        let previous = registry
            .store_server(&GuildId::from("1"), &other_record())
            .unwrap();

        assert_eq!(previous, Some(record()));
        assert_eq!(registry.cached_len(), 0);
        let second = registry.resolve(&GuildId::from("1")).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(connects.get(), 2);
        assert_eq!(second.table().get_row("1").unwrap(), Some(other_record()));
    }

    #[test]
    fn test_store_server_for_new_guild() {
        let registry = registry(FakeConnector::online(FakeCatalog::default()));

        let previous = registry
            .store_server(&GuildId::from("2"), &other_record())
            .unwrap();

        assert_eq!(previous, None);
        assert!(registry.resolve(&GuildId::from("2")).is_ok());
    }

    #[test]
    fn test_remove_server_stops_resolution() {
        let registry = registry(FakeConnector::online(FakeCatalog::default()));
        registry.resolve(&GuildId::from("1")).unwrap();

        assert!(registry.remove_server(&GuildId::from("1")).unwrap());
        assert!(!registry.remove_server(&GuildId::from("1")).unwrap());

        assert!(matches!(
            registry.resolve(&GuildId::from("1")),
            Err(ResolveError::NotConfigured { .. })
        ));
    }
}
