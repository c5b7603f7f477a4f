//! Test doubles for the catalog, the chat surface and tables

use crate::catalog::{CatalogConnector, CatalogError, CatalogItem, CatalogService, Season, Show};
use crate::chat::{ChannelId, ChatError, ChatSurface, Component, MessageId, OutgoingMessage};
use crate::resolver::{CatalogResolver, ResolveError, ServerHandle};
use crate::table::{ServerRecord, Table, TableError};
use crate::{AssociationMap, GuildId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An in-memory table
pub(crate) struct MemoryTable<T> {
    rows: Mutex<HashMap<String, T>>,
}

impl<T> MemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, key: &str, row: T) {
        self.rows.lock().unwrap().insert(key.to_string(), row);
    }
}

impl<T: Clone + Send> Table<T> for MemoryTable<T> {
    fn get_row(&self, key: &str) -> Result<Option<T>, TableError> {
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    fn put_row(&self, key: &str, row: &T) -> Result<(), TableError> {
        self.insert(key, row.clone());
        Ok(())
    }

    fn delete_row(&self, key: &str) -> Result<bool, TableError> {
        Ok(self.rows.lock().unwrap().remove(key).is_some())
    }
}

/// A catalog answering from fixed data and recording its requests
#[derive(Default)]
pub(crate) struct FakeCatalog {
    /// Results per query; unknown queries return nothing
    pub results: HashMap<String, Vec<CatalogItem>>,
    /// Items addressable by guid
    pub by_guid: HashMap<String, CatalogItem>,
    /// Seasons per show rating key
    pub seasons: HashMap<String, Vec<Season>>,
    pub searches: Mutex<Vec<String>>,
    pub lookups: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn with_results(mut self, query: &str, items: Vec<CatalogItem>) -> Self {
        self.results.insert(query.to_string(), items);
        self
    }

    pub fn with_item(mut self, item: CatalogItem) -> Self {
        self.by_guid.insert(item.guid().to_string(), item);
        self
    }

    pub fn with_seasons(mut self, rating_key: &str, seasons: Vec<Season>) -> Self {
        self.seasons.insert(rating_key.to_string(), seasons);
        self
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl CatalogService for FakeCatalog {
    fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        self.searches.lock().unwrap().push(query.to_string());
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    fn fetch_by_guid(&self, guid: &str) -> Result<Option<CatalogItem>, CatalogError> {
        self.lookups.lock().unwrap().push(guid.to_string());
        Ok(self.by_guid.get(guid).cloned())
    }

    fn seasons(&self, show: &Show) -> Result<Vec<Season>, CatalogError> {
        Ok(self
            .seasons
            .get(&show.header.rating_key)
            .cloned()
            .unwrap_or_default())
    }
}

impl<C: CatalogService> CatalogService for Arc<C> {
    fn search(&self, query: &str) -> Result<Vec<CatalogItem>, CatalogError> {
        (**self).search(query)
    }

    fn fetch_by_guid(&self, guid: &str) -> Result<Option<CatalogItem>, CatalogError> {
        (**self).fetch_by_guid(guid)
    }

    fn seasons(&self, show: &Show) -> Result<Vec<Season>, CatalogError> {
        (**self).seasons(show)
    }
}

/// Shared view on a counter
#[derive(Clone, Default)]
pub(crate) struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A connector that hands out a shared fake catalog or always fails
pub(crate) struct FakeConnector {
    catalog: Option<Arc<FakeCatalog>>,
    connects: Counter,
}

impl FakeConnector {
    pub fn online(catalog: FakeCatalog) -> Self {
        Self {
            catalog: Some(Arc::new(catalog)),
            connects: Counter::default(),
        }
    }

    pub fn offline() -> Self {
        Self {
            catalog: None,
            connects: Counter::default(),
        }
    }

    pub fn connect_count(&self) -> Counter {
        self.connects.clone()
    }
}

impl CatalogConnector for FakeConnector {
    fn connect(&self, _record: &ServerRecord) -> Result<Box<dyn CatalogService>, CatalogError> {
        self.connects.increment();
        match &self.catalog {
            Some(catalog) => Ok(Box::new(Arc::clone(catalog))),
            None => Err(CatalogError::RequestError("connection refused".to_string())),
        }
    }
}

/// A resolver that hands every guild the same catalog
pub(crate) struct FixedResolver {
    handle: Arc<ServerHandle>,
}

impl FixedResolver {
    pub fn new(catalog: Arc<FakeCatalog>) -> Self {
        Self {
            handle: Arc::new(ServerHandle::new(
                GuildId::from("1"),
                Box::new(catalog),
                Arc::new(AssociationMap::new(GuildId::from("1"))),
                Arc::new(MemoryTable::<ServerRecord>::new()),
            )),
        }
    }
}

impl CatalogResolver for FixedResolver {
    fn resolve(&self, _guild: &GuildId) -> Result<Arc<ServerHandle>, ResolveError> {
        Ok(Arc::clone(&self.handle))
    }
}

/// A call made to the recording surface
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SurfaceCall {
    Send(MessageId),
    Edit(MessageId),
    Disable(MessageId),
}

/// A chat surface that keeps every message and the order of calls
#[derive(Default)]
pub(crate) struct RecordingSurface {
    messages: Mutex<Vec<(MessageId, OutgoingMessage)>>,
    calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn message(&self, id: &MessageId) -> OutgoingMessage {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .find(|(message_id, _)| message_id == id)
            .map(|(_, message)| message.clone())
            .unwrap()
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ChatSurface for RecordingSurface {
    fn send(&self, _channel: &ChannelId, message: OutgoingMessage) -> Result<MessageId, ChatError> {
        let mut messages = self.messages.lock().unwrap();
        let id = MessageId(format!("sent-{}", messages.len() + 1));
        messages.push((id.clone(), message));
        self.calls.lock().unwrap().push(SurfaceCall::Send(id.clone()));
        Ok(id)
    }

    fn edit(&self, message_id: &MessageId, message: OutgoingMessage) -> Result<(), ChatError> {
        let mut messages = self.messages.lock().unwrap();
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

        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Edit(message_id.clone()));
        Ok(())
    }

    fn disable_components(&self, message_id: &MessageId) -> Result<(), ChatError> {
        if let Some((_, existing)) = self
            .messages
            .lock()
            .unwrap()
            .iter_mut()
            .find(|(id, _)| id == message_id)
        {
            existing.components.iter_mut().for_each(Component::disable);
        }

        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Disable(message_id.clone()));
        Ok(())
    }
}
