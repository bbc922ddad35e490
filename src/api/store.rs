// src/api/store.rs
//! The entity cache — one normalized object graph per client.
//!
//! Every object the API ever returns, whether as a primary page result
//! or buried in an `includes` side-table, lands here exactly once per
//! (kind, id). Later payloads merge additively into the same shared
//! handle, so a caller holding a [`CachedRef`] from an earlier page
//! observes updates from later pages and stream records transparently.
//!
//! Entries live as long as the owning client; there is no eviction.

use crate::error::AppError;
use crate::model::{Media, Place, Poll, StreamRule, Tweet, TwitterList, User};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::envelope::Envelope;

/// The entity kinds the cache distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tweet,
    User,
    List,
    Media,
    Place,
    Poll,
    StreamRule,
}

impl EntityKind {
    /// Which payload field carries the immutable cache key.
    ///
    /// Media objects are keyed by `media_key`; everything else uses `id`.
    pub fn id_field(self) -> &'static str {
        match self {
            EntityKind::Media => "media_key",
            _ => "id",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Tweet => "tweet",
            EntityKind::User => "user",
            EntityKind::List => "list",
            EntityKind::Media => "media",
            EntityKind::Place => "place",
            EntityKind::Poll => "poll",
            EntityKind::StreamRule => "stream_rule",
        };
        write!(f, "{}", name)
    }
}

/// The canonical shared handle to one cached entity.
pub type CachedRef = Arc<RwLock<CachedEntity>>;

/// A normalized domain object: the additive merge of every payload that
/// has mentioned this (kind, id) so far.
#[derive(Debug, Clone)]
pub struct CachedEntity {
    kind: EntityKind,
    id: String,
    fields: Map<String, Value>,
}

impl CachedEntity {
    fn new(kind: EntityKind, id: String, fields: Map<String, Value>) -> Self {
        Self { kind, id, fields }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns one raw field, if any payload has carried it yet.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All merged fields, in the key order serde_json preserves.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Decodes the merged fields into a typed read view.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            AppError::MalformedResponse(format!(
                "cached {} {} does not decode: {}",
                self.kind, self.id, e
            ))
        })
    }

    /// Field-level overwrite for fields present in the new payload;
    /// fields the payload doesn't carry survive untouched.
    fn merge(&mut self, payload: &Map<String, Value>) {
        for (key, value) in payload {
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

/// Per-entity-kind cache shared by every book and stream consumer of one
/// client. Cloning shares the underlying storage.
#[derive(Clone, Default)]
pub struct EntityStore {
    inner: Arc<RwLock<HashMap<EntityKind, HashMap<String, CachedRef>>>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or merges one raw object, returning the single canonical
    /// shared handle for its (kind, id).
    pub fn upsert(&self, kind: EntityKind, payload: &Map<String, Value>) -> Result<CachedRef, AppError> {
        let id = payload
            .get(kind.id_field())
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::MalformedResponse(format!(
                    "{} payload is missing its `{}` field",
                    kind,
                    kind.id_field()
                ))
            })?
            .to_string();

        let mut caches = self.inner.write();
        let cache = caches.entry(kind).or_default();
        if let Some(existing) = cache.get(&id) {
            existing.write().merge(payload);
            log::trace!("merged {} {}", kind, id);
            return Ok(Arc::clone(existing));
        }

        let entity = Arc::new(RwLock::new(CachedEntity::new(kind, id.clone(), payload.clone())));
        cache.insert(id, Arc::clone(&entity));
        Ok(entity)
    }

    /// Upserts a whole envelope: every includes side-table object first
    /// (so relations exist before anything points at them), then the
    /// primary payload. Returns the primaries in response order.
    pub fn upsert_envelope(
        &self,
        primary: EntityKind,
        envelope: &Envelope,
    ) -> Result<Vec<CachedRef>, AppError> {
        if let Some(includes) = &envelope.includes {
            self.upsert_side_table(EntityKind::User, &includes.users)?;
            self.upsert_side_table(EntityKind::Tweet, &includes.tweets)?;
            self.upsert_side_table(EntityKind::Media, &includes.media)?;
            self.upsert_side_table(EntityKind::Place, &includes.places)?;
            self.upsert_side_table(EntityKind::Poll, &includes.polls)?;
        }

        envelope
            .primary_objects()?
            .into_iter()
            .map(|obj| self.upsert(primary, obj))
            .collect()
    }

    fn upsert_side_table(&self, kind: EntityKind, objects: &[Value]) -> Result<(), AppError> {
        for object in objects {
            let payload = object.as_object().ok_or_else(|| {
                AppError::MalformedResponse(format!(
                    "includes side-table for {} contains a non-object entry",
                    kind
                ))
            })?;
            self.upsert(kind, payload)?;
        }
        Ok(())
    }

    /// Looks up an already-cached entity. Never triggers a fetch; a
    /// never-seen id is simply `None`.
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<CachedRef> {
        self.inner
            .read()
            .get(&kind)
            .and_then(|cache| cache.get(id))
            .map(Arc::clone)
    }

    /// Number of cached entities of one kind.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.inner.read().get(&kind).map_or(0, HashMap::len)
    }

    /// Whether nothing of this kind has been cached yet.
    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.len(kind) == 0
    }

    /// Decodes a cached entity into its typed view, if present.
    pub fn decode<T: DeserializeOwned>(&self, kind: EntityKind, id: &str) -> Option<Result<T, AppError>> {
        self.get(kind, id).map(|entity| entity.read().decode())
    }

    /// Typed convenience lookups.
    pub fn tweet(&self, id: &str) -> Option<Result<Tweet, AppError>> {
        self.decode(EntityKind::Tweet, id)
    }

    pub fn user(&self, id: &str) -> Option<Result<User, AppError>> {
        self.decode(EntityKind::User, id)
    }

    pub fn list(&self, id: &str) -> Option<Result<TwitterList, AppError>> {
        self.decode(EntityKind::List, id)
    }

    pub fn media(&self, key: &str) -> Option<Result<Media, AppError>> {
        self.decode(EntityKind::Media, key)
    }

    pub fn place(&self, id: &str) -> Option<Result<Place, AppError>> {
        self.decode(EntityKind::Place, id)
    }

    pub fn poll(&self, id: &str) -> Option<Result<Poll, AppError>> {
        self.decode(EntityKind::Poll, id)
    }

    pub fn stream_rule(&self, id: &str) -> Option<Result<StreamRule, AppError>> {
        self.decode(EntityKind::StreamRule, id)
    }
}

impl fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caches = self.inner.read();
        let mut debug = f.debug_struct("EntityStore");
        for (kind, cache) in caches.iter() {
            debug.field(&kind.to_string(), &cache.len());
        }
        debug.finish()
    }
}
