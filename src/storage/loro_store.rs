use std::fs;
use std::path::{Path, PathBuf};

use loro::{LoroDoc, LoroList, LoroMap, LoroValue, ValueOrContainer};
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::content::{transform, ContentItem, ContentKind};
use crate::error::{GroveError, Result};
use crate::service::{ContentService, Payload};
use crate::user::User;

pub const DATA_DIR: &str = ".greengroves";
pub const CATALOG_DB: &str = "catalog.db";

const USERS: &str = "users";
const SEQ_FIELD: &str = "_seq";

/// Local catalog persisted as a loro document, one top-level map per
/// content collection plus one for users.
///
/// Mutations are committed to the in-memory document; call [`save`] to
/// write the snapshot to disk.
///
/// [`save`]: LoroStore::save
pub struct LoroStore {
    doc: LoroDoc,
    path: PathBuf,
}

impl LoroStore {
    /// Initialize a new catalog under `root`.
    pub fn init(root: &Path) -> Result<Self> {
        let data_dir = root.join(DATA_DIR);

        if data_dir.exists() {
            return Err(GroveError::AlreadyInitialized);
        }

        fs::create_dir_all(&data_dir)?;

        let doc = LoroDoc::new();
        let path = data_dir.join(CATALOG_DB);

        let store = Self { doc, path };
        store.save()?;
        info!(path = %store.path.display(), "initialized catalog");

        Ok(store)
    }

    /// Open an existing catalog.
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(DATA_DIR).join(CATALOG_DB);

        if !path.exists() {
            return Err(GroveError::NotInitialized);
        }

        let bytes = fs::read(&path)?;
        let doc = LoroDoc::new();
        doc.import(&bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "opened catalog");

        Ok(Self { doc, path })
    }

    /// Save the document to disk
    pub fn save(&self) -> Result<()> {
        let bytes = self.doc.export(loro::ExportMode::Snapshot)?;
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Size of the saved snapshot in bytes.
    pub fn file_size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    fn next_sequence_number(&self, collection: &str) -> Result<i64> {
        let meta = self.doc.get_map("_meta");
        let sequences = meta.get_or_create_container("sequences", LoroMap::new())?;

        let current = sequences
            .get(collection)
            .and_then(|v| match v {
                ValueOrContainer::Value(LoroValue::I64(n)) => Some(n),
                _ => None,
            })
            .unwrap_or(0);

        let next = current + 1;
        sequences.insert(collection, next)?;
        Ok(next)
    }

    /// Write a record's fields into a new entry of `collection`.
    fn put_record(
        &self,
        collection: &str,
        id: &str,
        fields: &Map<String, Value>,
        seq: i64,
    ) -> Result<()> {
        let entries = self.doc.get_map(collection);
        let entity_map = entries.get_or_create_container(id, LoroMap::new())?;

        entity_map.insert(SEQ_FIELD, seq)?;
        for (key, value) in fields {
            match value {
                Value::String(s) => {
                    entity_map.insert(key, s.clone())?;
                }
                Value::Bool(b) => {
                    entity_map.insert(key, *b)?;
                }
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        entity_map.insert(key, i)?;
                    } else if n.is_u64() {
                        // counts past i64::MAX are clamped so they read back as integers
                        entity_map.insert(key, i64::MAX)?;
                    } else if let Some(f) = n.as_f64() {
                        entity_map.insert(key, f)?;
                    }
                }
                Value::Array(items) => {
                    let list = entity_map.get_or_create_container(key, LoroList::new())?;
                    for item in items.iter().filter_map(Value::as_str) {
                        list.push(item.to_string())?;
                    }
                }
                Value::Null | Value::Object(_) => {}
            }
        }

        self.doc.commit();
        Ok(())
    }

    /// Every record of `collection` in insertion order, with the sequence
    /// field stripped.
    fn records(&self, collection: &str) -> Vec<Value> {
        let mut records: Vec<(i64, Value)> = Vec::new();

        let json = self.doc.get_map(collection).get_deep_value();
        if let LoroValue::Map(map) = json {
            for (_, entity_value) in map.iter() {
                if let LoroValue::Map(entity_map) = entity_value {
                    let seq = match entity_map.get(SEQ_FIELD) {
                        Some(LoroValue::I64(n)) => *n,
                        _ => i64::MAX,
                    };
                    let mut fields = Map::new();
                    for (key, value) in entity_map.iter() {
                        if key.as_str() != SEQ_FIELD {
                            fields.insert(key.to_string(), loro_to_json(value));
                        }
                    }
                    records.push((seq, Value::Object(fields)));
                }
            }
        }

        records.sort_by_key(|(seq, _)| *seq);
        records.into_iter().map(|(_, record)| record).collect()
    }

    fn sequence_of(&self, collection: &str, id: &str) -> Option<i64> {
        let entries = self.doc.get_map(collection);
        match entries.get(id) {
            Some(ValueOrContainer::Container(loro::Container::Map(map))) => {
                match map.get(SEQ_FIELD) {
                    Some(ValueOrContainer::Value(LoroValue::I64(n))) => Some(n),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn remove(&self, collection: &str, id: &str) -> Result<()> {
        let entries = self.doc.get_map(collection);

        if entries.get(id).is_none() {
            return Err(GroveError::ItemNotFound(id.to_string()));
        }

        entries.delete(id)?;
        self.doc.commit();
        Ok(())
    }

    /// Add an item to its kind's collection.
    pub fn add_item(&self, item: &ContentItem) -> Result<()> {
        let collection = item.kind().collection();
        let seq = self.next_sequence_number(collection)?;
        self.put_record(collection, item.id(), &item_fields(item)?, seq)?;
        debug!(kind = %item.kind(), id = item.id(), "added item");
        Ok(())
    }

    /// Replace an existing item wholesale, keeping its position.
    pub fn replace_item(&self, item: &ContentItem) -> Result<()> {
        let collection = item.kind().collection();
        let seq = self
            .sequence_of(collection, item.id())
            .ok_or_else(|| GroveError::ItemNotFound(item.id().to_string()))?;

        self.remove(collection, item.id())?;
        self.put_record(collection, item.id(), &item_fields(item)?, seq)?;
        debug!(kind = %item.kind(), id = item.id(), "replaced item");
        Ok(())
    }

    pub fn delete_item(&self, kind: ContentKind, id: &str) -> Result<()> {
        self.remove(kind.collection(), id)?;
        debug!(kind = %kind, id, "deleted item");
        Ok(())
    }

    pub fn get_item(&self, kind: ContentKind, id: &str) -> Result<Option<ContentItem>> {
        Ok(self.list_items(kind)?.into_iter().find(|item| item.id() == id))
    }

    pub fn list_items(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        self.records(kind.collection())
            .into_iter()
            .map(|record| item_from_record(kind, record))
            .collect()
    }

    /// Find an item of any kind by full id or unique id prefix.
    pub fn find_item(&self, id: &str) -> Result<Option<ContentItem>> {
        let mut items = Vec::new();
        for kind in ContentKind::ALL {
            items.extend(self.list_items(kind)?);
        }

        resolve_key(id, items, |item| item.id() == id, |item| item.id(), "items")
    }

    pub fn add_user(&self, user: &User) -> Result<()> {
        let fields = match serde_json::to_value(user)? {
            Value::Object(fields) => fields,
            _ => return Err(GroveError::Storage("user did not serialize to an object".into())),
        };
        let seq = self.next_sequence_number(USERS)?;
        self.put_record(USERS, &user.id, &fields, seq)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.records(USERS)
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(GroveError::from))
            .collect()
    }

    /// Find a user by id, email or unique id prefix.
    pub fn find_user(&self, key: &str) -> Result<Option<User>> {
        resolve_key(
            key,
            self.list_users()?,
            |u| u.id == key || u.email.eq_ignore_ascii_case(key),
            |u| u.id.as_str(),
            "users",
        )
    }

    pub fn delete_user(&self, id: &str) -> Result<()> {
        self.remove(USERS, id)
    }
}

impl ContentService for LoroStore {
    fn get_all(&self, kind: ContentKind) -> Result<Vec<Value>> {
        Ok(self.records(kind.collection()))
    }

    fn create(&self, kind: ContentKind, payload: &Payload) -> Result<Value> {
        let mut record = payload.to_record();
        if let Value::Object(fields) = &mut record {
            fields.remove("_id");
            fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let item = transform(kind, &record);
        self.add_item(&item)?;
        Ok(serde_json::to_value(&item)?)
    }

    fn update(&self, kind: ContentKind, id: &str, payload: &Payload) -> Result<Value> {
        let existing = self
            .get_item(kind, id)?
            .ok_or_else(|| GroveError::ItemNotFound(id.to_string()))?;

        let mut record = payload.to_record();
        if let Value::Object(fields) = &mut record {
            fields.remove("_id");
            fields.insert("id".to_string(), Value::String(id.to_string()));
            fields
                .entry("createdAt")
                .or_insert_with(|| Value::String(existing.base().created_at.clone()));
            fields.insert(
                "updatedAt".to_string(),
                Value::String(chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()),
            );
        }

        let item = transform(kind, &record);
        self.replace_item(&item)?;
        Ok(serde_json::to_value(&item)?)
    }

    fn delete(&self, kind: ContentKind, id: &str) -> Result<()> {
        self.delete_item(kind, id)
    }
}

/// Resolve a lookup key to one record. An exact match wins; otherwise the
/// key must be the id prefix of exactly one candidate.
fn resolve_key<T>(
    key: &str,
    candidates: Vec<T>,
    is_exact: impl Fn(&T) -> bool,
    id_of: impl Fn(&T) -> &str,
    noun: &str,
) -> Result<Option<T>> {
    if key.trim().is_empty() {
        return Err(GroveError::validation("id", "An id is required"));
    }

    let mut prefixed = Vec::new();
    for candidate in candidates {
        if is_exact(&candidate) {
            return Ok(Some(candidate));
        }
        if id_of(&candidate).starts_with(key) {
            prefixed.push(candidate);
        }
    }

    match prefixed.len() {
        0 => Ok(None),
        1 => Ok(prefixed.pop()),
        n => Err(GroveError::validation(
            "id",
            format!("'{}' matches {} {}; use a longer prefix", key, n, noun),
        )),
    }
}

fn item_fields(item: &ContentItem) -> Result<Map<String, Value>> {
    match serde_json::to_value(item)? {
        Value::Object(mut fields) => {
            fields.remove("kind");
            Ok(fields)
        }
        _ => Err(GroveError::Storage("item did not serialize to an object".into())),
    }
}

fn item_from_record(kind: ContentKind, mut record: Value) -> Result<ContentItem> {
    if let Value::Object(fields) = &mut record {
        fields.insert("kind".to_string(), Value::String(kind.to_string()));
    }
    Ok(serde_json::from_value(record)?)
}

fn loro_to_json(value: &LoroValue) -> Value {
    match value {
        LoroValue::String(s) => Value::String(s.to_string()),
        LoroValue::I64(n) => Value::from(*n),
        LoroValue::Double(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        LoroValue::Bool(b) => Value::Bool(*b),
        LoroValue::List(items) => Value::Array(items.iter().map(loro_to_json).collect()),
        LoroValue::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), loro_to_json(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}
