//! Service boundary for content collections.
//!
//! A [`ContentService`] speaks in raw backend records. The helpers below
//! wrap it with the transform and validation steps every create/edit flow
//! shares, so nothing reaches the service before the form is valid and
//! nothing reaches the query engine without being transformed.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::content::{
    transform, transform_all, validate_item, validate_record, ContentItem, ContentKind,
};
use crate::error::{GroveError, Result};

/// How a create/update request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Form fields plus file parts.
    Multipart,
    /// Plain key/value object.
    Json,
}

impl Encoding {
    pub fn for_kind(kind: ContentKind) -> Self {
        if kind.requires_upload() {
            Encoding::Multipart
        } else {
            Encoding::Json
        }
    }
}

/// A file part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub field: String,
    pub file_name: String,
}

/// Request body for `create`/`update`.
#[derive(Debug, Clone)]
pub struct Payload {
    pub encoding: Encoding,
    pub fields: Map<String, Value>,
    pub files: Vec<Attachment>,
}

impl Payload {
    pub fn for_kind(kind: ContentKind) -> Self {
        Self {
            encoding: Encoding::for_kind(kind),
            fields: Map::new(),
            files: Vec::new(),
        }
    }

    /// Serialize a whole item into form fields. The `kind` tag is left out;
    /// the collection already determines it.
    pub fn from_item(item: &ContentItem) -> Result<Self> {
        let mut payload = Self::for_kind(item.kind());
        if let Value::Object(mut fields) = serde_json::to_value(item)? {
            fields.remove("kind");
            payload.fields = fields;
        }
        Ok(payload)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Add a file part. Only multipart bodies can carry files.
    pub fn attach(&mut self, field: &str, path: &Path) -> Result<()> {
        if self.encoding != Encoding::Multipart {
            return Err(GroveError::validation(
                field,
                "This content kind does not accept file uploads",
            ));
        }
        if !path.is_file() {
            return Err(GroveError::validation(
                field,
                format!("File not found: {}", path.display()),
            ));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| GroveError::validation(field, "Attachment has no file name"))?;

        self.files.push(Attachment {
            field: field.to_string(),
            file_name,
        });
        Ok(())
    }

    /// The record a backend would build from this body: the fields, with
    /// uploaded file names appended to `media`.
    pub fn to_record(&self) -> Value {
        let mut fields = self.fields.clone();
        if !self.files.is_empty() {
            let mut media: Vec<Value> = match fields.remove("media") {
                Some(Value::Array(existing)) => existing,
                _ => Vec::new(),
            };
            media.extend(
                self.files
                    .iter()
                    .map(|file| Value::String(file.file_name.clone())),
            );
            fields.insert("media".to_string(), Value::Array(media));
        }
        Value::Object(fields)
    }
}

/// Per-kind CRUD over raw backend records.
pub trait ContentService {
    fn get_all(&self, kind: ContentKind) -> Result<Vec<Value>>;
    fn create(&self, kind: ContentKind, payload: &Payload) -> Result<Value>;
    fn update(&self, kind: ContentKind, id: &str, payload: &Payload) -> Result<Value>;
    fn delete(&self, kind: ContentKind, id: &str) -> Result<()>;
}

/// Fetch and transform one collection.
pub fn fetch_items<S: ContentService + ?Sized>(
    service: &S,
    kind: ContentKind,
) -> Result<Vec<ContentItem>> {
    let raw = service.get_all(kind)?;
    debug!(kind = %kind, count = raw.len(), "fetched records");
    Ok(transform_all(kind, &raw))
}

/// Validate, then create. Nothing is sent if validation fails.
///
/// Required fields are checked on the form as submitted; ranges and lengths
/// on the transformed item.
pub fn create_item<S: ContentService + ?Sized>(
    service: &S,
    payload: &Payload,
    kind: ContentKind,
) -> Result<ContentItem> {
    let record = payload.to_record();
    validate_record(&record)?;
    validate_item(&transform(kind, &record))?;
    let created = service.create(kind, payload)?;
    Ok(transform(kind, &created))
}

/// Validate the replacement item, then update. The caller's copy is only
/// replaced once this returns `Ok`.
pub fn update_item<S: ContentService + ?Sized>(
    service: &S,
    item: &ContentItem,
) -> Result<ContentItem> {
    validate_item(item)?;
    let payload = Payload::from_item(item)?;
    let updated = service.update(item.kind(), item.id(), &payload)?;
    Ok(transform(item.kind(), &updated))
}
