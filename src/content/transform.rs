//! Map raw backend records onto [`ContentItem`].
//!
//! Each content kind has its own transform. The backend is loose about
//! field names (`_id` vs `id`, `name` vs `title`, nested category objects),
//! so lookups try the known spellings in order and fall back to a default
//! instead of failing.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::{ContentBase, ContentItem, ContentKind, ContentStatus};
use crate::query::parse_date;

pub const UNTITLED: &str = "Untitled";
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Transform a raw record of the given kind.
pub fn transform(kind: ContentKind, raw: &Value) -> ContentItem {
    match kind {
        ContentKind::Article => transform_article(raw),
        ContentKind::Video => transform_video(raw),
        ContentKind::Book => transform_book(raw),
        ContentKind::Tool => transform_tool(raw),
        ContentKind::Essential => transform_essential(raw),
        ContentKind::Pot => transform_pot(raw),
        ContentKind::Accessory => transform_accessory(raw),
        ContentKind::Suggestion => transform_suggestion(raw),
    }
}

/// Transform every record of a `getAll` response.
pub fn transform_all(kind: ContentKind, raw: &[Value]) -> Vec<ContentItem> {
    raw.iter().map(|record| transform(kind, record)).collect()
}

pub fn transform_article(raw: &Value) -> ContentItem {
    ContentItem::Article {
        base: transform_base(raw),
        author: person(raw, "author"),
        media: string_list(raw, &["media", "images"]),
    }
}

pub fn transform_video(raw: &Value) -> ContentItem {
    ContentItem::Video {
        base: transform_base(raw),
        instructor: person(raw, "instructor"),
        duration: string_field(raw, &["duration"]),
        media: string_list(raw, &["media", "videoUrl", "thumbnail"]),
    }
}

pub fn transform_book(raw: &Value) -> ContentItem {
    ContentItem::Book {
        base: transform_base(raw),
        author: person(raw, "author"),
        price: price(raw),
        media: string_list(raw, &["media", "coverImage", "images"]),
    }
}

pub fn transform_tool(raw: &Value) -> ContentItem {
    ContentItem::Tool {
        base: transform_base(raw),
        price: price(raw),
        media: string_list(raw, &["media", "images", "image"]),
    }
}

pub fn transform_essential(raw: &Value) -> ContentItem {
    ContentItem::Essential {
        base: transform_base(raw),
        price: price(raw),
        media: string_list(raw, &["media", "images", "image"]),
    }
}

pub fn transform_pot(raw: &Value) -> ContentItem {
    ContentItem::Pot {
        base: transform_base(raw),
        price: price(raw),
        media: string_list(raw, &["media", "images", "image"]),
    }
}

pub fn transform_accessory(raw: &Value) -> ContentItem {
    ContentItem::Accessory {
        base: transform_base(raw),
        price: price(raw),
        media: string_list(raw, &["media", "images", "image"]),
    }
}

pub fn transform_suggestion(raw: &Value) -> ContentItem {
    ContentItem::Suggestion {
        base: transform_base(raw),
        season: string_field(raw, &["season"]),
    }
}

fn transform_base(raw: &Value) -> ContentBase {
    let created_at = string_field(raw, &["createdAt", "created_at", "date"])
        .and_then(|s| normalize_date(&s))
        .unwrap_or_else(today);
    let updated_at = string_field(raw, &["updatedAt", "updated_at"])
        .and_then(|s| normalize_date(&s))
        .unwrap_or_else(|| created_at.clone());

    ContentBase {
        id: id(raw),
        title: string_field(raw, &["title", "name"]).unwrap_or_else(|| UNTITLED.to_string()),
        category: category(raw),
        status: status(raw),
        views: count(raw, "views"),
        likes: count(raw, "likes"),
        rating: number(raw, &["rating"]).map(|r| r.clamp(0.0, 5.0)),
        created_at,
        updated_at,
        tags: tags(raw),
        description: string_field(raw, &["description", "excerpt", "summary"]),
    }
}

/// Normalize a date or timestamp to `YYYY-MM-DD`.
pub fn normalize_date(s: &str) -> Option<String> {
    if let Some(date) = parse_date(s) {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    // Timestamps the RFC 3339 parser rejects, e.g. "2024-05-01 10:00:00"
    s.trim()
        .get(..10)
        .and_then(parse_date)
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

fn id(raw: &Value) -> String {
    for key in ["_id", "id"] {
        match raw.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.trim().to_string(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    Uuid::new_v4().to_string()
}

/// First non-blank string among `keys`, trimmed.
fn string_field(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

/// A person given either as a string or as an object with a `name`.
fn person(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Object(_)) => raw.get(key).and_then(|obj| string_field(obj, &["name"])),
        _ => None,
    }
}

fn category(raw: &Value) -> String {
    match raw.get("category") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(obj @ Value::Object(_)) => {
            string_field(obj, &["name", "title"]).unwrap_or_else(|| UNCATEGORIZED.to_string())
        }
        _ => UNCATEGORIZED.to_string(),
    }
}

fn status(raw: &Value) -> ContentStatus {
    if let Some(Value::String(s)) = raw.get("status") {
        if let Ok(status) = s.parse() {
            return status;
        }
    }
    for key in ["isPublished", "published"] {
        if let Some(Value::Bool(published)) = raw.get(key) {
            return if *published {
                ContentStatus::Published
            } else {
                ContentStatus::Draft
            };
        }
    }
    ContentStatus::default()
}

/// Number given either as a JSON number or as numeric text.
fn number(raw: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match raw.get(*key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|n| n.is_finite())
}

fn count(raw: &Value, key: &str) -> u64 {
    number(raw, &[key])
        .map(|n| if n < 0.0 { 0 } else { n as u64 })
        .unwrap_or(0)
}

fn price(raw: &Value) -> Option<f64> {
    number(raw, &["price"]).filter(|p| *p >= 0.0)
}

fn tags(raw: &Value) -> Vec<String> {
    match raw.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|t| t.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Strings under the first present key; a single string counts as a list
/// of one.
fn string_list(raw: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        match raw.get(*key) {
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(|t| t.as_str())
                    .filter(|t| !t.trim().is_empty())
                    .map(String::from)
                    .collect()
            }
            Some(Value::String(s)) if !s.trim().is_empty() => return vec![s.clone()],
            _ => {}
        }
    }
    Vec::new()
}
