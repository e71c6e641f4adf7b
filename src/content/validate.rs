use serde_json::Value;

use super::{normalize_date, ContentItem};
use crate::error::{GroveError, Result};
use crate::query::parse_date;

pub const MAX_TITLE_LEN: usize = 200;

/// Check a create/edit form before anything is written.
pub fn validate_item(item: &ContentItem) -> Result<()> {
    let base = item.base();

    let title = base.title.trim();
    if title.is_empty() {
        return Err(GroveError::validation("title", "Title is required"));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(GroveError::validation(
            "title",
            format!("Title too long: {} characters (max {})", len, MAX_TITLE_LEN),
        ));
    }
    if !title.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(GroveError::validation(
            "title",
            "Title must contain at least one letter or digit",
        ));
    }

    if base.category.trim().is_empty() {
        return Err(GroveError::validation("category", "Category is required"));
    }

    if let Some(rating) = base.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(GroveError::validation(
                "rating",
                format!("Rating {} is outside 0-5", rating),
            ));
        }
    }

    if parse_date(&base.created_at).is_none() {
        return Err(GroveError::validation(
            "createdAt",
            format!("Invalid date '{}'. Expected YYYY-MM-DD", base.created_at),
        ));
    }

    if let Some(price) = item.price() {
        if price < 0.0 {
            return Err(GroveError::validation("price", "Price cannot be negative"));
        }
    }

    Ok(())
}

/// Check the raw fields of a create form. Runs before the transform, which
/// would otherwise fill a missing title, category or date with defaults.
pub fn validate_record(raw: &Value) -> Result<()> {
    require_title(raw)?;

    let category = match raw.get("category") {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(obj @ Value::Object(_)) => has_text(obj, &["name", "title"]),
        _ => false,
    };
    if !category {
        return Err(GroveError::validation("category", "Category is required"));
    }

    for key in ["createdAt", "created_at", "date"] {
        if let Some(value) = raw.get(key) {
            let text = value.as_str().unwrap_or_default();
            if normalize_date(text).is_none() {
                return Err(GroveError::validation(
                    "createdAt",
                    format!("Invalid date '{}'. Expected YYYY-MM-DD", text),
                ));
            }
        }
    }

    Ok(())
}

/// A raw record must carry a non-blank `title` (or product `name`).
pub fn require_title(raw: &Value) -> Result<()> {
    if has_text(raw, &["title", "name"]) {
        Ok(())
    } else {
        Err(GroveError::validation("title", "Title is required"))
    }
}

fn has_text(raw: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .any(|key| matches!(raw.get(*key), Some(Value::String(s)) if !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::content::tests::base;
    use crate::content::ContentKind;

    fn item_with(f: impl FnOnce(&mut crate::content::ContentBase)) -> ContentItem {
        let mut b = base("1", "Rose Care");
        f(&mut b);
        ContentItem::new(ContentKind::Article, b)
    }

    fn field_of(err: GroveError) -> String {
        match err {
            GroveError::Validation { field, .. } => field,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_item_passes() {
        assert!(validate_item(&item_with(|_| {})).is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = validate_item(&item_with(|b| b.title = "   ".into())).unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn test_title_without_alphanumerics_rejected() {
        let err = validate_item(&item_with(|b| b.title = "!!!".into())).unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn test_long_title_rejected() {
        let err = validate_item(&item_with(|b| b.title = "a".repeat(MAX_TITLE_LEN + 1))).unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let err = validate_item(&item_with(|b| b.rating = Some(5.5))).unwrap_err();
        assert_eq!(field_of(err), "rating");
    }

    #[test]
    fn test_bad_date_rejected() {
        let err = validate_item(&item_with(|b| b.created_at = "soon".into())).unwrap_err();
        assert_eq!(field_of(err), "createdAt");
    }

    #[test]
    fn test_blank_category_rejected() {
        let err = validate_item(&item_with(|b| b.category = String::new())).unwrap_err();
        assert_eq!(field_of(err), "category");
    }

    #[test]
    fn test_record_missing_required_fields_rejected() {
        let err = validate_record(&json!({})).unwrap_err();
        assert_eq!(field_of(err), "title");

        let err = validate_record(&json!({ "title": "  ", "category": "Soil" })).unwrap_err();
        assert_eq!(field_of(err), "title");

        let err = validate_record(&json!({ "title": "Mulch" })).unwrap_err();
        assert_eq!(field_of(err), "category");

        let err = validate_record(&json!({ "title": "Mulch", "category": { "name": "" } })).unwrap_err();
        assert_eq!(field_of(err), "category");
    }

    #[test]
    fn test_record_bad_date_rejected() {
        let err = validate_record(&json!({
            "title": "Mulch",
            "category": "Soil",
            "createdAt": "next week"
        }))
        .unwrap_err();
        assert_eq!(field_of(err), "createdAt");
    }

    #[test]
    fn test_record_accepts_backend_shapes() {
        assert!(validate_record(&json!({ "name": "Trowel", "category": { "name": "Hand tools" } })).is_ok());
        assert!(validate_record(&json!({
            "title": "Mulch",
            "category": "Soil",
            "createdAt": "2024-04-02T09:30:00Z"
        }))
        .is_ok());
    }
}
