//! Content records shown in the admin list views and the public catalog pages.

mod transform;
mod validate;

pub use transform::{
    normalize_date, transform, transform_accessory, transform_all, transform_article,
    transform_book, transform_essential, transform_pot, transform_suggestion, transform_tool,
    transform_video,
};
pub use validate::{require_title, validate_item, validate_record, MAX_TITLE_LEN};

use serde::{Deserialize, Serialize};

use crate::query::Queryable;
use crate::slug::generate_slug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Video,
    Book,
    Tool,
    Essential,
    Pot,
    Accessory,
    Suggestion,
}

impl ContentKind {
    pub const ALL: [ContentKind; 8] = [
        ContentKind::Article,
        ContentKind::Video,
        ContentKind::Book,
        ContentKind::Tool,
        ContentKind::Essential,
        ContentKind::Pot,
        ContentKind::Accessory,
        ContentKind::Suggestion,
    ];

    /// Name of the collection holding this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            ContentKind::Article => "articles",
            ContentKind::Video => "videos",
            ContentKind::Book => "books",
            ContentKind::Tool => "tools",
            ContentKind::Essential => "essentials",
            ContentKind::Pot => "pots",
            ContentKind::Accessory => "accessories",
            ContentKind::Suggestion => "suggestions",
        }
    }

    /// Kinds whose create/edit forms carry file uploads.
    pub fn requires_upload(&self) -> bool {
        !matches!(self, ContentKind::Suggestion)
    }

    /// Shop products, as opposed to editorial content.
    pub fn is_product(&self) -> bool {
        matches!(
            self,
            ContentKind::Tool | ContentKind::Essential | ContentKind::Pot | ContentKind::Accessory
        )
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Article => write!(f, "article"),
            ContentKind::Video => write!(f, "video"),
            ContentKind::Book => write!(f, "book"),
            ContentKind::Tool => write!(f, "tool"),
            ContentKind::Essential => write!(f, "essential"),
            ContentKind::Pot => write!(f, "pot"),
            ContentKind::Accessory => write!(f, "accessory"),
            ContentKind::Suggestion => write!(f, "suggestion"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "article" | "articles" => Ok(ContentKind::Article),
            "video" | "videos" => Ok(ContentKind::Video),
            "book" | "books" => Ok(ContentKind::Book),
            "tool" | "tools" => Ok(ContentKind::Tool),
            "essential" | "essentials" => Ok(ContentKind::Essential),
            "pot" | "pots" => Ok(ContentKind::Pot),
            "accessory" | "accessories" => Ok(ContentKind::Accessory),
            "suggestion" | "suggestions" => Ok(ContentKind::Suggestion),
            _ => Err(format!("Invalid content kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Published,
    Draft,
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentStatus::Published => write!(f, "published"),
            ContentStatus::Draft => write!(f, "draft"),
        }
    }
}

impl std::str::FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "published" | "publish" | "live" => Ok(ContentStatus::Published),
            "draft" | "unpublished" => Ok(ContentStatus::Draft),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

/// Fields shared by every content kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBase {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// ISO date (`YYYY-MM-DD`). Kept as text so a malformed value read
    /// from elsewhere still round-trips.
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A content record, one variant per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    Article {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media: Vec<String>,
    },
    Video {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instructor: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media: Vec<String>,
    },
    Book {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media: Vec<String>,
    },
    Tool {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media: Vec<String>,
    },
    Essential {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media: Vec<String>,
    },
    Pot {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media: Vec<String>,
    },
    Accessory {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        media: Vec<String>,
    },
    Suggestion {
        #[serde(flatten)]
        base: ContentBase,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        season: Option<String>,
    },
}

impl ContentItem {
    /// Build an item of `kind` with no kind-specific fields set.
    pub fn new(kind: ContentKind, base: ContentBase) -> Self {
        match kind {
            ContentKind::Article => ContentItem::Article {
                base,
                author: None,
                media: Vec::new(),
            },
            ContentKind::Video => ContentItem::Video {
                base,
                instructor: None,
                duration: None,
                media: Vec::new(),
            },
            ContentKind::Book => ContentItem::Book {
                base,
                author: None,
                price: None,
                media: Vec::new(),
            },
            ContentKind::Tool => ContentItem::Tool {
                base,
                price: None,
                media: Vec::new(),
            },
            ContentKind::Essential => ContentItem::Essential {
                base,
                price: None,
                media: Vec::new(),
            },
            ContentKind::Pot => ContentItem::Pot {
                base,
                price: None,
                media: Vec::new(),
            },
            ContentKind::Accessory => ContentItem::Accessory {
                base,
                price: None,
                media: Vec::new(),
            },
            ContentKind::Suggestion => ContentItem::Suggestion { base, season: None },
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Article { .. } => ContentKind::Article,
            ContentItem::Video { .. } => ContentKind::Video,
            ContentItem::Book { .. } => ContentKind::Book,
            ContentItem::Tool { .. } => ContentKind::Tool,
            ContentItem::Essential { .. } => ContentKind::Essential,
            ContentItem::Pot { .. } => ContentKind::Pot,
            ContentItem::Accessory { .. } => ContentKind::Accessory,
            ContentItem::Suggestion { .. } => ContentKind::Suggestion,
        }
    }

    pub fn base(&self) -> &ContentBase {
        match self {
            ContentItem::Article { base, .. }
            | ContentItem::Video { base, .. }
            | ContentItem::Book { base, .. }
            | ContentItem::Tool { base, .. }
            | ContentItem::Essential { base, .. }
            | ContentItem::Pot { base, .. }
            | ContentItem::Accessory { base, .. }
            | ContentItem::Suggestion { base, .. } => base,
        }
    }

    /// Replace the shared fields, keeping kind-specific ones. Items are
    /// never edited in place; an edit produces a new item.
    pub fn with_base(mut self, new_base: ContentBase) -> Self {
        match &mut self {
            ContentItem::Article { base, .. }
            | ContentItem::Video { base, .. }
            | ContentItem::Book { base, .. }
            | ContentItem::Tool { base, .. }
            | ContentItem::Essential { base, .. }
            | ContentItem::Pot { base, .. }
            | ContentItem::Accessory { base, .. }
            | ContentItem::Suggestion { base, .. } => *base = new_base,
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn title(&self) -> &str {
        &self.base().title
    }

    /// Author for articles and books, instructor for videos.
    pub fn byline(&self) -> Option<&str> {
        match self {
            ContentItem::Article { author, .. } | ContentItem::Book { author, .. } => {
                author.as_deref()
            }
            ContentItem::Video { instructor, .. } => instructor.as_deref(),
            _ => None,
        }
    }

    pub fn price(&self) -> Option<f64> {
        match self {
            ContentItem::Book { price, .. }
            | ContentItem::Tool { price, .. }
            | ContentItem::Essential { price, .. }
            | ContentItem::Pot { price, .. }
            | ContentItem::Accessory { price, .. } => *price,
            _ => None,
        }
    }

    pub fn media(&self) -> &[String] {
        match self {
            ContentItem::Article { media, .. }
            | ContentItem::Video { media, .. }
            | ContentItem::Book { media, .. }
            | ContentItem::Tool { media, .. }
            | ContentItem::Essential { media, .. }
            | ContentItem::Pot { media, .. }
            | ContentItem::Accessory { media, .. } => media.as_slice(),
            ContentItem::Suggestion { .. } => &[],
        }
    }

    pub fn slug(&self) -> String {
        generate_slug(self.title())
    }
}

impl Queryable for ContentItem {
    fn title(&self) -> &str {
        &self.base().title
    }

    fn byline(&self) -> Option<&str> {
        ContentItem::byline(self)
    }

    fn category(&self) -> &str {
        &self.base().category
    }

    fn status(&self) -> Option<ContentStatus> {
        Some(self.base().status)
    }

    fn created_at(&self) -> &str {
        &self.base().created_at
    }

    fn views(&self) -> u64 {
        self.base().views
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn base(id: &str, title: &str) -> ContentBase {
        ContentBase {
            id: id.to_string(),
            title: title.to_string(),
            category: "General".to_string(),
            status: ContentStatus::Published,
            views: 0,
            likes: 0,
            rating: None,
            created_at: "2024-01-01".to_string(),
            updated_at: "2024-01-01".to_string(),
            tags: Vec::new(),
            description: None,
        }
    }

    #[test]
    fn test_kind_parse_accepts_plural() {
        assert_eq!("videos".parse::<ContentKind>().unwrap(), ContentKind::Video);
        assert_eq!("Accessory".parse::<ContentKind>().unwrap(), ContentKind::Accessory);
        assert!("plant".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_only_suggestions_skip_uploads() {
        for kind in ContentKind::ALL {
            assert_eq!(kind.requires_upload(), kind != ContentKind::Suggestion);
        }
    }

    #[test]
    fn test_byline_by_kind() {
        let video = ContentItem::Video {
            base: base("v1", "Pruning"),
            instructor: Some("Ada".into()),
            duration: None,
            media: Vec::new(),
        };
        assert_eq!(video.byline(), Some("Ada"));

        let pot = ContentItem::new(ContentKind::Pot, base("p1", "Terracotta"));
        assert_eq!(pot.byline(), None);
        assert_eq!(pot.kind(), ContentKind::Pot);
    }

    #[test]
    fn test_with_base_keeps_kind_fields() {
        let book = ContentItem::Book {
            base: base("b1", "Old"),
            author: Some("Gertrude Jekyll".into()),
            price: Some(12.5),
            media: Vec::new(),
        };
        let mut new_base = book.base().clone();
        new_base.title = "New".into();
        let book = book.with_base(new_base);
        assert_eq!(book.title(), "New");
        assert_eq!(book.byline(), Some("Gertrude Jekyll"));
        assert_eq!(book.price(), Some(12.5));
    }

    #[test]
    fn test_serialization_uses_kind_tag_and_camel_case() {
        let article = ContentItem::Article {
            base: base("a1", "Rose Care"),
            author: Some("Sam".into()),
            media: Vec::new(),
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["kind"], "article");
        assert_eq!(json["createdAt"], "2024-01-01");
        assert_eq!(json["author"], "Sam");

        let parsed: ContentItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, article);
    }
}
