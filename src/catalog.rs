//! The catalog context: every loaded collection plus what failed to load.
//!
//! A `Catalog` is built once per load and handed by reference to the query
//! engine and the CLI. Reloading builds a new one; it is never patched in
//! place.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::content::{ContentItem, ContentKind, ContentStatus};
use crate::query::{apply, sort, QueryParams, SortBy};
use crate::service::{fetch_items, ContentService};

/// A collection whose fetch failed and was replaced by an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub kind: ContentKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: BTreeMap<ContentKind, Vec<ContentItem>>,
    failures: Vec<FetchFailure>,
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub per_kind: BTreeMap<ContentKind, usize>,
    pub published: usize,
    pub drafts: usize,
    pub total_views: u64,
    pub total_likes: u64,
    /// Mean over rated items only, one decimal. `None` when nothing is rated.
    pub average_rating: Option<f64>,
}

impl Catalog {
    /// Load each kind independently. A failed fetch leaves that kind empty
    /// and is recorded instead of aborting the load.
    pub fn load<S: ContentService + ?Sized>(service: &S, kinds: &[ContentKind]) -> Self {
        let mut catalog = Catalog::default();

        for &kind in kinds {
            match fetch_items(service, kind) {
                Ok(items) => {
                    catalog.collections.insert(kind, items);
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "fetch failed, showing no items for this kind");
                    catalog.collections.insert(kind, Vec::new());
                    catalog.failures.push(FetchFailure {
                        kind,
                        message: e.to_string(),
                    });
                }
            }
        }

        catalog
    }

    /// Group already-transformed items by kind, keeping their order.
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        let mut catalog = Catalog::default();
        for item in items {
            catalog.collections.entry(item.kind()).or_default().push(item);
        }
        catalog
    }

    pub fn items(&self, kind: ContentKind) -> &[ContentItem] {
        self.collections
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every item, grouped by kind in declaration order.
    pub fn all_items(&self) -> Vec<ContentItem> {
        self.collections.values().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when at least one collection failed to load.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FetchFailure] {
        &self.failures
    }

    /// Run the query engine over one kind, or over everything.
    pub fn query(&self, kind: Option<ContentKind>, params: &QueryParams) -> Vec<ContentItem> {
        match kind {
            Some(kind) => apply(self.items(kind), params),
            None => apply(&self.all_items(), params),
        }
    }

    /// Distinct categories in first-seen order, for the category dropdown.
    pub fn categories(&self, kind: Option<ContentKind>) -> Vec<String> {
        let items = match kind {
            Some(kind) => self.items(kind).to_vec(),
            None => self.all_items(),
        };

        let mut categories: Vec<String> = Vec::new();
        for item in &items {
            let category = &item.base().category;
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        categories
    }

    /// The `n` most recently created items across all kinds.
    pub fn recent(&self, n: usize) -> Vec<ContentItem> {
        sort(&self.all_items(), SortBy::Latest)
            .into_iter()
            .take(n)
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        let mut per_kind = BTreeMap::new();
        let mut published = 0;
        let mut drafts = 0;
        let mut total_views = 0u64;
        let mut total_likes = 0u64;
        let mut rating_sum = 0.0;
        let mut rated = 0usize;

        for (kind, items) in &self.collections {
            per_kind.insert(*kind, items.len());
            for item in items {
                let base = item.base();
                match base.status {
                    ContentStatus::Published => published += 1,
                    ContentStatus::Draft => drafts += 1,
                }
                total_views = total_views.saturating_add(base.views);
                total_likes = total_likes.saturating_add(base.likes);
                if let Some(rating) = base.rating {
                    rating_sum += rating;
                    rated += 1;
                }
            }
        }

        let average_rating = if rated == 0 {
            None
        } else {
            Some((rating_sum / rated as f64 * 10.0).round() / 10.0)
        };

        DashboardStats {
            total: published + drafts,
            per_kind,
            published,
            drafts,
            total_views,
            total_likes,
            average_rating,
        }
    }
}
