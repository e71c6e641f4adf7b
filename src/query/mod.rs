//! Content query engine: search, category/status filtering and sorting
//! over in-memory record collections.
//!
//! Every list view runs [`apply`], which filters first and sorts the
//! survivors. Both steps are pure: the input slice is never touched and
//! a new vector is returned.

mod collate;

pub use collate::compare_titles;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentStatus;

/// A record the engine can filter and sort.
pub trait Queryable {
    fn title(&self) -> &str;
    /// Author or instructor, when the record has one.
    fn byline(&self) -> Option<&str>;
    fn category(&self) -> &str;
    /// Publication status. Records without one never match a status filter.
    fn status(&self) -> Option<ContentStatus>;
    /// Creation date as stored; may be malformed.
    fn created_at(&self) -> &str;
    fn views(&self) -> u64 {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Latest,
    Oldest,
    Views,
    Title,
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortBy::Latest => write!(f, "latest"),
            SortBy::Oldest => write!(f, "oldest"),
            SortBy::Views => write!(f, "views"),
            SortBy::Title => write!(f, "title"),
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" | "newest" => Ok(SortBy::Latest),
            "oldest" => Ok(SortBy::Oldest),
            "views" => Ok(SortBy::Views),
            "title" => Ok(SortBy::Title),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

/// Category constraint. `All` is the "all" sentinel of the list views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => selected == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        if s == "all" {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(s.to_string())
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

/// List view state: search box, category dropdown, status dropdown and
/// sort selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub search_term: String,
    pub category: CategoryFilter,
    pub status: Option<ContentStatus>,
    pub sort_by: SortBy,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `filter` would keep every item.
    pub fn is_unconstrained(&self) -> bool {
        self.search_term.is_empty() && self.category == CategoryFilter::All && self.status.is_none()
    }
}

/// Check one item against the search, category and status constraints.
pub fn matches<T: Queryable>(item: &T, params: &QueryParams) -> bool {
    if !params.category.matches(item.category()) {
        return false;
    }

    if let Some(status) = params.status {
        if item.status() != Some(status) {
            return false;
        }
    }

    if params.search_term.is_empty() {
        return true;
    }

    let needle = params.search_term.to_lowercase();
    item.title().to_lowercase().contains(&needle)
        || item
            .byline()
            .is_some_and(|byline| byline.to_lowercase().contains(&needle))
}

/// Keep the items matching `params`, in their original order.
pub fn filter<T: Queryable + Clone>(items: &[T], params: &QueryParams) -> Vec<T> {
    items
        .iter()
        .filter(|item| matches(*item, params))
        .cloned()
        .collect()
}

/// Return a sorted copy of `items`. The sort is stable, so equal keys keep
/// their input order and sorting twice gives the same result.
///
/// A `created_at` that does not parse is compared as today's date.
pub fn sort<T: Queryable + Clone>(items: &[T], sort_by: SortBy) -> Vec<T> {
    let mut sorted = items.to_vec();

    match sort_by {
        SortBy::Latest | SortBy::Oldest => {
            let today = Utc::now().date_naive();
            let mut keyed: Vec<(NaiveDate, T)> = sorted
                .into_iter()
                .map(|item| (parse_date(item.created_at()).unwrap_or(today), item))
                .collect();
            if sort_by == SortBy::Latest {
                keyed.sort_by(|a, b| b.0.cmp(&a.0));
            } else {
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
            }
            sorted = keyed.into_iter().map(|(_, item)| item).collect();
        }
        SortBy::Views => sorted.sort_by(|a, b| b.views().cmp(&a.views())),
        SortBy::Title => sorted.sort_by(|a, b| compare_titles(a.title(), b.title())),
    }

    sorted
}

/// Filter then sort. This is the only order list views use.
pub fn apply<T: Queryable + Clone>(items: &[T], params: &QueryParams) -> Vec<T> {
    sort(&filter(items, params), params.sort_by)
}

/// Parse a search box string into query parameters.
///
/// Recognized prefixes:
/// - `category:Beginner` - category filter (`category:all` clears it)
/// - `status:draft` - status filter
/// - `sort:title` - sort key
///
/// Everything else becomes the search term. Unknown status or sort values
/// are ignored.
///
/// # Examples
///
/// ```ignore
/// let params = parse_query("category:Beginner sort:title rose care");
/// assert_eq!(params.search_term, "rose care");
/// assert_eq!(params.sort_by, SortBy::Title);
/// ```
pub fn parse_query(raw: &str) -> QueryParams {
    let mut params = QueryParams::default();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("category:") {
            params.category = CategoryFilter::from(value);
        } else if let Some(value) = token.strip_prefix("status:") {
            if let Ok(status) = value.parse() {
                params.status = Some(status);
            }
        } else if let Some(value) = token.strip_prefix("sort:") {
            if let Ok(sort_by) = value.parse() {
                params.sort_by = sort_by;
            }
        } else {
            remaining.push(token);
        }
    }

    params.search_term = remaining.join(" ");
    params
}

/// Parse a stored date. Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    None
}
