//! URL slugs for content titles.

/// Convert a title to a URL slug.
///
/// - Lowercases the title
/// - Drops every character that is not `a-z`, `0-9`, whitespace or `-`
/// - Turns each run of whitespace and hyphens into a single hyphen
/// - Trims leading/trailing hyphens
///
/// Unlike display slugs there is no fallback: a title with no ASCII
/// alphanumerics yields an empty slug.
pub fn generate_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
        // anything else is removed without acting as a separator
    }

    slug
}
