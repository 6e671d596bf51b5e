//! Catalog image value object.

use std::hash::{Hash, Hasher};

/// A single image from the catalog.
///
/// Identity is the asset `url`: two records with the same url are the same
/// image regardless of the other fields. Records are built by the result
/// mapper and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Image {
    /// Human-readable title. Always present in the catalog.
    pub title: String,
    /// Free-text description, when the catalog provides one.
    pub description: Option<String>,
    /// Credited photographer, when known.
    pub photographer: Option<String>,
    /// Capture location, when known.
    pub location: Option<String>,
    /// Asset URL. Identity key for equality, hashing, and caching.
    pub url: String,
}

impl Image {
    /// Creates a new image record.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        photographer: Option<String>,
        location: Option<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description,
            photographer,
            location,
            url: url.into(),
        }
    }

    /// Key under which this image's bytes are cached.
    ///
    /// The cache is keyed by the asset URL by convention.
    #[must_use]
    pub fn cache_key(&self) -> &str {
        &self.url
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Image {}

impl Hash for Image {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn earth(url: &str) -> Image {
        Image::new("Earth", Some("Blue marble".into()), None, None, url)
    }

    #[test]
    fn test_equality_is_by_url_only() {
        let a = earth("https://example.com/a.jpg");
        let mut b = earth("https://example.com/a.jpg");
        b.title = "Different title".into();
        b.photographer = Some("Someone".into());

        assert_eq!(a, b);
    }

    #[test]
    fn test_different_urls_are_different_images() {
        let a = earth("https://example.com/a.jpg");
        let b = earth("https://example.com/b.jpg");

        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_follows_url_identity() {
        let mut set = HashSet::new();
        set.insert(earth("https://example.com/a.jpg"));

        let mut same_url = earth("https://example.com/a.jpg");
        same_url.title = "Renamed".into();

        assert!(!set.insert(same_url));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_cache_key_is_the_url() {
        let image = earth("https://example.com/a.jpg");
        assert_eq!(image.cache_key(), "https://example.com/a.jpg");
    }
}
