//! Raw search-response envelope returned by the catalog API.
//!
//! These types mirror the wire format of the NASA images API search
//! endpoint. The result mapper turns them into [`Image`](super::Image)
//! records; nothing outside the mapper and the catalog adapter should
//! need to touch them.

use serde::Deserialize;

/// Top-level search response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Result collection wrapper.
    pub collection: SearchCollection,
}

/// One page worth of result items.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCollection {
    /// Items in response order.
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One catalog item: metadata blocks plus asset links.
///
/// Both lists can legitimately be empty on the wire; the mapper decides
/// what to do with such items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchItem {
    /// Metadata blocks; the first one is authoritative.
    #[serde(default)]
    pub data: Vec<ItemData>,
    /// Asset links; the first one carries the image URL.
    #[serde(default)]
    pub links: Vec<ItemLink>,
}

/// Metadata block for an item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemData {
    /// Item title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Credited photographer.
    #[serde(default)]
    pub photographer: Option<String>,
    /// Capture location.
    #[serde(default)]
    pub location: Option<String>,
}

/// Asset link for an item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemLink {
    /// URL of the linked asset.
    pub href: String,
}
