//! Mapping from the raw catalog envelope to domain image records.
//!
//! The mapper never fails: a malformed item (one missing its data block or
//! its asset link) is dropped, and response order is preserved for the
//! rest. A malformed outer envelope is the catalog adapter's decoding
//! error, not the mapper's concern.

use crate::domain::entities::{Image, SearchItem, SearchResponse};

/// Maps a raw search response into image records, in response order.
///
/// Per item the first data block and the first link are authoritative; an
/// item missing either is skipped without a placeholder.
#[must_use]
pub fn map_response(response: &SearchResponse) -> Vec<Image> {
    response.collection.items.iter().filter_map(map_item).collect()
}

fn map_item(item: &SearchItem) -> Option<Image> {
    let data = item.data.first()?;
    let link = item.links.first()?;
    Some(Image::new(
        data.title.clone(),
        data.description.clone(),
        data.photographer.clone(),
        data.location.clone(),
        link.href.clone(),
    ))
}
