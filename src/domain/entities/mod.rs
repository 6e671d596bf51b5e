//! Domain entity definitions.

mod catalog;
mod image;

pub use catalog::{ItemData, ItemLink, SearchCollection, SearchItem, SearchResponse};
pub use image::Image;
