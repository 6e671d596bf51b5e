//! NASA images API adapter.

mod client;

pub use client::{NASA_API_BASE, NasaClient, NasaClientConfig};
