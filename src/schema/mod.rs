//! Unified scene.counts.v1 schema
//!
//! This module defines the raw per-scene input schema: observable structural
//! counts produced by an upstream screenplay parser. Records arrive as a JSON
//! array or as NDJSON, one scene per line, in reading order.

mod adapter;
mod scene_counts;

pub use adapter::*;
pub use scene_counts::*;
