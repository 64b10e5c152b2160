//! Chat message composition with a cached static/dynamic split (spec §4.6,
//! component C8).

mod builder;
mod cache;

pub use builder::{LinkTable, MessageBuilder};
