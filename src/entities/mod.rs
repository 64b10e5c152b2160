//! Flattened domain entities (spec §4.1, component C2).
//!
//! The original design's cyclic pick/surebet/bookmaker references are
//! flattened here to values carrying plain identifiers; bookmaker lookups go
//! through the configuration registry instead of back-references.

mod bookmaker;
mod pick;
mod surebet;

pub use bookmaker::{Bookmaker, BookmakerRegistry, Role};
pub use pick::Pick;
pub use surebet::Surebet;
