//! Data model shared by every platswap crate.
//!
//! Field names on the serialized types match the JSON files kept next to
//! the game, so existing state files load unchanged.

pub mod constants;
pub mod types;

pub use types::{Entry, RequiredFiles, Settings, contains_invalid_characters, normalize_label};
