//! Core types and pure logic for intent-archaeology
//!
//! Conversation export records, the streaming export reader, change
//! fingerprints and the mapping flattener. Nothing in this crate touches the
//! database.

pub mod config;
pub mod constants;
mod conversation;
mod error;
mod export;
mod fingerprint;
mod flatten;

pub use conversation::*;
pub use error::*;
pub use export::ExportReader;
pub use fingerprint::fingerprint;
pub use flatten::{EdgeRecord, FlatTree, NodeRecord, flatten};
