//! Sentiero navigation kernel.
//!
//! Builds per-principal navigation trees from declared action sources.
//! Sources are normalized into flat menu entries, filtered through an
//! access-control predicate, linked into a weight-ordered tree, and cached
//! at two tiers: a raw entry list shared across principals plus one
//! assembled tree per principal.

pub mod access;
pub mod config;
pub mod entry;
pub mod error;
pub mod normalize;
pub mod service;
pub mod source;
pub mod store;
pub mod tree;

pub use access::{AccessPolicy, Principal};
pub use config::MenuConfig;
pub use entry::{MenuEntry, MenuTarget, NewEntry};
pub use error::{MenuError, MenuResult};
pub use service::MenuService;
pub use source::{ActionSource, SourceOptions};
pub use store::{CacheStore, MemoryStore};
