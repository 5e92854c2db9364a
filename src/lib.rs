//! # Shard Gallery
//!
//! The index behind an image gallery: a durable SQLite catalog of image
//! files, a navigable in-memory list mirroring it, and a scanner that
//! spreads files across numbered shard directories so no single directory
//! grows without bound.
//!
//! # Architecture
//!
//! ```text
//!             ┌──────────────────┐
//!  callers ──▶│  GalleryManager  │── navigate / stats ──▶ NavigableIndex
//!             └────────┬─────────┘                            ▲
//!                      │ refresh / add / remove               │ rebuild
//!                      ▼                                      │
//!   static/images*  ◀── scan ──  Catalog (SQLite) ────────────┘
//! ```
//!
//! The catalog is the source of truth. The index is a view that is rebuilt
//! wholesale whenever the catalog changes in bulk and patched only for
//! single adds and removes. Navigation never touches the database.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | SQLite record store with unique filename and filepath |
//! | [`scan`] | Discovers images across `base`, `base1`, `base2`, … and provisions new shards |
//! | [`index`] | Arena-backed doubly-linked list with a cursor and per-device size profiles |
//! | [`gallery`] | Keeps index and catalog in step; the API the web layer calls |
//! | [`config`] | `gallery.toml` loading, merging and validation |
//! | [`types`] | Serializable results handed to callers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Arena Instead of Pointers
//!
//! The list's `prev`/`next` links and the cursor are slot handles into a
//! `Vec`, not `Rc<RefCell<_>>` chains. Removal frees a slot and rewires two
//! handles; there is nothing to leak and nothing to dangle.
//!
//! ## Rebuild, Don't Diff
//!
//! After a scan finds new files the whole index is thrown away and rebuilt
//! from the catalog in id order. Diffing would be faster and much easier to
//! get wrong.
//!
//! ## Shard Scanning Stops at the First Gap
//!
//! `images`, `images1`, `images2` are scanned; if `images3` is missing,
//! `images4` is never looked at. Shards are only ever created in order, so
//! a gap means someone removed a directory by hand.
//!
//! ## No Bytes, Only Metadata
//!
//! Uploads are written by the caller. The gallery records where a file is
//! and makes sure a shard with room exists, nothing more.

pub mod catalog;
pub mod config;
pub mod gallery;
pub mod index;
pub mod output;
pub mod scan;
pub mod types;

pub use catalog::{Catalog, CatalogError, ImageRecord};
pub use config::GalleryConfig;
pub use gallery::{GalleryError, GalleryManager};
pub use index::{IndexNode, NavigableIndex};

#[cfg(test)]
pub(crate) mod test_helpers;
