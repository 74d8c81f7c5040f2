//! Metric-aware image gallery listings.
//!
//! A URL query string is decoded into a [`FilterModel`], compiled into an
//! [`ImagePredicate`] plus [`OrderSpec`], and executed by a
//! [`ListingService`] against an [`ImageStore`]. The current model is encoded
//! back into a canonical query string so the address bar and listing state
//! stay in sync.

pub mod codec;
pub mod config;
pub mod db;
pub mod filter;
pub mod listing;
pub mod logging;
pub mod query;
pub mod requests;

pub use db::{ImageRecord, ImageStore, SqliteDb};
pub use filter::{ColorRange, Filter, FilterModel, Metric, Range, Relation, SortOrder};
pub use listing::{ListingError, ListingPage, ListingService};
pub use query::{compile, CompiledQuery, ImagePredicate, OrderSpec};
