#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client-side query cache for the dashboard.
//!
//! A [`QueryCache`] holds one resource type keyed by [`QueryKey`] and
//! de-duplicates concurrent requests for the same key. Each widget reads
//! through a [`QuerySubscription`], which drops results belonging to a
//! key the widget has already moved away from.

pub mod cache;
pub mod key;
pub mod subscription;

pub use cache::{CachedEntry, DEFAULT_CACHE_TIME, DEFAULT_STALE_TIME, QueryCache, QueryResult};
pub use key::{QueryKey, Resource};
pub use subscription::{QueryState, QuerySubscription};
