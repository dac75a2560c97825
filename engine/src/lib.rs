//! # Charger Engine
//!
//! The pagination and synchronization core of the charging location catalog.
//!
//! This crate holds the logic that keeps a persisted catalog of locations in
//! step with an upstream snapshot and serves it back as cursor-paginated pages.
//! It never touches the network or a database directly: persistence and the
//! upstream feed are reached through the [`LocationStore`] and [`RemoteSource`]
//! traits, which callers implement and hand in at construction time.
//!
//! ## Core Concepts
//!
//! ### Locations
//!
//! A [`Location`] is a persisted record with:
//! - Internal sequence ID (assigned by the store, used for ordering and cursors)
//! - External ID (`nid`, assigned upstream, used to match snapshots)
//! - Descriptive fields ([`LocationDetails`])
//! - Created / updated timestamps (milliseconds since epoch)
//!
//! ### Comparison
//!
//! [`LocationDetails::equivalent`] decides whether a persisted location differs
//! from its upstream counterpart. [`LocationDetails::diff`] lists the differing
//! fields for diagnostics.
//!
//! ### Pagination
//!
//! [`Scope::normalize`] validates [`ConnectionArgs`] into a [`Scope`], which
//! yields a [`LocationQuery`] for the store. [`paginate`] trims the returned
//! batch into a [`Page`] with relay-style page info. Boundaries are opaque
//! [`Cursor`] tokens.
//!
//! ### Synchronization
//!
//! [`Synchronizer::sync`] runs one pass: fetch the snapshot, then create,
//! update or skip each location, and report the counts.
//!
//! ## Quick Start
//!
//! ```rust
//! use charger_engine::{paginate, ConnectionArgs, LocationStore, MemoryStore, Scope};
//!
//! # tokio_test_block_on(async {
//! let store = MemoryStore::new();
//! let args = ConnectionArgs { first: Some(10), ..Default::default() };
//! let scope = Scope::normalize(args).unwrap();
//!
//! let batch = store.query(&scope.query()).await.unwrap();
//! let page = paginate(batch, &scope);
//! assert!(page.edges.is_empty());
//! assert!(!page.page_info.has_next_page);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod adapter;
pub mod clock;
pub mod compare;
pub mod cursor;
pub mod error;
pub mod filter;
pub mod memory;
pub mod page;
pub mod record;
pub mod scope;
pub mod sync;

// Re-export main types at crate root
pub use adapter::{LocationStore, NewLocation, RemoteSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use compare::FieldChange;
pub use cursor::{Cursor, Cursored};
pub use error::Error;
pub use filter::{BoundingBox, LocationFilter};
pub use memory::MemoryStore;
pub use page::{Edge, Page, PageInfo};
pub use record::{Coordinate, Email, Location, LocationDetails, Phone, RemoteLocation};
pub use scope::{
    apply_window, paginate, query_direction, ConnectionArgs, IdBound, LocationQuery, Scope,
    SortDirection, SortField, Window, Windowed, DEFAULT_LIMIT,
};
pub use sync::{classify, SyncOutcome, SyncReport, Synchronizer};

/// Type aliases for clarity
pub type LocationId = i64;
pub type ExternalId = i64;
pub type Timestamp = u64;
