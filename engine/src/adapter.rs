//! Collaborator traits the engine is driven through.
//!
//! The engine never performs IO itself. Persistence is reached through a
//! [`LocationStore`] and the upstream feed through a [`RemoteSource`]; both
//! are supplied by the caller when constructing a [`crate::Synchronizer`] or
//! serving a page.

use crate::{error::Result, ExternalId, Location, LocationDetails, LocationId, LocationQuery, Timestamp};
use async_trait::async_trait;
use std::sync::Arc;

/// A location that has not been assigned an internal identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub details: LocationDetails,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NewLocation {
    /// New location with both timestamps set to `timestamp`.
    pub fn new(details: LocationDetails, timestamp: Timestamp) -> Self {
        Self {
            details,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Attach the identifier the store assigned.
    pub fn into_location(self, id: LocationId) -> Location {
        Location {
            id,
            details: self.details,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Persistent storage for locations, keyed by internal and external id.
///
/// Implementations report every failure as [`crate::Error::Store`].
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Find the location carrying an upstream identifier.
    async fn find_by_external_id(&self, nid: ExternalId) -> Result<Option<Location>>;

    /// Find a location by internal identifier.
    async fn find_by_id(&self, id: LocationId) -> Result<Option<Location>>;

    /// Persist a new location and return its assigned identifier.
    async fn insert(&self, location: NewLocation) -> Result<LocationId>;

    /// Overwrite the descriptive fields and `updated_at` of a location.
    async fn update(&self, location: &Location) -> Result<()>;

    /// Execute a pagination query: filter, bound, order, limit.
    async fn query(&self, query: &LocationQuery) -> Result<Vec<Location>>;
}

/// The upstream feed of location snapshots.
///
/// Implementations report every failure as [`crate::Error::RemoteFetchFailed`].
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the complete current snapshot as one batch.
    async fn fetch_snapshot(&self) -> Result<Vec<LocationDetails>>;
}

#[async_trait]
impl<S: LocationStore + ?Sized> LocationStore for Arc<S> {
    async fn find_by_external_id(&self, nid: ExternalId) -> Result<Option<Location>> {
        (**self).find_by_external_id(nid).await
    }

    async fn find_by_id(&self, id: LocationId) -> Result<Option<Location>> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, location: NewLocation) -> Result<LocationId> {
        (**self).insert(location).await
    }

    async fn update(&self, location: &Location) -> Result<()> {
        (**self).update(location).await
    }

    async fn query(&self, query: &LocationQuery) -> Result<Vec<Location>> {
        (**self).query(query).await
    }
}

#[async_trait]
impl<R: RemoteSource + ?Sized> RemoteSource for Arc<R> {
    async fn fetch_snapshot(&self) -> Result<Vec<LocationDetails>> {
        (**self).fetch_snapshot().await
    }
}
