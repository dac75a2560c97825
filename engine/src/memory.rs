//! In-memory location store.
//!
//! Holds every location in a map behind a lock and answers pagination
//! queries with the same semantics the Postgres adapter expresses in SQL.
//! Used by tests, benches and embedders that do not need durability.

use crate::adapter::{LocationStore, NewLocation};
use crate::{
    error::Result, Error, ExternalId, Location, LocationId, LocationQuery, SortDirection,
    SortField,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct Inner {
    /// Locations by internal id
    locations: BTreeMap<LocationId, Location>,
    /// Internal id by external id
    by_nid: HashMap<ExternalId, LocationId>,
    /// Last assigned internal id
    sequence: LocationId,
}

/// A store that keeps locations in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored locations.
    pub fn len(&self) -> usize {
        self.inner.read().locations.len()
    }

    /// Check if the store holds no locations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every location in id order.
    pub fn all(&self) -> Vec<Location> {
        self.inner.read().locations.values().cloned().collect()
    }

    /// Direct lookup by external id, without going through the async trait.
    pub fn get_by_nid(&self, nid: ExternalId) -> Option<Location> {
        let inner = self.inner.read();
        inner
            .by_nid
            .get(&nid)
            .and_then(|id| inner.locations.get(id))
            .cloned()
    }
}

fn compare(a: &Location, b: &Location, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Id => Ordering::Equal,
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn find_by_external_id(&self, nid: ExternalId) -> Result<Option<Location>> {
        Ok(self.get_by_nid(nid))
    }

    async fn find_by_id(&self, id: LocationId) -> Result<Option<Location>> {
        Ok(self.inner.read().locations.get(&id).cloned())
    }

    async fn insert(&self, location: NewLocation) -> Result<LocationId> {
        let mut inner = self.inner.write();
        let nid = location.details.nid;

        if inner.by_nid.contains_key(&nid) {
            return Err(Error::Store(format!(
                "duplicate key value violates unique constraint: nid={nid}"
            )));
        }

        inner.sequence += 1;
        let id = inner.sequence;
        inner.by_nid.insert(nid, id);
        inner.locations.insert(id, location.into_location(id));

        Ok(id)
    }

    async fn update(&self, location: &Location) -> Result<()> {
        let mut inner = self.inner.write();

        let existing = inner
            .locations
            .get_mut(&location.id)
            .ok_or_else(|| Error::Store(format!("no location with id {}", location.id)))?;

        if existing.nid() != location.nid() {
            return Err(Error::Store(format!(
                "location {} cannot change nid from {} to {}",
                location.id,
                existing.nid(),
                location.nid()
            )));
        }

        existing.details = location.details.clone();
        existing.updated_at = location.updated_at;
        Ok(())
    }

    async fn query(&self, query: &LocationQuery) -> Result<Vec<Location>> {
        let inner = self.inner.read();

        let mut matches: Vec<&Location> = inner
            .locations
            .values()
            .filter(|l| query.admits(l))
            .collect();

        matches.sort_by(|a, b| {
            let ord = compare(a, b, query.order_by);
            match query.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matches.into_iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IdBound, LocationDetails, LocationFilter};

    fn details(nid: ExternalId, region: &str) -> LocationDetails {
        LocationDetails {
            region: region.into(),
            title: format!("Location {nid}"),
            ..LocationDetails::new(nid)
        }
    }

    fn query() -> LocationQuery {
        LocationQuery {
            filter: LocationFilter::default(),
            order_by: SortField::Id,
            direction: SortDirection::Asc,
            bound: None,
            limit: None,
        }
    }

    async fn seeded(count: i64) -> MemoryStore {
        let store = MemoryStore::new();
        for nid in 1..=count {
            let region = if nid % 2 == 0 { "europe" } else { "north_america" };
            store
                .insert(NewLocation::new(details(100 + nid, region), nid as u64 * 10))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert(NewLocation::new(details(1, "x"), 1)).await.unwrap();
        let b = store.insert(NewLocation::new(details(2, "x"), 2)).await.unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn insert_duplicate_nid_fails() {
        let store = MemoryStore::new();
        store.insert(NewLocation::new(details(1, "x"), 1)).await.unwrap();

        let result = store.insert(NewLocation::new(details(1, "y"), 2)).await;
        assert!(matches!(result, Err(Error::Store(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn find_by_either_identifier() {
        let store = seeded(3).await;

        let by_nid = store.find_by_external_id(102).await.unwrap().unwrap();
        assert_eq!(by_nid.id, 2);

        let by_id = store.find_by_id(2).await.unwrap().unwrap();
        assert_eq!(by_id, by_nid);

        assert!(store.find_by_external_id(999).await.unwrap().is_none());
        assert!(store.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let store = seeded(1).await;
        let mut location = store.find_by_id(1).await.unwrap().unwrap();
        location.overwrite(details(101, "asia_pacific"), 500);

        store.update(&location).await.unwrap();

        let stored = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.details.region, "asia_pacific");
        assert_eq!(stored.updated_at, 500);
        assert_eq!(stored.created_at, 10);
    }

    #[tokio::test]
    async fn update_unknown_location_fails() {
        let store = MemoryStore::new();
        let location = Location::new(5, details(1, "x"), 1);
        assert!(matches!(store.update(&location).await, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn update_cannot_change_nid() {
        let store = seeded(1).await;
        let mut location = store.find_by_id(1).await.unwrap().unwrap();
        location.details.nid = 555;
        assert!(matches!(store.update(&location).await, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn query_orders_and_limits() {
        let store = seeded(5).await;

        let asc = store
            .query(&LocationQuery {
                limit: Some(2),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(asc.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2]);

        let desc = store
            .query(&LocationQuery {
                direction: SortDirection::Desc,
                limit: Some(2),
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(desc.iter().map(|l| l.id).collect::<Vec<_>>(), vec![5, 4]);
    }

    #[tokio::test]
    async fn query_applies_bound_and_filter() {
        let store = seeded(6).await;

        let result = store
            .query(&LocationQuery {
                bound: Some(IdBound::Above(2)),
                filter: LocationFilter {
                    region: vec!["europe".into()],
                    ..Default::default()
                },
                ..query()
            })
            .await
            .unwrap();

        assert_eq!(result.iter().map(|l| l.id).collect::<Vec<_>>(), vec![4, 6]);
    }

    #[tokio::test]
    async fn created_at_ordering_breaks_ties_by_id() {
        let store = MemoryStore::new();
        for nid in 1..=3 {
            store
                .insert(NewLocation::new(details(nid, "x"), 100))
                .await
                .unwrap();
        }

        let result = store
            .query(&LocationQuery {
                order_by: SortField::CreatedAt,
                direction: SortDirection::Desc,
                ..query()
            })
            .await
            .unwrap();
        assert_eq!(result.iter().map(|l| l.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}
