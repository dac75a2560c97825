//! Incremental synchronization against the upstream snapshot.
//!
//! A sync pass brings the persisted catalog in step with the latest remote
//! snapshot without ever deleting anything.
//!
//! # Algorithm
//!
//! 1. Record the pass start time from the clock
//! 2. Fetch the whole remote snapshot (failure aborts before any mutation)
//! 3. For each remote item, resolve its effective coordinate, then look it
//!    up by external id
//! 4. Not found: insert with both timestamps set to now
//! 5. Found and different: overwrite every descriptive field, bump
//!    `updated_at`, persist
//! 6. Found and equal: leave untouched
//! 7. Classify each touched location by its timestamps relative to the pass
//!    start and report the counts
//!
//! The first store error aborts the rest of the batch. Mutations already
//! applied in the pass stay applied.

use crate::adapter::{LocationStore, NewLocation, RemoteSource};
use crate::{error::Result, Clock, ExternalId, Location, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// How a location was affected by a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncOutcome {
    /// First persisted during this pass
    Created,
    /// Existed before the pass and was overwritten during it
    Updated,
    /// Not touched by this pass
    Unchanged,
}

/// Classify a location relative to the start of a sync pass.
///
/// Creation at or after `started_at` wins over an update.
pub fn classify(location: &Location, started_at: Timestamp) -> SyncOutcome {
    if location.created_at >= started_at {
        SyncOutcome::Created
    } else if location.updated_at >= started_at {
        SyncOutcome::Updated
    } else {
        SyncOutcome::Unchanged
    }
}

/// Counts produced by one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Locations created during the pass
    pub added: usize,
    /// Pre-existing locations overwritten during the pass
    pub updated: usize,
    /// Remote items that matched their persisted location
    pub unchanged: usize,
    /// Clock reading when the pass started
    pub started_at: Timestamp,
}

impl SyncReport {
    fn tally(started_at: Timestamp, outcomes: &HashMap<ExternalId, SyncOutcome>) -> Self {
        let mut report = Self {
            started_at,
            ..Self::default()
        };
        for outcome in outcomes.values() {
            match outcome {
                SyncOutcome::Created => report.added += 1,
                SyncOutcome::Updated => report.updated += 1,
                SyncOutcome::Unchanged => report.unchanged += 1,
            }
        }
        report
    }

    /// Whether the pass mutated the store at all.
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.updated > 0
    }
}

/// Drives sync passes between a remote source and a location store.
///
/// Passes must not overlap; callers schedule them on a single worker.
pub struct Synchronizer<S, R, C> {
    store: S,
    source: R,
    clock: C,
}

impl<S, R, C> Synchronizer<S, R, C>
where
    S: LocationStore,
    R: RemoteSource,
    C: Clock,
{
    pub fn new(store: S, source: R, clock: C) -> Self {
        Self {
            store,
            source,
            clock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run one sync pass.
    pub async fn sync(&self) -> Result<SyncReport> {
        let started_at = self.clock.now();

        let snapshot = match self.source.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Remote fetch failed, sync pass aborted");
                return Err(e);
            }
        };
        info!(items = snapshot.len(), "Fetched remote snapshot");

        let mut outcomes: HashMap<ExternalId, SyncOutcome> = HashMap::with_capacity(snapshot.len());

        for remote in snapshot {
            let remote = remote.with_effective_geo();
            let nid = remote.nid;

            let location = match self.store.find_by_external_id(nid).await? {
                Some(mut existing) => {
                    if existing.details.equivalent(&remote)? {
                        existing
                    } else {
                        for change in existing.details.diff(&remote) {
                            debug!(
                                nid,
                                field = change.field,
                                before = %change.before,
                                after = %change.after,
                                "Field changed"
                            );
                        }
                        existing.overwrite(remote, self.clock.now());
                        self.store.update(&existing).await?;
                        debug!(nid, id = existing.id, "Updated location");
                        existing
                    }
                }
                None => {
                    let new = NewLocation::new(remote, self.clock.now());
                    let id = self.store.insert(new.clone()).await?;
                    debug!(nid, id, "Created location");
                    new.into_location(id)
                }
            };

            // A repeated nid keeps the classification of its final state
            outcomes.insert(nid, classify(&location, started_at));
        }

        let report = SyncReport::tally(started_at, &outcomes);
        info!(
            added = report.added,
            updated = report.updated,
            unchanged = report.unchanged,
            "Sync pass complete"
        );
        Ok(report)
    }
}
