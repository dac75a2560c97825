//! Location listing and lookup handlers.

use crate::error::{AppError, Result};
use charger_engine::{
    cursor, paginate, BoundingBox, ConnectionArgs, Cursor, Location, LocationDetails,
    LocationFilter, LocationId, LocationStore, Page, Scope, SortDirection, SortField, Timestamp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Query parameters for a location listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsQuery {
    pub first: Option<usize>,
    pub last: Option<usize>,
    pub after: Option<String>,
    pub before: Option<String>,
    /// `ASC` or `DESC`
    pub order: Option<String>,
    /// `id` or `createdAt`
    pub order_by: Option<String>,
    /// Return every matching location in one page
    pub all: Option<bool>,
    /// Comma separated
    pub region: Option<String>,
    /// Comma separated
    pub country: Option<String>,
    pub open_soon: Option<bool>,
    pub is_gallery: Option<bool>,
    /// `nwLat,nwLng,seLat,seLng`
    pub bounding_box: Option<String>,
    /// Comma separated location type tags
    #[serde(rename = "type")]
    pub location_type: Option<String>,
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_bounding_box(value: &str) -> Result<BoundingBox> {
    let corners = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| AppError::BadRequest(format!("boundingBox is not numeric: {value}")))?;

    match corners.as_slice() {
        [nw_lat, nw_lng, se_lat, se_lng] => Ok(BoundingBox {
            nw_lat: *nw_lat,
            nw_lng: *nw_lng,
            se_lat: *se_lat,
            se_lng: *se_lng,
        }),
        _ => Err(AppError::BadRequest(
            "boundingBox needs exactly 4 values: nwLat,nwLng,seLat,seLng".to_string(),
        )),
    }
}

impl LocationsQuery {
    /// Convert raw parameters into engine connection arguments.
    pub fn into_args(self) -> Result<ConnectionArgs> {
        let order = self
            .order
            .as_deref()
            .map(str::parse::<SortDirection>)
            .transpose()
            .map_err(AppError::BadRequest)?;
        let order_by = self
            .order_by
            .as_deref()
            .map(str::parse::<SortField>)
            .transpose()
            .map_err(AppError::BadRequest)?;
        let bounding_box = self
            .bounding_box
            .as_deref()
            .map(parse_bounding_box)
            .transpose()?;

        Ok(ConnectionArgs {
            first: self.first,
            last: self.last,
            after: self.after.map(Cursor::from_token),
            before: self.before.map(Cursor::from_token),
            order,
            order_by,
            all: self.all.unwrap_or(false),
            filter: LocationFilter {
                region: split_list(self.region),
                country: split_list(self.country),
                open_soon: self.open_soon,
                is_gallery: self.is_gallery,
                bounding_box,
                location_type: split_list(self.location_type),
            },
        })
    }
}

/// A location as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNode {
    /// Global node identifier
    pub id: String,
    /// Internal identifier
    pub database_id: LocationId,
    #[serde(flatten)]
    pub details: LocationDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_datetime(millis: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis as i64).unwrap_or_default()
}

impl From<Location> for LocationNode {
    fn from(location: Location) -> Self {
        Self {
            id: cursor::encode_global_id(location.id),
            database_id: location.id,
            details: location.details,
            created_at: to_datetime(location.created_at),
            updated_at: to_datetime(location.updated_at),
        }
    }
}

/// Serve one page of locations.
pub async fn handle_list(
    store: &dyn LocationStore,
    query: LocationsQuery,
) -> Result<Page<LocationNode>> {
    let scope = Scope::normalize(query.into_args()?)?;

    let batch = store.query(&scope.query()).await?;
    let page = paginate(batch, &scope);

    tracing::debug!(
        edges = page.len(),
        has_next = page.page_info.has_next_page,
        has_previous = page.page_info.has_previous_page,
        "Served location page"
    );

    Ok(page.map(LocationNode::from))
}

/// Fetch one location by internal identifier.
pub async fn handle_get(store: &dyn LocationStore, id: LocationId) -> Result<LocationNode> {
    store
        .find_by_id(id)
        .await?
        .map(LocationNode::from)
        .ok_or_else(|| AppError::NotFound(format!("Location {id} not found")))
}

/// Fetch one location by global node identifier.
pub async fn handle_node(store: &dyn LocationStore, global_id: &str) -> Result<LocationNode> {
    let id = cursor::decode_global_id(global_id)?;
    handle_get(store, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use charger_engine::{Error, MemoryStore, NewLocation};

    async fn seeded(count: i64) -> MemoryStore {
        let store = MemoryStore::new();
        for nid in 1..=count {
            let details = LocationDetails {
                country: if nid % 2 == 0 { "Norway" } else { "Sweden" }.into(),
                ..LocationDetails::new(nid)
            };
            store
                .insert(NewLocation::new(details, 1_700_000_000_000 + nid as u64))
                .await
                .unwrap();
        }
        store
    }

    #[test]
    fn query_parameters_become_connection_args() {
        let query = LocationsQuery {
            first: Some(10),
            order: Some("desc".into()),
            order_by: Some("createdAt".into()),
            region: Some("europe, asia_pacific".into()),
            bounding_box: Some("60,10,59,11".into()),
            location_type: Some("supercharger".into()),
            ..Default::default()
        };

        let args = query.into_args().unwrap();

        assert_eq!(args.first, Some(10));
        assert_eq!(args.order, Some(SortDirection::Desc));
        assert_eq!(args.order_by, Some(SortField::CreatedAt));
        assert_eq!(args.filter.region, vec!["europe", "asia_pacific"]);
        assert_eq!(args.filter.location_type, vec!["supercharger"]);
        assert_eq!(
            args.filter.bounding_box,
            Some(BoundingBox {
                nw_lat: 60.0,
                nw_lng: 10.0,
                se_lat: 59.0,
                se_lng: 11.0
            })
        );
        assert!(!args.all);
    }

    #[test]
    fn bad_bounding_box_is_rejected() {
        for raw in ["1,2,3", "a,b,c,d", "1,2,3,4,5"] {
            let query = LocationsQuery {
                bounding_box: Some(raw.into()),
                ..Default::default()
            };
            assert!(matches!(query.into_args(), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn unknown_order_is_rejected() {
        let query = LocationsQuery {
            order: Some("sideways".into()),
            ..Default::default()
        };
        assert!(matches!(query.into_args(), Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn list_pages_through_store() {
        let store = seeded(5).await;

        let page = handle_list(
            &store,
            LocationsQuery {
                first: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(page.len(), 2);
        assert!(page.page_info.has_next_page);
        assert_eq!(page.edges[0].node.database_id, 1);
        assert_eq!(page.edges[0].node.id, cursor::encode_global_id(1));

        let next = handle_list(
            &store,
            LocationsQuery {
                first: Some(2),
                after: page.page_info.end_cursor.map(|c| c.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let ids: Vec<_> = next.nodes().map(|n| n.database_id).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn list_accepts_largest_first() {
        let store = seeded(3).await;

        let page = handle_list(
            &store,
            LocationsQuery {
                first: Some(usize::MAX),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(page.len(), 3);
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let store = seeded(6).await;

        let page = handle_list(
            &store,
            LocationsQuery {
                country: Some("Norway".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let ids: Vec<_> = page.nodes().map(|n| n.database_id).collect();
        assert_eq!(ids, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn list_rejects_conflicting_cursors() {
        let store = seeded(1).await;
        let result = handle_list(
            &store,
            LocationsQuery {
                after: Some(cursor::encode(1).to_string()),
                before: Some(cursor::encode(1).to_string()),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(AppError::Engine(Error::ConflictingCursors))
        ));
    }

    #[tokio::test]
    async fn get_and_node_lookup() {
        let store = seeded(3).await;

        let node = handle_get(&store, 2).await.unwrap();
        assert_eq!(node.details.nid, 2);
        assert_eq!(node.created_at.timestamp_millis(), 1_700_000_000_002);

        let by_global = handle_node(&store, &node.id).await.unwrap();
        assert_eq!(by_global, node);

        assert!(matches!(
            handle_get(&store, 99).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            handle_node(&store, "%%%").await,
            Err(AppError::Engine(Error::MalformedCursor(_)))
        ));
    }
}
