//! Location query routes.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use charger_engine::{LocationId, Page};

use crate::error::Result;
use crate::handlers::{handle_get, handle_list, handle_node, LocationNode, LocationsQuery};
use crate::AppState;

/// Create location routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/locations", get(list_handler))
        .route("/locations/{id}", get(get_handler))
        .route("/node/{id}", get(node_handler))
}

/// GET /locations - One page of locations.
async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<Page<LocationNode>>> {
    let page = handle_list(state.store.as_ref(), query).await?;
    Ok(Json(page))
}

/// GET /locations/{id} - One location by internal id.
async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<LocationId>,
) -> Result<Json<LocationNode>> {
    let node = handle_get(state.store.as_ref(), id).await?;
    Ok(Json(node))
}

/// GET /node/{id} - One location by global node id.
async fn node_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LocationNode>> {
    let node = handle_node(state.store.as_ref(), &id).await?;
    Ok(Json(node))
}
