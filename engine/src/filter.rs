//! Typed query filters for location listings.

use crate::LocationDetails;
use serde::{Deserialize, Serialize};

/// A geographic box given by its north-west and south-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub nw_lat: f64,
    pub nw_lng: f64,
    pub se_lat: f64,
    pub se_lng: f64,
}

impl BoundingBox {
    pub fn lat_range(&self) -> (f64, f64) {
        (self.nw_lat.min(self.se_lat), self.nw_lat.max(self.se_lat))
    }

    pub fn lng_range(&self) -> (f64, f64) {
        (self.nw_lng.min(self.se_lng), self.nw_lng.max(self.se_lng))
    }

    /// Inclusive containment; corners may be given in either order.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        let (min_lat, max_lat) = self.lat_range();
        let (min_lng, max_lng) = self.lng_range();
        (min_lat..=max_lat).contains(&lat) && (min_lng..=max_lng).contains(&lng)
    }
}

/// Filters a location listing may be narrowed by.
///
/// Empty lists and `None` mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationFilter {
    /// Keep locations whose region is one of these
    pub region: Vec<String>,
    /// Keep locations whose country is one of these
    pub country: Vec<String>,
    pub open_soon: Option<bool>,
    pub is_gallery: Option<bool>,
    /// Keep locations whose coordinate lies inside the box
    pub bounding_box: Option<BoundingBox>,
    /// Keep locations carrying at least one of these tags
    pub location_type: Vec<String>,
}

impl LocationFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `details` passes every constraint.
    pub fn matches(&self, details: &LocationDetails) -> bool {
        if !self.region.is_empty() && !self.region.contains(&details.region) {
            return false;
        }
        if !self.country.is_empty() && !self.country.contains(&details.country) {
            return false;
        }
        if self.open_soon.is_some_and(|v| v != details.open_soon) {
            return false;
        }
        if self.is_gallery.is_some_and(|v| v != details.is_gallery) {
            return false;
        }
        if let Some(bbox) = &self.bounding_box {
            if !bbox.contains(details.geo.lat, details.geo.lng) {
                return false;
            }
        }
        if !self.location_type.is_empty()
            && !details
                .location_type
                .iter()
                .any(|tag| self.location_type.contains(tag))
        {
            return false;
        }
        true
    }
}
