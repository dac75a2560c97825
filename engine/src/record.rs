//! Location records: the persisted entity and its upstream counterpart.

use crate::{ExternalId, LocationId, Timestamp};
use serde::{Deserialize, Serialize};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are exactly zero, which upstream sends for "unknown".
    pub fn is_zero(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }
}

/// A labelled phone contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub label: String,
    pub number: String,
}

/// A labelled email contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub label: String,
    pub email: String,
}

/// The descriptive fields of a location, as published upstream.
///
/// Equality is structural: optional fields must both be absent or both be
/// present and equal, lists compare element-wise in order, and coordinates
/// compare by exact value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetails {
    /// External identifier assigned upstream
    pub nid: ExternalId,
    pub address: String,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub address_notes: Option<String>,
    pub amenities: Option<String>,
    /// Alternate coordinate published for some regions
    pub baidu_geo: Option<Coordinate>,
    pub chargers: Option<String>,
    pub city: String,
    pub common_name: String,
    pub country: String,
    pub destination_charger_logo: Option<String>,
    pub destination_website: Option<String>,
    pub directions_link: Option<String>,
    pub emails: Vec<Email>,
    pub geocode: String,
    pub hours: Option<String>,
    pub is_gallery: bool,
    pub kiosk_pin_x: Option<i64>,
    pub kiosk_pin_y: Option<i64>,
    pub kiosk_zoom_pin_x: Option<i64>,
    pub kiosk_zoom_pin_y: Option<i64>,
    /// Primary coordinate
    pub geo: Coordinate,
    pub location_id: String,
    pub location_type: Vec<String>,
    pub open_soon: bool,
    pub path: String,
    pub postal_code: Option<String>,
    pub province_state: Option<String>,
    pub region: String,
    pub sales_phone: Vec<Phone>,
    pub sales_representative: bool,
    pub sub_region: Option<String>,
    pub title: String,
}

/// An upstream snapshot item. Never persisted directly.
pub type RemoteLocation = LocationDetails;

impl LocationDetails {
    /// Create details carrying only the external identifier.
    pub fn new(nid: ExternalId) -> Self {
        Self {
            nid,
            ..Default::default()
        }
    }

    /// The coordinate to store for this location.
    ///
    /// When the primary coordinate is exactly zero on both axes and an
    /// alternate coordinate is present, the alternate one is used.
    pub fn effective_geo(&self) -> Coordinate {
        match self.baidu_geo {
            Some(alternate) if self.geo.is_zero() => alternate,
            _ => self.geo,
        }
    }

    /// Return these details with `geo` replaced by [`Self::effective_geo`].
    pub fn with_effective_geo(mut self) -> Self {
        self.geo = self.effective_geo();
        self
    }
}

/// A persisted location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Internal sequence identifier assigned by the store
    pub id: LocationId,
    /// Descriptive fields
    #[serde(flatten)]
    pub details: LocationDetails,
    /// When the location was first created (milliseconds since epoch)
    pub created_at: Timestamp,
    /// When the location was last updated (milliseconds since epoch)
    pub updated_at: Timestamp,
}

impl Location {
    /// Create a location with both timestamps set to `timestamp`.
    pub fn new(id: LocationId, details: LocationDetails, timestamp: Timestamp) -> Self {
        Self {
            id,
            details,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// External identifier shortcut.
    pub fn nid(&self) -> ExternalId {
        self.details.nid
    }

    /// Replace every descriptive field and bump `updated_at`.
    ///
    /// `updated_at` never drops below `created_at`.
    pub fn overwrite(&mut self, details: LocationDetails, timestamp: Timestamp) {
        self.details = details;
        self.updated_at = timestamp.max(self.created_at);
    }
}
