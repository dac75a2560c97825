//! Structural comparison between a persisted location and its upstream item.
//!
//! [`LocationDetails::equivalent`] is the predicate the sync engine relies on.
//! [`LocationDetails::diff`] exists for diagnostics only and never feeds the
//! decision.

use crate::{error::Result, Error, LocationDetails};
use serde::Serialize;

/// One field that differs between two locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: &'static str,
    pub before: String,
    pub after: String,
}

fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<unrenderable>".to_string())
}

macro_rules! diff_fields {
    ($a:expr, $b:expr, $changes:expr, [$($field:ident),* $(,)?]) => {
        $(
            if $a.$field != $b.$field {
                $changes.push(FieldChange {
                    field: stringify!($field),
                    before: render(&$a.$field),
                    after: render(&$b.$field),
                });
            }
        )*
    };
}

impl LocationDetails {
    /// Whether `self` and `remote` carry the same descriptive fields.
    ///
    /// Both sides must describe the same external identifier; comparing
    /// different locations is a caller defect and yields
    /// [`Error::ComparisonMismatch`].
    pub fn equivalent(&self, remote: &LocationDetails) -> Result<bool> {
        if self.nid != remote.nid {
            return Err(Error::ComparisonMismatch {
                persisted: self.nid,
                remote: remote.nid,
            });
        }
        Ok(self == remote)
    }

    /// List every field whose value differs, in declaration order.
    pub fn diff(&self, remote: &LocationDetails) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        diff_fields!(
            self,
            remote,
            changes,
            [
                nid,
                address,
                address_line_1,
                address_line_2,
                address_notes,
                amenities,
                baidu_geo,
                chargers,
                city,
                common_name,
                country,
                destination_charger_logo,
                destination_website,
                directions_link,
                emails,
                geocode,
                hours,
                is_gallery,
                kiosk_pin_x,
                kiosk_pin_y,
                kiosk_zoom_pin_x,
                kiosk_zoom_pin_y,
                geo,
                location_id,
                location_type,
                open_soon,
                path,
                postal_code,
                province_state,
                region,
                sales_phone,
                sales_representative,
                sub_region,
                title,
            ]
        );
        changes
    }
}
