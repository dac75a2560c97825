//! Upstream wire format.
//!
//! The upstream encodes most numbers as strings, booleans as `"1"`/`"0"`,
//! and sends `null` or `""` where a list is empty. Everything is normalized
//! on the way in.

use super::SourceError;
use charger_engine::{Coordinate, Email, LocationDetails, Phone};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

/// One location exactly as the upstream publishes it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    #[serde(deserialize_with = "number")]
    pub nid: i64,
    #[serde(deserialize_with = "text")]
    pub address: String,
    #[serde(deserialize_with = "optional_text")]
    pub address_line_1: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub address_line_2: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub address_notes: Option<String>,
    /// Misspelled upstream
    #[serde(rename = "amentities", alias = "amenities", deserialize_with = "optional_text")]
    pub amenities: Option<String>,
    #[serde(deserialize_with = "optional_coordinate")]
    pub baidu_lat: Option<f64>,
    #[serde(deserialize_with = "optional_coordinate")]
    pub baidu_lng: Option<f64>,
    #[serde(deserialize_with = "optional_text")]
    pub chargers: Option<String>,
    #[serde(deserialize_with = "text")]
    pub city: String,
    #[serde(deserialize_with = "text")]
    pub common_name: String,
    #[serde(deserialize_with = "text")]
    pub country: String,
    #[serde(deserialize_with = "optional_text")]
    pub destination_charger_logo: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub destination_website: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub directions_link: Option<String>,
    #[serde(deserialize_with = "list")]
    pub emails: Vec<Email>,
    #[serde(deserialize_with = "text")]
    pub geocode: String,
    #[serde(deserialize_with = "optional_text")]
    pub hours: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub is_gallery: bool,
    #[serde(deserialize_with = "optional_number")]
    pub kiosk_pin_x: Option<i64>,
    #[serde(deserialize_with = "optional_number")]
    pub kiosk_pin_y: Option<i64>,
    #[serde(deserialize_with = "optional_number")]
    pub kiosk_zoom_pin_x: Option<i64>,
    #[serde(deserialize_with = "optional_number")]
    pub kiosk_zoom_pin_y: Option<i64>,
    #[serde(deserialize_with = "coordinate")]
    pub latitude: f64,
    #[serde(deserialize_with = "coordinate")]
    pub longitude: f64,
    #[serde(deserialize_with = "text")]
    pub location_id: String,
    #[serde(deserialize_with = "list")]
    pub location_type: Vec<String>,
    #[serde(deserialize_with = "flag")]
    pub open_soon: bool,
    #[serde(deserialize_with = "text")]
    pub path: String,
    #[serde(deserialize_with = "optional_text")]
    pub postal_code: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub province_state: Option<String>,
    #[serde(deserialize_with = "text")]
    pub region: String,
    #[serde(deserialize_with = "list")]
    pub sales_phone: Vec<Phone>,
    #[serde(deserialize_with = "flag")]
    pub sales_representative: bool,
    #[serde(deserialize_with = "optional_text")]
    pub sub_region: Option<String>,
    #[serde(deserialize_with = "text")]
    pub title: String,
}

impl From<RawLocation> for LocationDetails {
    fn from(raw: RawLocation) -> Self {
        LocationDetails {
            nid: raw.nid,
            address: raw.address,
            address_line_1: raw.address_line_1,
            address_line_2: raw.address_line_2,
            address_notes: raw.address_notes,
            amenities: raw.amenities,
            baidu_geo: raw
                .baidu_lat
                .zip(raw.baidu_lng)
                .map(|(lat, lng)| Coordinate::new(lat, lng)),
            chargers: raw.chargers,
            city: raw.city,
            common_name: raw.common_name,
            country: raw.country,
            destination_charger_logo: raw.destination_charger_logo,
            destination_website: raw.destination_website,
            directions_link: raw.directions_link,
            emails: raw.emails,
            geocode: raw.geocode,
            hours: raw.hours,
            is_gallery: raw.is_gallery,
            kiosk_pin_x: raw.kiosk_pin_x,
            kiosk_pin_y: raw.kiosk_pin_y,
            kiosk_zoom_pin_x: raw.kiosk_zoom_pin_x,
            kiosk_zoom_pin_y: raw.kiosk_zoom_pin_y,
            geo: Coordinate::new(raw.latitude, raw.longitude),
            location_id: raw.location_id,
            location_type: raw.location_type,
            open_soon: raw.open_soon,
            path: raw.path,
            postal_code: raw.postal_code,
            province_state: raw.province_state,
            region: raw.region,
            sales_phone: raw.sales_phone,
            sales_representative: raw.sales_representative,
            sub_region: raw.sub_region,
            title: raw.title,
        }
    }
}

/// Decode the extracted JSON array into location details.
pub fn parse_snapshot(payload: &str) -> Result<Vec<LocationDetails>, SourceError> {
    let raw: Vec<RawLocation> = serde_json::from_str(payload)?;
    Ok(raw.into_iter().map(LocationDetails::from).collect())
}

fn parse_scalar<T, E>(value: Value) -> Result<T, E>
where
    T: FromStr,
    T::Err: Display,
    E: de::Error,
{
    match value {
        Value::String(s) => s.trim().parse().map_err(E::custom),
        Value::Number(n) => n.to_string().parse().map_err(E::custom),
        other => Err(E::custom(format!("expected a number, got {other}"))),
    }
}

fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    parse_scalar(Value::deserialize(deserializer)?)
}

fn optional_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        other => parse_scalar(other).map(Some),
    }
}

fn finite<E: de::Error>(value: f64) -> Result<f64, E> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(E::custom(format!("coordinate is not finite: {value}")))
    }
}

fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    number::<D, f64>(deserializer).and_then(finite)
}

fn optional_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_number::<D, f64>(deserializer)?.map(finite).transpose()
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        Value::String(s) => match s.as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid boolean: {other}"))),
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(true),
            Some(0) => Ok(false),
            _ => Err(de::Error::custom(format!("invalid boolean: {n}"))),
        },
        other => Err(de::Error::custom(format!("invalid boolean: {other}"))),
    }
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        other => serde_json::from_value(other).map_err(de::Error::custom),
    }
}
