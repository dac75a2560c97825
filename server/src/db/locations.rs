//! Database operations for the locations table.

use async_trait::async_trait;
use charger_engine::{
    Coordinate, Email, Error, ExternalId, IdBound, Location, LocationDetails, LocationId,
    LocationQuery, LocationStore, NewLocation, Phone, SortField,
};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

type EngineResult<T> = std::result::Result<T, Error>;

/// Every column of the locations table, in select order.
const COLUMNS: &str = "id, nid, address, address_line_1, address_line_2, address_notes, \
     amenities, baidu_lat, baidu_lng, chargers, city, common_name, country, \
     destination_charger_logo, destination_website, directions_link, emails, geocode, hours, \
     is_gallery, kiosk_pin_x, kiosk_pin_y, kiosk_zoom_pin_x, kiosk_zoom_pin_y, lat, lng, \
     location_id, location_type, open_soon, path, postal_code, province_state, region, \
     sales_phone, sales_representative, sub_region, title, created_at, updated_at";

/// A stored location row from the database.
#[derive(Debug)]
pub struct StoredLocation(pub Location);

impl<'r> sqlx::FromRow<'r, PgRow> for StoredLocation {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let baidu_lat: Option<f64> = row.try_get("baidu_lat")?;
        let baidu_lng: Option<f64> = row.try_get("baidu_lng")?;
        let emails: Json<Vec<Email>> = row.try_get("emails")?;
        let location_type: Json<Vec<String>> = row.try_get("location_type")?;
        let sales_phone: Json<Vec<Phone>> = row.try_get("sales_phone")?;
        let created_at: i64 = row.try_get("created_at")?;
        let updated_at: i64 = row.try_get("updated_at")?;

        let details = LocationDetails {
            nid: row.try_get("nid")?,
            address: row.try_get("address")?,
            address_line_1: row.try_get("address_line_1")?,
            address_line_2: row.try_get("address_line_2")?,
            address_notes: row.try_get("address_notes")?,
            amenities: row.try_get("amenities")?,
            baidu_geo: baidu_lat.zip(baidu_lng).map(|(lat, lng)| Coordinate::new(lat, lng)),
            chargers: row.try_get("chargers")?,
            city: row.try_get("city")?,
            common_name: row.try_get("common_name")?,
            country: row.try_get("country")?,
            destination_charger_logo: row.try_get("destination_charger_logo")?,
            destination_website: row.try_get("destination_website")?,
            directions_link: row.try_get("directions_link")?,
            emails: emails.0,
            geocode: row.try_get("geocode")?,
            hours: row.try_get("hours")?,
            is_gallery: row.try_get("is_gallery")?,
            kiosk_pin_x: row.try_get("kiosk_pin_x")?,
            kiosk_pin_y: row.try_get("kiosk_pin_y")?,
            kiosk_zoom_pin_x: row.try_get("kiosk_zoom_pin_x")?,
            kiosk_zoom_pin_y: row.try_get("kiosk_zoom_pin_y")?,
            geo: Coordinate::new(row.try_get("lat")?, row.try_get("lng")?),
            location_id: row.try_get("location_id")?,
            location_type: location_type.0,
            open_soon: row.try_get("open_soon")?,
            path: row.try_get("path")?,
            postal_code: row.try_get("postal_code")?,
            province_state: row.try_get("province_state")?,
            region: row.try_get("region")?,
            sales_phone: sales_phone.0,
            sales_representative: row.try_get("sales_representative")?,
            sub_region: row.try_get("sub_region")?,
            title: row.try_get("title")?,
        };

        Ok(StoredLocation(Location {
            id: row.try_get("id")?,
            details,
            created_at: created_at as u64,
            updated_at: updated_at as u64,
        }))
    }
}

fn store_error(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

/// Bind every descriptive field as `$1..$36`, `nid` first.
fn bind_details<'q>(
    query: Query<'q, Postgres, PgArguments>,
    d: &'q LocationDetails,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(d.nid)
        .bind(&d.address)
        .bind(&d.address_line_1)
        .bind(&d.address_line_2)
        .bind(&d.address_notes)
        .bind(&d.amenities)
        .bind(d.baidu_geo.map(|c| c.lat))
        .bind(d.baidu_geo.map(|c| c.lng))
        .bind(&d.chargers)
        .bind(&d.city)
        .bind(&d.common_name)
        .bind(&d.country)
        .bind(&d.destination_charger_logo)
        .bind(&d.destination_website)
        .bind(&d.directions_link)
        .bind(Json(&d.emails))
        .bind(&d.geocode)
        .bind(&d.hours)
        .bind(d.is_gallery)
        .bind(d.kiosk_pin_x)
        .bind(d.kiosk_pin_y)
        .bind(d.kiosk_zoom_pin_x)
        .bind(d.kiosk_zoom_pin_y)
        .bind(d.geo.lat)
        .bind(d.geo.lng)
        .bind(&d.location_id)
        .bind(Json(&d.location_type))
        .bind(d.open_soon)
        .bind(&d.path)
        .bind(&d.postal_code)
        .bind(&d.province_state)
        .bind(&d.region)
        .bind(Json(&d.sales_phone))
        .bind(d.sales_representative)
        .bind(&d.sub_region)
        .bind(&d.title)
}

/// Postgres `LIMIT` is a signed BIGINT; oversized windows clamp to its max.
fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Build the SELECT for one page of a listing.
pub fn select_page(query: &LocationQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(COLUMNS).push(" FROM locations WHERE TRUE");

    let filter = &query.filter;
    if !filter.region.is_empty() {
        qb.push(" AND region = ANY(")
            .push_bind(filter.region.clone())
            .push(")");
    }
    if !filter.country.is_empty() {
        qb.push(" AND country = ANY(")
            .push_bind(filter.country.clone())
            .push(")");
    }
    if let Some(open_soon) = filter.open_soon {
        qb.push(" AND open_soon = ").push_bind(open_soon);
    }
    if let Some(is_gallery) = filter.is_gallery {
        qb.push(" AND is_gallery = ").push_bind(is_gallery);
    }
    if let Some(bbox) = &filter.bounding_box {
        let (min_lat, max_lat) = bbox.lat_range();
        let (min_lng, max_lng) = bbox.lng_range();
        qb.push(" AND lat BETWEEN ")
            .push_bind(min_lat)
            .push(" AND ")
            .push_bind(max_lat);
        qb.push(" AND lng BETWEEN ")
            .push_bind(min_lng)
            .push(" AND ")
            .push_bind(max_lng);
    }
    if !filter.location_type.is_empty() {
        qb.push(" AND location_type ?| ")
            .push_bind(filter.location_type.clone());
    }

    match query.bound {
        Some(IdBound::Above(id)) => {
            qb.push(" AND id > ").push_bind(id);
        }
        Some(IdBound::Below(id)) => {
            qb.push(" AND id < ").push_bind(id);
        }
        None => {}
    }

    let direction = query.direction.as_sql();
    qb.push(format_args!(
        " ORDER BY {} {direction}",
        query.order_by.column()
    ));
    if query.order_by != SortField::Id {
        qb.push(format_args!(", id {direction}"));
    }

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ").push_bind(sql_limit(limit));
    }

    qb
}

/// Location store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationStore for PgStore {
    async fn find_by_external_id(&self, nid: ExternalId) -> EngineResult<Option<Location>> {
        let sql = format!("SELECT {COLUMNS} FROM locations WHERE nid = $1");
        let row = sqlx::query_as::<_, StoredLocation>(&sql)
            .bind(nid)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(|r| r.0))
    }

    async fn find_by_id(&self, id: LocationId) -> EngineResult<Option<Location>> {
        let sql = format!("SELECT {COLUMNS} FROM locations WHERE id = $1");
        let row = sqlx::query_as::<_, StoredLocation>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(|r| r.0))
    }

    async fn insert(&self, location: NewLocation) -> EngineResult<LocationId> {
        let query = sqlx::query(
            r#"
            INSERT INTO locations (
                nid, address, address_line_1, address_line_2, address_notes,
                amenities, baidu_lat, baidu_lng, chargers, city,
                common_name, country, destination_charger_logo, destination_website, directions_link,
                emails, geocode, hours, is_gallery, kiosk_pin_x,
                kiosk_pin_y, kiosk_zoom_pin_x, kiosk_zoom_pin_y, lat, lng,
                location_id, location_type, open_soon, path, postal_code,
                province_state, region, sales_phone, sales_representative, sub_region,
                title, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21, $22, $23, $24, $25, $26, $27, $28, $29, $30,
                $31, $32, $33, $34, $35, $36, $37, $38
            )
            RETURNING id
            "#,
        );

        let row = bind_details(query, &location.details)
            .bind(location.created_at as i64)
            .bind(location.updated_at as i64)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;

        row.try_get("id").map_err(store_error)
    }

    async fn update(&self, location: &Location) -> EngineResult<()> {
        let query = sqlx::query(
            r#"
            UPDATE locations SET
                address = $2, address_line_1 = $3, address_line_2 = $4, address_notes = $5,
                amenities = $6, baidu_lat = $7, baidu_lng = $8, chargers = $9, city = $10,
                common_name = $11, country = $12, destination_charger_logo = $13,
                destination_website = $14, directions_link = $15, emails = $16, geocode = $17,
                hours = $18, is_gallery = $19, kiosk_pin_x = $20, kiosk_pin_y = $21,
                kiosk_zoom_pin_x = $22, kiosk_zoom_pin_y = $23, lat = $24, lng = $25,
                location_id = $26, location_type = $27, open_soon = $28, path = $29,
                postal_code = $30, province_state = $31, region = $32, sales_phone = $33,
                sales_representative = $34, sub_region = $35, title = $36, updated_at = $37
            WHERE id = $38 AND nid = $1
            "#,
        );

        let result = bind_details(query, &location.details)
            .bind(location.updated_at as i64)
            .bind(location.id)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(Error::Store(format!(
                "no location with id {} and nid {}",
                location.id,
                location.nid()
            )));
        }
        Ok(())
    }

    async fn query(&self, query: &LocationQuery) -> EngineResult<Vec<Location>> {
        let rows = select_page(query)
            .build_query_as::<StoredLocation>()
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
