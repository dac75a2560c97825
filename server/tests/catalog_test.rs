//! Wire contract tests for the catalog API.
//!
//! These cover the JSON shapes clients depend on; they need no database.

use charger_engine::{
    cursor, paginate, ConnectionArgs, Location, LocationDetails, Scope, SortDirection, SyncReport,
};
use serde_json::json;

fn location(id: i64) -> Location {
    let details = LocationDetails {
        title: format!("Supercharger {id}"),
        location_type: vec!["supercharger".into()],
        ..LocationDetails::new(5000 + id)
    };
    Location::new(id, details, 1_706_745_600_000)
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    #[test]
    fn test_page_serialization() {
        let scope = Scope::normalize(ConnectionArgs {
            first: Some(2),
            ..Default::default()
        })
        .unwrap();
        let page = paginate(vec![location(1), location(2), location(3)], &scope);

        let value = serde_json::to_value(&page).unwrap();

        assert_eq!(value["edges"].as_array().unwrap().len(), 2);
        assert_eq!(value["edges"][0]["cursor"], "YXJyYXljb25uZWN0aW9uOjE=");
        assert_eq!(value["edges"][1]["node"]["nid"], 5002);
        assert_eq!(value["edges"][1]["node"]["locationType"], json!(["supercharger"]));
        assert_eq!(value["pageInfo"]["hasNextPage"], true);
        assert_eq!(value["pageInfo"]["hasPreviousPage"], false);
        assert_eq!(value["pageInfo"]["startCursor"], serde_json::Value::Null);
        assert_eq!(value["pageInfo"]["endCursor"], cursor::encode(2).as_str());
    }

    #[test]
    fn test_connection_args_deserialization() {
        let json = json!({
            "last": 10,
            "before": cursor::encode(40).as_str(),
            "order": "DESC",
            "orderBy": "createdAt",
            "filter": {
                "country": ["Norway"],
                "openSoon": true,
                "boundingBox": {"nwLat": 60.0, "nwLng": 10.0, "seLat": 59.0, "seLng": 11.0}
            }
        });

        let args: ConnectionArgs = serde_json::from_value(json).unwrap();
        let scope = Scope::normalize(args).unwrap();

        assert_eq!(scope.before, Some(40));
        assert_eq!(scope.order, SortDirection::Desc);
        assert_eq!(scope.filter.country, vec!["Norway"]);
        assert_eq!(scope.filter.open_soon, Some(true));
        assert!(scope.filter.bounding_box.is_some());
    }

    #[test]
    fn test_sync_report_serialization() {
        let report = SyncReport {
            added: 3,
            updated: 1,
            unchanged: 2000,
            started_at: 1_706_745_600_000,
        };

        let value = serde_json::to_value(report).unwrap();

        assert_eq!(
            value,
            json!({
                "added": 3,
                "updated": 1,
                "unchanged": 2000,
                "startedAt": 1_706_745_600_000u64
            })
        );
    }

    #[test]
    fn test_global_id_format() {
        // base64("Location:7")
        assert_eq!(cursor::encode_global_id(7), "TG9jYXRpb246Nw==");
        assert_eq!(cursor::decode_global_id("TG9jYXRpb246Nw==").unwrap(), 7);
    }
}
