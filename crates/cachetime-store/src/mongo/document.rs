//! BSON shape of a stored cache time.

use bson::{Document, doc};
use cachetime_core::{CacheTime, ReleaseWindow};
use serde::{Deserialize, Serialize};

/// A cache time as stored in the collection.
///
/// Release times are stored as BSON datetimes (millisecond precision) so
/// range filters compare instants rather than strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheTimeDocument {
    #[serde(rename = "_id")]
    pub id: String,

    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<bson::DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl From<&CacheTime> for CacheTimeDocument {
    fn from(record: &CacheTime) -> Self {
        Self {
            id: record.id.clone(),
            path: record.path.clone(),
            collection_id: record.collection_id.clone(),
            release_time: record.release_time.map(bson::DateTime::from_chrono),
            etag: record.etag.clone(),
        }
    }
}

impl From<CacheTimeDocument> for CacheTime {
    fn from(document: CacheTimeDocument) -> Self {
        Self {
            id: document.id,
            path: document.path,
            collection_id: document.collection_id,
            release_time: document.release_time.map(|t| t.to_chrono()),
            etag: document.etag,
        }
    }
}

/// Selector matching one record by id.
pub fn id_filter(id: &str) -> Document {
    doc! { "_id": id }
}

/// Filter for a list request; empty when no release window applies.
pub fn release_window_filter(window: Option<ReleaseWindow>) -> Document {
    match window {
        Some(window) => doc! {
            "release_time": {
                "$gte": bson::DateTime::from_chrono(window.start()),
                "$lte": bson::DateTime::from_chrono(window.end()),
            }
        },
        None => Document::new(),
    }
}

/// Ascending id order used for deterministic pagination.
pub fn id_sort() -> Document {
    doc! { "_id": 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_round_trip_through_document() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let record = CacheTime::for_path("/a")
            .with_release_time(at)
            .with_collection_id("c")
            .with_etag("e");

        let document = CacheTimeDocument::from(&record);
        assert_eq!(document.id, record.id);

        let back = CacheTime::from(document);
        assert_eq!(back, record);
    }

    #[test]
    fn test_unset_fields_are_not_serialized() {
        let document = CacheTimeDocument::from(&CacheTime::for_path("/a"));
        let bson = bson::to_document(&document).unwrap();

        assert!(bson.contains_key("_id"));
        assert!(bson.contains_key("path"));
        assert!(!bson.contains_key("release_time"));
        assert!(!bson.contains_key("collection_id"));
    }

    #[test]
    fn test_release_window_filter() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let filter = release_window_filter(Some(ReleaseWindow::around(at)));

        let range = filter.get_document("release_time").unwrap();
        assert_eq!(
            range.get_datetime("$gte").unwrap().timestamp_millis(),
            at.timestamp_millis() - 2000
        );
        assert_eq!(
            range.get_datetime("$lte").unwrap().timestamp_millis(),
            at.timestamp_millis() + 2000
        );
    }

    #[test]
    fn test_no_window_is_empty_filter() {
        assert!(release_window_filter(None).is_empty());
    }
}
