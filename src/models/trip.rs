// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trip models: the stored document, its parsed itinerary, and view models.

use super::lenient;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Trip record stored in the document store.
///
/// `trip_detail` is the serialized itinerary produced by the generation flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRecord {
    /// Document ID
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// Serialized itinerary (JSON text)
    pub trip_detail: String,
    /// Generated destination images
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    /// Creation timestamp (RFC 3339), used for ordering
    pub created_at: String,
    /// Account that generated the trip
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Parsed itinerary payload.
///
/// Every field is optional on input; fields this type does not know about
/// are carried in `extra` so a parse/serialize cycle is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TripDetail {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub estimated_price: String,
    #[serde(deserialize_with = "lenient::count")]
    pub duration: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub budget: String,
    #[serde(deserialize_with = "lenient::text")]
    pub travel_style: String,
    #[serde(deserialize_with = "lenient::text")]
    pub country: String,
    #[serde(deserialize_with = "lenient::text")]
    pub interests: String,
    #[serde(deserialize_with = "lenient::text")]
    pub group_type: String,
    #[serde(deserialize_with = "lenient::text_list")]
    pub best_time_to_visit: Vec<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub weather_info: Vec<String>,
    #[serde(deserialize_with = "lenient::optional")]
    pub location: Option<TripLocation>,
    #[serde(deserialize_with = "lenient::list")]
    pub itinerary: Vec<DayPlan>,
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Destination location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct TripLocation {
    #[serde(deserialize_with = "lenient::text")]
    pub city: String,
    /// [latitude, longitude]
    #[serde(deserialize_with = "lenient::numbers")]
    pub coordinates: Vec<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub open_street_map: String,
}

/// One day of the itinerary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct DayPlan {
    #[serde(deserialize_with = "lenient::count_or_zero")]
    pub day: u32,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::list")]
    pub activities: Vec<DayActivity>,
}

/// A scheduled activity within a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct DayActivity {
    #[serde(deserialize_with = "lenient::text")]
    pub time: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
}

/// Parse a serialized itinerary payload.
pub fn parse_trip_data(payload: &str) -> Result<TripDetail, serde_json::Error> {
    serde_json::from_str(payload)
}

/// UI-ready trip: document ID, parsed itinerary and images.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TripView {
    pub id: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub detail: TripDetail,
    pub image_urls: Vec<String>,
}

impl From<TripRecord> for TripView {
    fn from(record: TripRecord) -> Self {
        let detail = match parse_trip_data(&record.trip_detail) {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(trip_id = %record.id, error = %e, "Failed to parse trip data");
                TripDetail::default()
            }
        };

        Self {
            id: record.id,
            detail,
            image_urls: record.image_urls.unwrap_or_default(),
        }
    }
}

/// Summary card shown in trip grids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripCard {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub location: String,
    pub tags: Vec<String>,
    pub price: String,
}

impl TripView {
    pub fn card(&self) -> TripCard {
        let tags = [&self.detail.interests, &self.detail.travel_style]
            .into_iter()
            .filter(|t| !t.is_empty())
            .cloned()
            .collect();

        TripCard {
            id: self.id.clone(),
            name: self.detail.name.clone(),
            image_url: self.image_urls.first().cloned(),
            location: self
                .detail
                .itinerary
                .first()
                .map(|d| d.location.clone())
                .unwrap_or_default(),
            tags,
            price: self.detail.estimated_price.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "name": "Kyoto Temples and Tea",
        "description": "A slow week among shrines.",
        "estimatedPrice": "$1,850",
        "duration": 5,
        "budget": "Mid-range",
        "travelStyle": "Relaxed",
        "country": "Japan",
        "interests": "Culture",
        "groupType": "Couple",
        "bestTimeToVisit": ["Spring: cherry blossoms"],
        "weatherInfo": ["Spring: 10-20C"],
        "location": {"city": "Kyoto", "coordinates": [35.01, 135.76], "openStreetMap": "https://osm.org/x"},
        "itinerary": [
            {"day": 1, "location": "Gion", "activities": [{"time": "Morning", "description": "Yasaka Shrine"}]},
            {"day": 2, "location": "Arashiyama", "activities": []}
        ],
        "payment_link": "https://pay.example/abc"
    }"#;

    fn record(id: &str, payload: &str) -> TripRecord {
        TripRecord {
            id: id.to_string(),
            trip_detail: payload.to_string(),
            image_urls: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            user_id: None,
        }
    }

    #[test]
    fn test_parse_round_trip_preserves_fields() {
        let parsed = parse_trip_data(PAYLOAD).unwrap();
        assert_eq!(parsed.interests, "Culture");
        assert_eq!(parsed.travel_style, "Relaxed");
        assert_eq!(parsed.estimated_price, "$1,850");
        assert_eq!(parsed.itinerary.len(), 2);
        assert_eq!(parsed.itinerary[0].activities[0].description, "Yasaka Shrine");

        let reserialized = serde_json::to_string(&parsed).unwrap();
        let reparsed = parse_trip_data(&reserialized).unwrap();
        assert_eq!(reparsed, parsed);

        let original: serde_json::Value = serde_json::from_str(PAYLOAD).unwrap();
        let round_tripped: serde_json::Value = serde_json::from_str(&reserialized).unwrap();
        for field in ["interests", "travelStyle", "estimatedPrice", "itinerary", "payment_link"] {
            assert_eq!(round_tripped[field], original[field], "field {field} changed");
        }
    }

    #[test]
    fn test_odd_field_types_keep_the_rest() {
        let view = TripView::from(record(
            "t4",
            r#"{"name": "Kyoto", "interests": "Culture", "estimatedPrice": 1850,
                "duration": "5 days", "bestTimeToVisit": "Autumn",
                "location": {"city": "Kyoto", "coordinates": ["35.01", 135.76]},
                "itinerary": [
                    {"day": "1", "location": "Gion", "activities": [{"time": 9, "description": "Tea"}, "free time"]},
                    "rest day"
                ]}"#,
        ));

        let detail = &view.detail;
        assert_eq!(detail.name, "Kyoto");
        assert_eq!(detail.interests, "Culture");
        assert_eq!(detail.estimated_price, "1850");
        assert_eq!(detail.duration, Some(5));
        assert_eq!(detail.best_time_to_visit, vec!["Autumn"]);
        assert_eq!(detail.location.as_ref().unwrap().coordinates, vec![35.01, 135.76]);
        assert_eq!(detail.itinerary.len(), 1);
        assert_eq!(detail.itinerary[0].day, 1);
        assert_eq!(detail.itinerary[0].activities.len(), 1);
        assert_eq!(detail.itinerary[0].activities[0].time, "9");
        assert_eq!(view.card().price, "1850");
    }

    #[test]
    fn test_wrong_container_types_fall_back_per_field() {
        let detail = parse_trip_data(
            r#"{"name": "Lima", "itinerary": {"day": 1}, "location": "Peru", "duration": null}"#,
        )
        .unwrap();
        assert_eq!(detail.name, "Lima");
        assert!(detail.itinerary.is_empty());
        assert_eq!(detail.location, None);
        assert_eq!(detail.duration, None);
    }

    #[test]
    fn test_view_from_record_with_bad_payload() {
        let view = TripView::from(record("t1", "not json"));
        assert_eq!(view.id, "t1");
        assert_eq!(view.detail, TripDetail::default());
        assert!(view.image_urls.is_empty());
    }

    #[test]
    fn test_view_serializes_flat() {
        let mut rec = record("t2", PAYLOAD);
        rec.image_urls = Some(vec!["https://img.example/1.jpg".to_string()]);
        let json = serde_json::to_value(TripView::from(rec)).unwrap();

        assert_eq!(json["id"], "t2");
        assert_eq!(json["travelStyle"], "Relaxed");
        assert_eq!(json["imageUrls"][0], "https://img.example/1.jpg");
    }

    #[test]
    fn test_card_uses_first_image_and_location() {
        let mut rec = record("t3", PAYLOAD);
        rec.image_urls = Some(vec!["a.jpg".to_string(), "b.jpg".to_string()]);
        let card = TripView::from(rec).card();

        assert_eq!(card.image_url.as_deref(), Some("a.jpg"));
        assert_eq!(card.location, "Gion");
        assert_eq!(card.tags, vec!["Culture", "Relaxed"]);
        assert_eq!(card.price, "$1,850");
    }
}
