//! Wire types for the touring-event catalog API.

use serde::{Deserialize, Deserializer};

/// One upcoming event as the catalog reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEvent {
    /// Local event datetime, `YYYY-MM-DDTHH:MM:SS`.
    pub datetime: String,
    pub venue: CatalogVenue,
}

/// The venue block embedded in a catalog event.
///
/// Coordinates arrive as either JSON numbers or numeric strings depending on
/// the upstream data source, and are frequently missing outright; both cases
/// deserialize to `None` rather than failing the whole event list.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogVenue {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
}

/// Accepts a number, a numeric string, or null/absent.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null(()),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
        Some(Raw::Null(())) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_from_numbers() {
        let event: CatalogEvent = serde_json::from_str(
            r#"{"datetime":"2026-09-01T20:00:00",
                "venue":{"name":"Majestic","city":"Detroit","latitude":42.3314,"longitude":-83.0458}}"#,
        )
        .expect("parse");
        assert_eq!(event.venue.latitude, Some(42.3314));
    }

    #[test]
    fn coordinates_parse_from_numeric_strings() {
        let event: CatalogEvent = serde_json::from_str(
            r#"{"datetime":"2026-09-01T20:00:00",
                "venue":{"name":"Majestic","latitude":"42.3314","longitude":"-83.0458"}}"#,
        )
        .expect("parse");
        assert_eq!(event.venue.longitude, Some(-83.0458));
    }

    #[test]
    fn missing_and_null_coordinates_become_none() {
        let event: CatalogEvent = serde_json::from_str(
            r#"{"datetime":"2026-09-01T20:00:00",
                "venue":{"name":"Majestic","latitude":null}}"#,
        )
        .expect("parse");
        assert_eq!(event.venue.latitude, None);
        assert_eq!(event.venue.longitude, None);
    }

    #[test]
    fn garbage_coordinate_strings_become_none() {
        let event: CatalogEvent = serde_json::from_str(
            r#"{"datetime":"2026-09-01T20:00:00",
                "venue":{"name":"Majestic","latitude":"unknown"}}"#,
        )
        .expect("parse");
        assert_eq!(event.venue.latitude, None);
    }
}
