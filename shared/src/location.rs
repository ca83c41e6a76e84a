use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point of interest placed on a floor plan. Coordinates are percentages
/// of the floor image's intrinsic size, so markers stay put across zoom
/// levels and image resolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    #[serde(default)]
    pub floor_id: String,
    /// Percentage of image width, 0..=100. Clamped on write, defaulted on read.
    #[serde(default)]
    pub x: Option<f64>,
    /// Percentage of image height, 0..=100.
    #[serde(default)]
    pub y: Option<f64>,
    /// Nominal marker footprint in source pixels. Only used to offset
    /// click coordinates during interactive placement.
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(rename = "type", default)]
    pub kind: LocationKind,
    /// Domain status for every kind except sockets, which report through
    /// `custom_fields` instead. Kept freeform; resolution is case-insensitive.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub custom_fields: CustomFields,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub employee: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Location {
    /// X position as a percentage, substituting 0 for missing values.
    pub fn x_pct(&self) -> f64 {
        self.x.unwrap_or(0.0)
    }

    /// Y position as a percentage, substituting 0 for missing values.
    pub fn y_pct(&self) -> f64 {
        self.y.unwrap_or(0.0)
    }

    /// Move the marker. Coordinates are clamped into [0, 100] here so the
    /// stored model never carries out-of-range positions.
    pub fn place(&mut self, x: f64, y: f64) {
        self.x = Some(clamp_pct(x));
        self.y = Some(clamp_pct(y));
    }

    /// Convert a click in image pixel space into placement percentages,
    /// centering the marker footprint on the click point.
    pub fn placement_from_click(
        &self,
        image_w: f64,
        image_h: f64,
        click_x: f64,
        click_y: f64,
    ) -> (f64, f64) {
        if image_w <= 0.0 || image_h <= 0.0 {
            return (0.0, 0.0);
        }
        let px = click_x - self.width / 2.0;
        let py = click_y - self.height / 2.0;
        (
            clamp_pct(px / image_w * 100.0),
            clamp_pct(py / image_h * 100.0),
        )
    }
}

pub fn clamp_pct(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 100.0) } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationKind {
    #[default]
    Workstation,
    MeetingRoom,
    Socket,
    Equipment,
    Camera,
    Ac,
    CommonArea,
    /// Unrecognized kinds deserialize here instead of failing the record.
    #[serde(other)]
    Other,
}

/// Open vendor metadata attached to a location. Known keys get typed fields;
/// everything else lands in `extra` and stays queryable.
///
/// Network hardware reports socket link state under a `Status`/`CiscoStatus`
/// key family with inconsistent casing, so the status accessor does a
/// multi-key lookup rather than a typed field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomFields {
    #[serde(default, alias = "Port", skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Lookup order for the socket status key family. First non-empty wins.
const STATUS_KEYS: [&str; 4] = ["Status", "status", "CiscoStatus", "ciscoStatus"];

const STATUS_LAST_SYNC_KEYS: [&str; 2] = ["StatusLastSync", "statusLastSync"];

impl CustomFields {
    /// Raw link status reported by the switch, trimmed and lowercased.
    /// `None` when absent, empty, or not a string.
    pub fn link_status(&self) -> Option<String> {
        for key in STATUS_KEYS {
            if let Some(v) = self.extra.get(key).and_then(|v| v.as_str()) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_lowercase());
                }
            }
        }
        None
    }

    /// When the switch status was last polled, if the field parses.
    pub fn status_last_sync(&self) -> Option<DateTime<Utc>> {
        for key in STATUS_LAST_SYNC_KEYS {
            if let Some(v) = self.extra.get(key).and_then(|v| v.as_str())
                && let Ok(dt) = v.parse::<DateTime<Utc>>()
            {
                return Some(dt);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket_with_status(key: &str, value: serde_json::Value) -> CustomFields {
        let mut fields = CustomFields::default();
        fields.extra.insert(key.to_string(), value);
        fields
    }

    #[test]
    fn deserialize_tolerates_sparse_record() {
        let loc: Location = serde_json::from_str(r#"{"id":"a1"}"#).unwrap();
        assert_eq!(loc.id, "a1");
        assert_eq!(loc.kind, LocationKind::Workstation);
        assert_eq!(loc.x_pct(), 0.0);
        assert_eq!(loc.y_pct(), 0.0);
        assert!(loc.status.is_none());
    }

    #[test]
    fn deserialize_unknown_kind_maps_to_other() {
        let loc: Location =
            serde_json::from_str(r#"{"id":"a1","type":"printer-shrine"}"#).unwrap();
        assert_eq!(loc.kind, LocationKind::Other);
    }

    #[test]
    fn deserialize_kebab_case_kinds() {
        let loc: Location =
            serde_json::from_str(r#"{"id":"a1","type":"meeting-room"}"#).unwrap();
        assert_eq!(loc.kind, LocationKind::MeetingRoom);
        let loc: Location =
            serde_json::from_str(r#"{"id":"a2","type":"common-area"}"#).unwrap();
        assert_eq!(loc.kind, LocationKind::CommonArea);
    }

    #[test]
    fn custom_fields_port_accepts_both_casings() {
        let fields: CustomFields = serde_json::from_str(r#"{"Port":"Gi1/0/24"}"#).unwrap();
        assert_eq!(fields.port.as_deref(), Some("Gi1/0/24"));
        let fields: CustomFields = serde_json::from_str(r#"{"port":"Gi1/0/24"}"#).unwrap();
        assert_eq!(fields.port.as_deref(), Some("Gi1/0/24"));
    }

    #[test]
    fn link_status_checks_key_family_in_order() {
        let mut fields = socket_with_status("ciscoStatus", "up".into());
        assert_eq!(fields.link_status().as_deref(), Some("up"));

        // An earlier key in the family wins over a later one.
        fields
            .extra
            .insert("Status".to_string(), "notconnect".into());
        assert_eq!(fields.link_status().as_deref(), Some("notconnect"));
    }

    #[test]
    fn link_status_skips_empty_and_non_string_values() {
        let mut fields = socket_with_status("Status", "   ".into());
        fields
            .extra
            .insert("CiscoStatus".to_string(), "Connected".into());
        assert_eq!(fields.link_status().as_deref(), Some("connected"));

        let fields = socket_with_status("Status", serde_json::json!(42));
        assert_eq!(fields.link_status(), None);
    }

    #[test]
    fn link_status_normalizes_case() {
        let fields = socket_with_status("Status", "NotConnect".into());
        assert_eq!(fields.link_status().as_deref(), Some("notconnect"));
    }

    #[test]
    fn place_clamps_into_percentage_range() {
        let mut loc: Location = serde_json::from_str(r#"{"id":"a1"}"#).unwrap();
        loc.place(120.0, -4.0);
        assert_eq!((loc.x_pct(), loc.y_pct()), (100.0, 0.0));
        loc.place(f64::NAN, 55.5);
        assert_eq!((loc.x_pct(), loc.y_pct()), (0.0, 55.5));
    }

    #[test]
    fn placement_from_click_centers_footprint() {
        let mut loc: Location = serde_json::from_str(r#"{"id":"a1"}"#).unwrap();
        loc.width = 20.0;
        loc.height = 10.0;
        let (x, y) = loc.placement_from_click(1000.0, 500.0, 510.0, 255.0);
        assert_eq!((x, y), (50.0, 50.0));

        // Clicks near the edge clamp instead of escaping the image.
        let (x, y) = loc.placement_from_click(1000.0, 500.0, 2000.0, -50.0);
        assert_eq!((x, y), (100.0, 0.0));
    }

    #[test]
    fn status_last_sync_parses_rfc3339() {
        let fields = socket_with_status("StatusLastSync", "2024-03-01T12:00:00Z".into());
        let dt = fields.status_last_sync().unwrap();
        assert_eq!(dt.timestamp(), 1_709_294_400);

        let fields = socket_with_status("StatusLastSync", "not a date".into());
        assert_eq!(fields.status_last_sync(), None);
    }
}
