use crate::location::{Location, LocationKind};

/// Display palette for marker fills. Every location resolves to exactly one
/// of these; the resolver never fails, malformed input falls through to
/// `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusColor {
    Available,
    Occupied,
    Maintenance,
    Down,
    Connected,
    Unknown,
}

impl StatusColor {
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            StatusColor::Available => (76, 175, 80),
            StatusColor::Occupied => (66, 133, 244),
            StatusColor::Maintenance => (158, 158, 158),
            StatusColor::Down => (211, 47, 47),
            StatusColor::Connected => (76, 175, 80),
            StatusColor::Unknown => (120, 116, 112),
        }
    }
}

/// Substring tokens meaning the switch port has no link. Checked before the
/// up tokens; the order below is the tie-break rule for overlapping tokens
/// ("notconnect" vs "connect") and must not be reordered.
const DOWN_TOKENS: [&str; 5] = ["notconnect", "not connected", "no", "down", "disabled"];

const UP_TOKENS: [&str; 3] = ["connect", "connected", "up"];

/// Map a location to its marker fill color.
///
/// Sockets report through vendor custom fields; everything else uses the
/// top-level status string.
pub fn resolve_color(location: &Location) -> StatusColor {
    if location.kind == LocationKind::Socket {
        socket_color(location.custom_fields.link_status().as_deref())
    } else {
        general_color(location.status.as_deref())
    }
}

/// Resolve a normalized-lowercase switch status string.
pub fn socket_color(link_status: Option<&str>) -> StatusColor {
    let Some(status) = link_status else {
        return StatusColor::Maintenance;
    };
    if status.is_empty() {
        return StatusColor::Maintenance;
    }
    if DOWN_TOKENS.iter().any(|t| status.contains(t)) {
        return StatusColor::Down;
    }
    if UP_TOKENS.iter().any(|t| status.contains(t)) {
        return StatusColor::Connected;
    }
    StatusColor::Unknown
}

/// Resolve the top-level domain status, case-insensitively.
pub fn general_color(status: Option<&str>) -> StatusColor {
    let Some(status) = status else {
        return StatusColor::Unknown;
    };
    match status.trim().to_lowercase().as_str() {
        "available" => StatusColor::Available,
        "occupied" => StatusColor::Occupied,
        "maintenance" => StatusColor::Maintenance,
        _ => StatusColor::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::CustomFields;

    fn socket(status_key: &str, value: &str) -> Location {
        let mut fields = CustomFields::default();
        fields
            .extra
            .insert(status_key.to_string(), value.into());
        let mut loc: Location = serde_json::from_str(r#"{"id":"s1","type":"socket"}"#).unwrap();
        loc.custom_fields = fields;
        loc
    }

    #[test]
    fn general_status_is_case_insensitive() {
        assert_eq!(general_color(Some("Available")), StatusColor::Available);
        assert_eq!(general_color(Some("available")), StatusColor::Available);
        assert_eq!(general_color(Some("OCCUPIED")), StatusColor::Occupied);
        assert_eq!(general_color(Some("Maintenance")), StatusColor::Maintenance);
    }

    #[test]
    fn general_status_unrecognized_or_absent_is_unknown() {
        assert_eq!(general_color(None), StatusColor::Unknown);
        assert_eq!(general_color(Some("reserved")), StatusColor::Unknown);
        assert_eq!(general_color(Some("")), StatusColor::Unknown);
    }

    #[test]
    fn non_socket_resolution_ignores_custom_fields() {
        let mut loc: Location =
            serde_json::from_str(r#"{"id":"w1","status":"Available"}"#).unwrap();
        loc.custom_fields
            .extra
            .insert("Status".to_string(), "notconnect".into());
        assert_eq!(resolve_color(&loc), StatusColor::Available);
    }

    #[test]
    fn socket_notconnect_resolves_down() {
        assert_eq!(resolve_color(&socket("Status", "notConnect")), StatusColor::Down);
    }

    #[test]
    fn socket_missing_status_resolves_maintenance() {
        let loc: Location = serde_json::from_str(r#"{"id":"s1","type":"socket"}"#).unwrap();
        assert_eq!(resolve_color(&loc), StatusColor::Maintenance);
        assert_eq!(resolve_color(&socket("Status", "  ")), StatusColor::Maintenance);
    }

    #[test]
    fn socket_down_tokens_win_over_up_tokens() {
        // "notconnect" contains "connect"; the down check runs first.
        assert_eq!(socket_color(Some("notconnect")), StatusColor::Down);
        assert_eq!(socket_color(Some("disabled")), StatusColor::Down);
        assert_eq!(socket_color(Some("link down")), StatusColor::Down);
    }

    #[test]
    fn socket_up_tokens_resolve_connected() {
        assert_eq!(socket_color(Some("connected")), StatusColor::Connected);
        assert_eq!(socket_color(Some("up")), StatusColor::Connected);
        assert_eq!(
            resolve_color(&socket("CiscoStatus", "Connected")),
            StatusColor::Connected
        );
    }

    #[test]
    fn socket_unmatched_status_resolves_unknown() {
        assert_eq!(socket_color(Some("err-flapping")), StatusColor::Unknown);
    }

    #[test]
    fn palette_is_fixed() {
        assert_eq!(StatusColor::Down.rgb(), (211, 47, 47));
        assert_eq!(StatusColor::Available.rgb(), StatusColor::Connected.rgb());
    }
}
