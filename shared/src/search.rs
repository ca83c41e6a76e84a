use crate::location::Location;

/// Narrow the active location set by case-insensitive substring match
/// against name, employee and department. An empty (or whitespace-only)
/// query returns the full set unchanged; order is preserved either way.
pub fn filter_locations(locations: &[Location], query: &str) -> Vec<Location> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return locations.to_vec();
    }
    locations
        .iter()
        .filter(|loc| matches(loc, &needle))
        .cloned()
        .collect()
}

fn matches(location: &Location, needle: &str) -> bool {
    contains_ci(&location.name, needle)
        || location
            .employee
            .as_deref()
            .is_some_and(|v| contains_ci(v, needle))
        || location
            .department
            .as_deref()
            .is_some_and(|v| contains_ci(v, needle))
}

fn contains_ci(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: &str, name: &str) -> Location {
        let mut loc: Location =
            serde_json::from_str(&format!(r#"{{"id":"{id}"}}"#)).unwrap();
        loc.name = name.to_string();
        loc
    }

    #[test]
    fn substring_match_on_name() {
        let locations = vec![named("1", "Ivanov"), named("2", "Petrov")];
        let found = filter_locations(&locations, "iva");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn empty_query_returns_full_set_in_order() {
        let locations = vec![named("1", "Ivanov"), named("2", "Petrov")];
        let found = filter_locations(&locations, "");
        assert_eq!(found, locations);
        assert_eq!(filter_locations(&locations, "   "), locations);
    }

    #[test]
    fn matches_employee_and_department() {
        let mut desk = named("1", "WS-104");
        desk.employee = Some("Sidorova".to_string());
        let mut room = named("2", "Big Room");
        room.department = Some("Accounting".to_string());
        let locations = vec![desk, room];

        assert_eq!(filter_locations(&locations, "sido")[0].id, "1");
        assert_eq!(filter_locations(&locations, "ACCOUNT")[0].id, "2");
    }

    #[test]
    fn no_match_yields_empty() {
        let locations = vec![named("1", "Ivanov")];
        assert!(filter_locations(&locations, "zz").is_empty());
    }
}
