pub mod location;
pub mod search;
pub mod status;

pub use location::{clamp_pct, CustomFields, Location, LocationKind};
pub use search::filter_locations;
pub use status::{general_color, resolve_color, socket_color, StatusColor};
