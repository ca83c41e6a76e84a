use std::collections::HashSet;

use floormap_shared::{resolve_color, Location, LocationKind};

use crate::cluster::RenderItem;
use crate::colors::brighten;

pub const MARKER_RADIUS: f64 = 15.0;
/// Highlighted and found markers grow so they read at a glance.
pub const ACTIVE_MARKER_RADIUS: f64 = 18.0;
/// The secondary ring sits this far outside the marker edge.
pub const RING_EXTRA: f64 = 8.0;
pub const MARKER_STROKE_WIDTH: f64 = 2.0;
pub const CLUSTER_RADIUS: f64 = 22.0;

/// Alert fill for highlighted/found markers; the ring uses a lighter tone.
pub const HIGHLIGHT_FILL: (u8, u8, u8) = (255, 82, 82);
pub const CLUSTER_FILL: (u8, u8, u8) = (59, 112, 202);

const HIGHLIGHT_RING_FACTOR: f64 = 1.35;

/// One circle to draw, in image pixel space. Radii stay in image space so
/// the canvas transform scales them with the floor plan.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPaint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub fill: (u8, u8, u8),
    /// Lighter alert ring for highlighted/found markers, `None` otherwise.
    pub ring: Option<(u8, u8, u8)>,
    /// Short port/name label for socket markers.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPaint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOp {
    Marker(MarkerPaint),
    Cluster(ClusterPaint),
}

/// Compute the per-pass paint plan from the clustered item list. Pure; the
/// canvas component just replays the ops under the current transform.
pub fn plan(
    items: &[RenderItem],
    image_w: f64,
    image_h: f64,
    highlighted: &HashSet<String>,
    found: Option<&str>,
) -> Vec<PaintOp> {
    items
        .iter()
        .map(|item| match item {
            RenderItem::Marker(loc) => PaintOp::Marker(plan_marker(
                loc,
                image_w,
                image_h,
                highlighted.contains(&loc.id) || found == Some(loc.id.as_str()),
            )),
            RenderItem::Cluster(c) => PaintOp::Cluster(ClusterPaint {
                id: c.id.clone(),
                x: image_w * c.x / 100.0,
                y: image_h * c.y / 100.0,
                radius: CLUSTER_RADIUS,
                count: c.count,
            }),
        })
        .collect()
}

fn plan_marker(loc: &Location, image_w: f64, image_h: f64, active: bool) -> MarkerPaint {
    let (radius, fill, ring) = if active {
        let (r, g, b) = HIGHLIGHT_FILL;
        (
            ACTIVE_MARKER_RADIUS,
            HIGHLIGHT_FILL,
            Some(brighten(r, g, b, HIGHLIGHT_RING_FACTOR)),
        )
    } else {
        (MARKER_RADIUS, resolve_color(loc).rgb(), None)
    };
    MarkerPaint {
        id: loc.id.clone(),
        x: image_w * loc.x_pct() / 100.0,
        y: image_h * loc.y_pct() / 100.0,
        radius,
        fill,
        ring,
        label: (loc.kind == LocationKind::Socket).then(|| socket_label(loc)),
    }
}

/// Socket markers carry a short text label: the trailing numeric segment of
/// the port identifier, or the first four characters of the name when no
/// port pattern matches.
pub fn socket_label(loc: &Location) -> String {
    loc.custom_fields
        .port
        .as_deref()
        .and_then(port_number)
        .unwrap_or_else(|| loc.name.chars().take(4).collect())
}

/// Extract the numeric run that starts the text after the last `/`
/// ("Gi1/0/24" -> "24").
fn port_number(port: &str) -> Option<String> {
    let tail = port.rsplit('/').next().unwrap_or(port);
    let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Topmost paint op containing the given image-space point, for click
/// handling. Ops are painted in order, so the last hit wins.
pub fn hit_test(ops: &[PaintOp], wx: f64, wy: f64) -> Option<&PaintOp> {
    ops.iter().rev().find(|op| {
        let (x, y, r) = match op {
            PaintOp::Marker(m) => (m.x, m.y, m.radius),
            PaintOp::Cluster(c) => (c.x, c.y, c.radius),
        };
        (wx - x) * (wx - x) + (wy - y) * (wy - y) <= r * r
    })
}
