/// Viewport manages the pan/zoom transformation from floor-image pixel
/// coordinates to screen coordinates. The rendering pipeline only reads it;
/// input handlers in the canvas component own the mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 6.0;
const ZOOM_SENSITIVITY: f64 = 0.001;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Convert image coordinates to screen coordinates.
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    /// Convert screen coordinates to image coordinates.
    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        // Adjust offset so the point under the cursor stays fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Fit the whole floor image into the canvas with a small margin.
    pub fn fit_image(&mut self, image_w: f64, image_h: f64, canvas_w: f64, canvas_h: f64) {
        if image_w <= 0.0 || image_h <= 0.0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }

        let padding = 0.04;
        let scale_x = canvas_w / (image_w * (1.0 + padding * 2.0));
        let scale_y = canvas_h / (image_h * (1.0 + padding * 2.0));
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);

        self.offset_x = canvas_w / 2.0 - image_w / 2.0 * self.scale;
        self.offset_y = canvas_h / 2.0 - image_h / 2.0 * self.scale;
    }

    /// Center the viewport on an image-space point at the current scale.
    /// Used by the find action to pan to a marker.
    pub fn center_on(&mut self, wx: f64, wy: f64, canvas_w: f64, canvas_h: f64) {
        self.offset_x = canvas_w / 2.0 - wx * self.scale;
        self.offset_y = canvas_h / 2.0 - wy * self.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_world_roundtrip() {
        let mut vp = Viewport::default();
        vp.pan(120.0, -40.0);
        vp.scale = 1.7;

        let (sx, sy) = vp.world_to_screen(300.0, 200.0);
        let (wx, wy) = vp.screen_to_world(sx, sy);
        assert!((wx - 300.0).abs() < 1e-9);
        assert!((wy - 200.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut vp = Viewport::default();
        let focus_world = vp.screen_to_world(400.0, 300.0);
        vp.zoom_at(-600.0, 400.0, 300.0);
        let after = vp.screen_to_world(400.0, 300.0);
        assert!((focus_world.0 - after.0).abs() < 1e-9);
        assert!((focus_world.1 - after.1).abs() < 1e-9);
        assert!(vp.scale > 1.0);
    }

    #[test]
    fn zoom_respects_scale_bounds() {
        let mut vp = Viewport::default();
        vp.zoom_at(1e9, 0.0, 0.0);
        assert_eq!(vp.scale, MIN_SCALE);
        vp.zoom_at(-1e9, 0.0, 0.0);
        assert_eq!(vp.scale, MAX_SCALE);
    }

    #[test]
    fn fit_image_centers_and_contains() {
        let mut vp = Viewport::default();
        vp.fit_image(2000.0, 1000.0, 800.0, 600.0);

        let (left, top) = vp.world_to_screen(0.0, 0.0);
        let (right, bottom) = vp.world_to_screen(2000.0, 1000.0);
        assert!(left >= 0.0 && top >= 0.0);
        assert!(right <= 800.0 && bottom <= 600.0);
        // Horizontally centered
        assert!((left - (800.0 - right)).abs() < 1e-6);
    }

    #[test]
    fn center_on_places_point_mid_canvas() {
        let mut vp = Viewport {
            scale: 2.0,
            ..Viewport::default()
        };
        vp.center_on(150.0, 75.0, 800.0, 600.0);
        assert_eq!(vp.world_to_screen(150.0, 75.0), (400.0, 300.0));
    }
}
