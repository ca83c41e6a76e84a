/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Format opaque RGB as a CSS color string.
pub fn rgb_css(r: u8, g: u8, b: u8) -> String {
    format!("rgb({r},{g},{b})")
}

/// Brighten a color by a factor (1.0 = no change, >1.0 = brighter).
/// Used for the lighter alert tone of highlight rings.
pub fn brighten(r: u8, g: u8, b: u8, factor: f64) -> (u8, u8, u8) {
    (
        ((r as f64 * factor).min(255.0)) as u8,
        ((g as f64 * factor).min(255.0)) as u8,
        ((b as f64 * factor).min(255.0)) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_formatting() {
        assert_eq!(rgba_css(255, 0, 10, 0.5), "rgba(255,0,10,0.5)");
        assert_eq!(rgb_css(12, 34, 56), "rgb(12,34,56)");
    }

    #[test]
    fn brighten_saturates_at_255() {
        assert_eq!(brighten(200, 100, 0, 1.5), (255, 150, 0));
        assert_eq!(brighten(10, 10, 10, 1.0), (10, 10, 10));
    }
}
