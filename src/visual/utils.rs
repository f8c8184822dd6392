// ============================================================================
// EASING FUNCTIONS for smooth animations
// ============================================================================

use bevy::color::Color;

/// Ease-out cubic: fast at start, decelerates at end
/// Good for "arriving" animations - emitters warm up quickly, then settle
pub fn ease_out_cubic(t: f32) -> f32 {
    let x = 1.0 - t;
    1.0 - x * x * x
}

/// Linear interpolation between `a` and `b`
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ============================================================================
// SCAN PALETTE
// ============================================================================

/// Fully saturated color at `hue` degrees
pub fn hue_color(hue: f32, lightness: f32, alpha: f32) -> Color {
    Color::hsla(hue.rem_euclid(360.0), 1.0, lightness, alpha.clamp(0.0, 1.0))
}

/// Fingerprint ring color: cyan at the core fading to blue at the rim
pub fn ring_color(ring_fraction: f32, alpha: f32) -> Color {
    let g = lerp(1.0, 150.0 / 255.0, ring_fraction);
    let a = lerp(0.8, 0.4, ring_fraction) * alpha;
    Color::srgba(0.0, g, 1.0, a.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.25) > 0.25, "ease-out runs ahead of linear");
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(10.0, 80.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 80.0, 1.0), 80.0);
        assert_eq!(lerp(0.0, 2.0, 0.5), 1.0);
    }
}
