use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Magnitude colour buckets
// ---------------------------------------------------------------------------

/// Upper bound (exclusive) of each bucket, paired with its colour.
/// Anything at or above the last bound is red.
const MAGNITUDE_BUCKETS: [(f64, Color32); 5] = [
    (3.0, Color32::from_rgb(0, 0, 255)),
    (4.0, Color32::from_rgb(0, 128, 0)),
    (4.5, Color32::from_rgb(255, 255, 0)),
    (5.0, Color32::from_rgb(255, 215, 0)),
    (5.5, Color32::from_rgb(255, 165, 0)),
];

const MAGNITUDE_MAX_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

/// Marker / bar colour for a magnitude. `NaN` is grey.
pub fn magnitude_color(magnitude: f64) -> Color32 {
    if magnitude.is_nan() {
        return Color32::GRAY;
    }
    MAGNITUDE_BUCKETS
        .iter()
        .find(|(bound, _)| magnitude < *bound)
        .map(|(_, c)| *c)
        .unwrap_or(MAGNITUDE_MAX_COLOR)
}

/// Legend entries (label → colour) for the side panel.
pub fn magnitude_legend() -> Vec<(String, Color32)> {
    let mut entries = Vec::with_capacity(MAGNITUDE_BUCKETS.len() + 1);
    let mut lower: Option<f64> = None;
    for (bound, color) in MAGNITUDE_BUCKETS {
        let label = match lower {
            None => format!("< {bound}"),
            Some(lo) => format!("{lo} – {bound}"),
        };
        entries.push((label, color));
        lower = Some(bound);
    }
    if let Some(lo) = lower {
        entries.push((format!("≥ {lo}"), MAGNITUDE_MAX_COLOR));
    }
    entries
}

// ---------------------------------------------------------------------------
// Depth shading
// ---------------------------------------------------------------------------

/// Grey that darkens with depth; `fraction` is depth over the deepest event shown.
pub fn depth_shade(fraction: f64) -> Color32 {
    let t = if fraction.is_finite() { fraction.clamp(0.0, 1.0) as f32 } else { 0.0 };
    let hsl = Hsl::new(210.0, 0.15, 0.85 - 0.45 * t);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(magnitude_color(2.99), Color32::from_rgb(0, 0, 255));
        assert_eq!(magnitude_color(3.0), Color32::from_rgb(0, 128, 0));
        assert_eq!(magnitude_color(4.4), Color32::from_rgb(255, 255, 0));
        assert_eq!(magnitude_color(4.5), Color32::from_rgb(255, 215, 0));
        assert_eq!(magnitude_color(5.2), Color32::from_rgb(255, 165, 0));
        assert_eq!(magnitude_color(5.5), MAGNITUDE_MAX_COLOR);
        assert_eq!(magnitude_color(9.1), MAGNITUDE_MAX_COLOR);
        assert_eq!(magnitude_color(f64::NAN), Color32::GRAY);
    }

    #[test]
    fn test_legend_covers_every_bucket() {
        let legend = magnitude_legend();
        assert_eq!(legend.len(), 6);
        assert_eq!(legend[0].0, "< 3");
        assert_eq!(legend[5], ("≥ 5.5".to_string(), MAGNITUDE_MAX_COLOR));
    }

    #[test]
    fn test_depth_shade_darkens() {
        let shallow = depth_shade(0.0);
        let deep = depth_shade(1.0);
        assert!(deep.r() < shallow.r());
        assert_eq!(depth_shade(f64::NAN), shallow);
        assert_eq!(depth_shade(5.0), deep);
    }
}
