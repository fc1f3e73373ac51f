use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Series palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0 + 210.0;
            to_color32(Hsl::new(hue, 0.75, 0.55).into_color())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Heatmap shading for confusion-matrix cells
// ---------------------------------------------------------------------------

/// Shade for a cell holding `value` out of a matrix maximum of `max`.
///
/// Diagonal cells (correct predictions) ramp towards green, off-diagonal
/// cells towards red.
pub fn heat_color(value: u64, max: u64, diagonal: bool) -> Color32 {
    let fraction = if max == 0 {
        0.0
    } else {
        (value as f32 / max as f32).clamp(0.0, 1.0)
    };
    let base: Hsl = Srgb::new(0.18_f32, 0.18, 0.2).into_color();
    let hot = if diagonal {
        Hsl::new(130.0, 0.6, 0.4)
    } else {
        Hsl::new(0.0, 0.7, 0.45)
    };
    to_color32(base.mix(hot, fraction).into_color())
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}
