use palette::{Hsl, IntoColor, Srgb};
use plotters::style::{Color, RGBAColor, RGBColor};

// ---------------------------------------------------------------------------
// Hue generator
// ---------------------------------------------------------------------------

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> RGBColor {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    RGBColor(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// `n` evenly spaced hues in degrees, starting at `start`.
fn generate_hues(n: usize, start: f32) -> Vec<f32> {
    (0..n)
        .map(|i| (start + (i as f32 / n as f32) * 360.0) % 360.0)
        .collect()
}

// ---------------------------------------------------------------------------
// Chart theme
// ---------------------------------------------------------------------------

/// Hue used when the column position is unknown.
const DEFAULT_HUE: f32 = 210.0;

/// Colours for one distribution chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartTheme {
    pub bar_fill: RGBAColor,
    pub bar_edge: RGBColor,
    pub density_line: RGBColor,
}

impl ChartTheme {
    fn from_hue(hue: f32) -> Self {
        ChartTheme {
            bar_fill: hsl_to_rgb(hue, 0.6, 0.55).mix(0.6),
            bar_edge: hsl_to_rgb(hue, 0.6, 0.3),
            density_line: hsl_to_rgb(hue, 0.75, 0.35),
        }
    }

    /// Each column of a table gets its own hue, so switching columns is
    /// visibly a different chart.
    pub fn for_column(index: usize, column_count: usize) -> Self {
        generate_hues(column_count, DEFAULT_HUE)
            .get(index)
            .map(|&hue| Self::from_hue(hue))
            .unwrap_or_default()
    }
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::from_hue(DEFAULT_HUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_get_distinct_colours() {
        let themes: Vec<_> = (0..4).map(|i| ChartTheme::for_column(i, 4)).collect();
        for (i, a) in themes.iter().enumerate() {
            for b in &themes[i + 1..] {
                assert_ne!(a.bar_edge, b.bar_edge);
            }
        }
        assert!(generate_hues(0, DEFAULT_HUE).is_empty());
        assert_eq!(generate_hues(2, 270.0), vec![270.0, 90.0]);
    }

    #[test]
    fn first_column_uses_default_hue() {
        let first = ChartTheme::for_column(0, 3);
        let default = ChartTheme::default();
        assert_eq!(first.bar_edge, default.bar_edge);
        assert_eq!(first.density_line, default.density_line);
    }

    #[test]
    fn out_of_range_column_falls_back_to_default() {
        let theme = ChartTheme::for_column(5, 2);
        assert_eq!(theme.bar_edge, ChartTheme::default().bar_edge);
        assert_ne!(
            ChartTheme::for_column(1, 2).bar_edge,
            ChartTheme::default().bar_edge
        );
    }
}
