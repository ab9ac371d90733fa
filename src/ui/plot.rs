use std::io::Cursor;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::color::ChartTheme;
use crate::data::stats::Distribution;

/// Output image size in pixels.
pub const PLOT_SIZE: (u32, u32) = (1000, 600);

const FONT_FAMILY: &str = "sans-serif";
const FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

static FONT_REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

fn ensure_font() -> Result<()> {
    FONT_REGISTERED
        .get_or_init(|| {
            register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "embedded font is not a valid TrueType file".to_string())
        })
        .clone()
        .map_err(anyhow::Error::msg)
}

// ---------------------------------------------------------------------------
// Distribution plot
// ---------------------------------------------------------------------------

/// Render a histogram with its density curve overlaid, titled
/// `Distribution of <column>`, and return the PNG bytes.
pub fn distribution_png(column: &str, dist: &Distribution, theme: &ChartTheme) -> Result<Vec<u8>> {
    ensure_font()?;

    let (width, height) = PLOT_SIZE;
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, PLOT_SIZE).into_drawing_area();
        root.fill(&WHITE).context("clearing plot")?;

        let (x_lo, x_hi) = dist.histogram.range();
        let y_hi = (dist.y_max() * 1.05).max(1.0);

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Distribution of {column}"), (FONT_FAMILY, 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)
            .context("building chart axes")?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .label_style((FONT_FAMILY, 14))
            .axis_desc_style((FONT_FAMILY, 16))
            .x_desc(column)
            .y_desc("Frequency")
            .draw()
            .context("drawing axes")?;

        chart
            .draw_series(dist.histogram.bins().map(|(left, right, count)| {
                Rectangle::new([(left, 0.0), (right, count as f64)], theme.bar_fill.filled())
            }))
            .context("drawing histogram bars")?;
        chart
            .draw_series(dist.histogram.bins().map(|(left, right, count)| {
                Rectangle::new([(left, 0.0), (right, count as f64)], &theme.bar_edge)
            }))
            .context("drawing histogram edges")?;

        if let Some(curve) = &dist.density {
            chart
                .draw_series(LineSeries::new(
                    curve.iter().copied(),
                    theme.density_line.stroke_width(2),
                ))
                .context("drawing density curve")?;
        }

        root.present().context("finishing plot")?;
    }

    encode_png(buffer, width, height)
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = image::RgbImage::from_raw(width, height, buffer)
        .context("plot buffer does not match the image size")?;
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .context("encoding plot as PNG")?;
    Ok(out.into_inner())
}
