use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::detection::{Detection, DetectionError};

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub trace: RGBColor,
    pub spike: RGBColor,
    pub violation: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 400,
            background: RGBColor(10, 10, 10),
            trace: BLUE,
            spike: RGBColor(255, 165, 0),
            violation: RED,
        }
    }
}

/// Draws the trace with a cross on every spike and a circle on the violation sample.
pub fn render_spikes_png(
    trace: &[f64],
    detection: &Detection,
    title: &str,
    style: PlotStyle,
) -> Result<Vec<u8>, DetectionError> {
    if trace.is_empty() {
        return Err(DetectionError::Plot("trace has no samples".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let y_min = trace.iter().copied().fold(0.0f64, f64::min);
        let y_max = trace.iter().copied().fold(0.0f64, f64::max);
        let y_bounds = if (y_max - y_min).abs() < f64::EPSILON {
            (-50.0, 50.0)
        } else {
            let pad = (y_max - y_min) * 0.05;
            (y_min - pad, y_max + pad)
        };
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(title, ("sans-serif", 20).into_font().color(&WHITE))
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(0f64..trace.len() as f64, y_bounds.0..y_bounds.1)?;
        let (trace_color, spike_color, violation_color) =
            (style.trace, style.spike, style.violation);
        chart
            .configure_mesh()
            .light_line_style(&WHITE.mix(0.1))
            .x_desc("sample")
            .y_desc("pA")
            .label_style(("sans-serif", 12).into_font().color(&WHITE))
            .draw()?;
        let series = trace.iter().enumerate().map(|(i, v)| (i as f64, *v));
        chart
            .draw_series(LineSeries::new(series, &trace_color))?
            .label("trace")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &trace_color));
        let spikes: Vec<(f64, f64)> = detection
            .spikes
            .iter()
            .flatten()
            .filter_map(|&i| trace.get(i).map(|&v| (i as f64, v)))
            .collect();
        chart
            .draw_series(
                spikes
                    .iter()
                    .map(|&point| Cross::new(point, 5, spike_color.stroke_width(2))),
            )?
            .label("spikes")
            .legend(move |(x, y)| Cross::new((x + 10, y), 5, spike_color.stroke_width(2)));
        let violation = detection
            .violation
            .and_then(|i| trace.get(i).map(|&v| (i as f64, v)));
        if let Some(point) = violation {
            chart
                .draw_series(std::iter::once(Circle::new(
                    point,
                    6,
                    violation_color.stroke_width(2),
                )))?
                .label("violation")
                .legend(move |(x, y)| Circle::new((x + 10, y), 5, violation_color.stroke_width(2)));
        }
        chart
            .configure_series_labels()
            .border_style(&WHITE.mix(0.2))
            .background_style(&style.background)
            .label_font(("sans-serif", 12).into_font().color(&WHITE))
            .draw()?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DetectionError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| DetectionError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
