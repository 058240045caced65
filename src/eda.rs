use std::error::Error;
use std::ops::Range;
use std::path::Path;

use itertools::{Itertools, MinMaxResult};
use ordered_float::NotNan;
use plotters::prelude::*;
use tracing::info;

use crate::models::{CountryRecord, Dataset, LogRecord};
use crate::regression::OlsFit;

const TEAL: RGBColor = RGBColor(0, 128, 128);

// Finite span of the values, padded by a fraction of its width on both sides
pub(crate) fn axis_range(values: impl IntoIterator<Item = f64>, pad: f64) -> Range<f64> {
    let (lo, hi) = match values
        .into_iter()
        .filter_map(|v| NotNan::new(v).ok())
        .filter(|v| v.is_finite())
        .minmax()
    {
        MinMaxResult::NoElements => return 0.0..1.0,
        MinMaxResult::OneElement(v) => (v.into_inner(), v.into_inner()),
        MinMaxResult::MinMax(lo, hi) => (lo.into_inner(), hi.into_inner()),
    };
    let span = if hi > lo { hi - lo } else { lo.abs().max(1.0) };
    (lo - span * pad)..(hi + span * pad)
}

/// Raw BA vs HDI, one labelled point per country.
pub(crate) fn create_scatter_plot(data: &Dataset<CountryRecord>, output_file: &Path) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(output_file, (1500, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("HDI and Biofarm Area(%) in Europe, 2019", ("sans-serif", 30))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            axis_range(data.rows().iter().map(|r| r.ba), 0.05),
            axis_range(data.rows().iter().map(|r| r.hdi), 0.05),
        )?;

    chart.configure_mesh()
        .x_desc("Biofarm Area(%)")
        .y_desc("HDI")
        .draw()?;

    let count = data.len().max(1);
    for (i, record) in data.rows().iter().enumerate() {
        let color = Palette99::pick(i * 99 / count).to_rgba();
        chart.draw_series(std::iter::once(Circle::new((record.ba, record.hdi), 5, color.filled())))?;
        chart.draw_series(std::iter::once(Text::new(
            record.country.clone(),
            (record.ba, record.hdi),
            ("sans-serif", 12).into_font(),
        )))?;
    }

    root.present()?;
    info!("Scatter plot saved to {}", output_file.display());
    Ok(())
}

/// ln(BA) vs ln(HDI) with the fitted regression line, no confidence band.
pub(crate) fn create_regression_plot(
    data: &Dataset<LogRecord>,
    fit: &OlsFit,
    title: &str,
    output_file: &Path,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(output_file, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = axis_range(data.rows().iter().map(|r| r.ln_ba), 0.05);
    let line_ends = [x_range.start, x_range.end];
    let y_range = axis_range(
        data.rows()
            .iter()
            .map(|r| r.ln_hdi)
            .chain(line_ends.iter().map(|&x| fit.predict(x))),
        0.05,
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh()
        .x_desc("ln(Biofarm Area(%))")
        .y_desc("ln(HDI)")
        .draw()?;

    chart.draw_series(
        data.rows()
            .iter()
            .map(|r| Circle::new((r.ln_ba, r.ln_hdi), 8, TEAL.mix(0.8).filled())),
    )?;

    chart.draw_series(LineSeries::new(
        line_ends.iter().map(|&x| (x, fit.predict(x))),
        TEAL.stroke_width(2),
    ))?
        .label(format!(
            "ln(HDI) = {:.4} + {:.4} ln(BA)",
            fit.intercept.estimate, fit.slope.estimate
        ))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TEAL));

    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!("Regression plot saved to {}", output_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range_pads_span() {
        let range = axis_range(vec![1.0, 3.0, 2.0], 0.1);

        assert!((range.start - 0.8).abs() < 1e-12);
        assert!((range.end - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_axis_range_skips_non_finite() {
        let range = axis_range(vec![f64::NAN, 2.0, f64::INFINITY, 4.0], 0.0);

        assert_eq!(range, 2.0..4.0);
    }

    #[test]
    fn test_axis_range_degenerate_inputs() {
        assert_eq!(axis_range(Vec::new(), 0.1), 0.0..1.0);

        let single = axis_range(vec![5.0], 0.5);
        assert!(single.start < 5.0 && single.end > 5.0);
    }
}
