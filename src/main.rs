mod clean;
mod config;
mod eda;
mod eda_statistics;
mod error;
mod load_clean;
mod models;
mod pipeline;
mod regression;

use std::error::Error;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::clean::write_dataset;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::load_clean::load_dataset;
use crate::pipeline::{run_analysis, AnalysisReport};

fn init_tracing() {
    // stdout carries the regression summary, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn plot_error(e: Box<dyn Error>) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}

fn render_plots(report: &AnalysisReport, config: &AnalysisConfig) -> Result<()> {
    eda::create_scatter_plot(&report.full, &config.output_path("scatter_raw.png")).map_err(plot_error)?;

    eda::create_regression_plot(
        &report.logged,
        &report.log_fit,
        &format!(
            "ln(HDI) and ln(Biofarm Area(%)) with regression line in Europe, 2019 ({} countries)",
            report.logged.len()
        ),
        &config.output_path("regression_log.png"),
    )
    .map_err(plot_error)?;

    eda::create_regression_plot(
        &report.final_set,
        &report.fit,
        &format!(
            "ln(HDI) and ln(Biofarm Area(%)) with regression line in Europe, 2019 ({} countries)",
            report.final_set.len()
        ),
        &config.output_path("regression_log_final.png"),
    )
    .map_err(plot_error)?;

    Ok(())
}

fn run(config: &AnalysisConfig) -> Result<()> {
    let data = load_dataset(&config.input)?;
    let report = run_analysis(data, config)?;

    render_plots(&report, config)?;
    write_dataset(&report.final_set, &config.output_path("final_subset.csv"))?;

    println!("{}", report);
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    init_tracing();

    let config = AnalysisConfig::from_args(std::env::args().skip(1));
    info!(input = %config.input.display(), "starting analysis");

    if let Err(e) = run(&config) {
        error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}
