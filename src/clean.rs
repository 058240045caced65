use std::collections::HashSet;
use std::path::Path;

use csv::WriterBuilder;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::models::{CountryRecord, Dataset, Keyed, LogRecord};

/// Drop the named countries. Names that are not in the dataset are ignored.
pub(crate) fn exclude_countries<R: Keyed + Clone>(data: &Dataset<R>, names: &[&str]) -> Dataset<R> {
    let excluded: HashSet<&str> = names.iter().copied().collect();
    let absent = names.iter().filter(|n| !data.contains(n)).join(", ");
    if !absent.is_empty() {
        debug!(%absent, "names to exclude not found in dataset");
    }

    let kept: Vec<R> = data
        .rows()
        .iter()
        .filter(|r| !excluded.contains(r.country()))
        .cloned()
        .collect();

    debug!(
        requested = %names.iter().join(", "),
        removed = data.len() - kept.len(),
        remaining = kept.len(),
        "excluded countries"
    );
    Dataset::new(kept)
}

/// Append natural-log columns for HDI and BA. Both must be strictly positive.
pub(crate) fn log_transform(data: &Dataset<CountryRecord>) -> Result<Dataset<LogRecord>> {
    let rows = data
        .rows()
        .iter()
        .map(|r| {
            Ok(LogRecord {
                country: r.country.clone(),
                hdi: r.hdi,
                ba: r.ba,
                ln_hdi: checked_ln(&r.country, "HDI", r.hdi)?,
                ln_ba: checked_ln(&r.country, "BA", r.ba)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset::new(rows))
}

/// Write a working set to CSV, one header row then one row per country.
pub(crate) fn write_dataset<R: Keyed + Serialize>(data: &Dataset<R>, output_file: &Path) -> Result<()> {
    let export_error = |e: Box<dyn std::error::Error>| AnalysisError::Export {
        path: output_file.display().to_string(),
        reason: e.to_string(),
    };

    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .from_path(output_file)
        .map_err(|e| export_error(e.into()))?;

    for record in data.rows() {
        wtr.serialize(record).map_err(|e| export_error(e.into()))?;
    }

    wtr.flush().map_err(|e| export_error(e.into()))?;
    info!("Working set saved to '{}'", output_file.display());
    Ok(())
}

fn checked_ln(country: &str, column: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AnalysisError::Domain {
            country: country.to_string(),
            column,
            value,
        });
    }
    Ok(value.ln())
}
