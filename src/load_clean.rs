use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::models::{CountryRecord, Dataset};

const REQUIRED_COLUMNS: [&str; 3] = ["Country", "HDI", "BA"];

// Load the country table
pub(crate) fn load_dataset(path: &Path) -> Result<Dataset<CountryRecord>> {
    let load_error = |reason: String| AnalysisError::DatasetLoad {
        path: path.display().to_string(),
        reason,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| load_error(e.to_string()))?;

    let headers = rdr.headers().map_err(|e| load_error(e.to_string()))?.clone();
    debug!(?headers, "read header row");
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(load_error(format!("missing required column '{}'", column)));
        }
    }

    let mut records: Vec<CountryRecord> = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        // header is line 1
        let record: CountryRecord =
            result.map_err(|e| load_error(format!("row {}: {}", line + 2, e)))?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(load_error("file has no data rows".to_string()));
    }

    info!(rows = records.len(), path = %path.display(), "loaded dataset");
    Ok(Dataset::new(records))
}
