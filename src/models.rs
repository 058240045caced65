use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Numeric columns the analysis reads from a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    Hdi,
    BioArea,
    LnHdi,
    LnBioArea,
}

impl Column {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Column::Hdi => "HDI",
            Column::BioArea => "BA",
            Column::LnHdi => "LNHDI",
            Column::LnBioArea => "LNBA",
        }
    }
}

/// A row that is identified by its country name.
pub(crate) trait Keyed {
    fn country(&self) -> &str;

    /// Value of a numeric column, `None` if the row does not carry it.
    fn value(&self, column: Column) -> Option<f64>;
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct CountryRecord {
    #[serde(rename = "Country")]
    pub(crate) country: String,
    #[serde(rename = "HDI")]
    pub(crate) hdi: f64,
    // share of agricultural area under organic farming, in percent
    #[serde(rename = "BA")]
    pub(crate) ba: f64,
}

impl Keyed for CountryRecord {
    fn country(&self) -> &str {
        &self.country
    }

    fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Hdi => Some(self.hdi),
            Column::BioArea => Some(self.ba),
            Column::LnHdi | Column::LnBioArea => None,
        }
    }
}

/// A country row with the log columns appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct LogRecord {
    #[serde(rename = "Country")]
    pub(crate) country: String,
    #[serde(rename = "HDI")]
    pub(crate) hdi: f64,
    #[serde(rename = "BA")]
    pub(crate) ba: f64,
    #[serde(rename = "LNHDI")]
    pub(crate) ln_hdi: f64,
    #[serde(rename = "LNBA")]
    pub(crate) ln_ba: f64,
}

impl Keyed for LogRecord {
    fn country(&self) -> &str {
        &self.country
    }

    fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Hdi => Some(self.hdi),
            Column::BioArea => Some(self.ba),
            Column::LnHdi => Some(self.ln_hdi),
            Column::LnBioArea => Some(self.ln_ba),
        }
    }
}

/// Read-only, ordered set of rows. Filters build new datasets.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Dataset<R> {
    rows: Vec<R>,
}

impl<R: Keyed> Dataset<R> {
    pub(crate) fn new(rows: Vec<R>) -> Self {
        Dataset { rows }
    }

    pub(crate) fn rows(&self) -> &[R] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn countries(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.country()).collect()
    }

    pub(crate) fn contains(&self, country: &str) -> bool {
        self.rows.iter().any(|r| r.country() == country)
    }

    /// Values of one numeric column, in row order.
    pub(crate) fn column(&self, column: Column) -> Result<Vec<f64>> {
        self.rows
            .iter()
            .map(|r| {
                r.value(column).ok_or(AnalysisError::MissingColumn {
                    column: column.name(),
                })
            })
            .collect()
    }
}
