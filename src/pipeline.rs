use std::fmt;

use tracing::{debug, info};

use crate::clean::{exclude_countries, log_transform};
use crate::config::AnalysisConfig;
use crate::eda_statistics::{correlate, describe_column, Correlation, Summary};
use crate::error::Result;
use crate::models::{Column, CountryRecord, Dataset, LogRecord};
use crate::regression::{check_regressor, fit_ols, OlsFit};

/// HDI implied by the intercept of the log-log model, i.e. for a country
/// with 1% organic farming area, with its back-transformed interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BaselineHdi {
    pub(crate) estimate: f64,
    pub(crate) lower: f64,
    pub(crate) upper: f64,
}

impl BaselineHdi {
    fn from_fit(fit: &OlsFit) -> Self {
        BaselineHdi {
            estimate: fit.intercept.estimate.exp(),
            lower: fit.intercept.ci_lower.exp(),
            upper: fit.intercept.ci_upper.exp(),
        }
    }
}

/// Every intermediate result of one analysis run.
#[derive(Debug, Clone)]
pub(crate) struct AnalysisReport {
    pub(crate) full: Dataset<CountryRecord>,
    pub(crate) hdi_summary: Summary,
    pub(crate) ba_summary: Summary,
    pub(crate) reduced: Dataset<CountryRecord>,
    pub(crate) raw_correlation: Correlation,
    pub(crate) logged: Dataset<LogRecord>,
    pub(crate) log_correlation: Correlation,
    pub(crate) log_fit: OlsFit,
    pub(crate) final_set: Dataset<LogRecord>,
    pub(crate) final_correlation: Correlation,
    pub(crate) fit: OlsFit,
    pub(crate) baseline_hdi: BaselineHdi,
}

pub(crate) fn run_analysis(full: Dataset<CountryRecord>, config: &AnalysisConfig) -> Result<AnalysisReport> {
    info!(countries = full.len(), "describing full dataset");
    let hdi_summary = describe_column(&full, Column::Hdi)?;
    let ba_summary = describe_column(&full, Column::BioArea)?;
    debug!(%hdi_summary, %ba_summary);

    let reduced = exclude_countries(&full, &config.first_exclusions);
    // the same rows feed every later regression
    check_regressor(Column::BioArea.name(), &reduced.column(Column::BioArea)?)?;
    let raw_correlation = correlate(&reduced, Column::Hdi, Column::BioArea)?;
    info!(countries = reduced.len(), r = raw_correlation.r, "correlation after first exclusion");

    let logged = log_transform(&reduced)?;
    let log_fit = fit_log_model(&logged, config)?;
    let log_correlation = correlate(&logged, Column::LnHdi, Column::LnBioArea)?;
    info!(
        r = log_correlation.r,
        r_squared = log_correlation.r_squared,
        "log-log correlation"
    );

    let final_set = exclude_countries(&logged, &config.second_exclusions);
    debug!(countries = ?final_set.countries(), "final working set");
    let fit = fit_log_model(&final_set, config)?;
    let final_correlation = correlate(&final_set, Column::LnHdi, Column::LnBioArea)?;
    info!(
        countries = final_set.len(),
        r = final_correlation.r,
        r_squared = final_correlation.r_squared,
        "log-log correlation after second exclusion"
    );

    let baseline_hdi = BaselineHdi::from_fit(&fit);
    info!(
        intercept = fit.intercept.estimate,
        slope = fit.slope.estimate,
        f_pvalue = fit.f_pvalue,
        "fitted final model"
    );

    Ok(AnalysisReport {
        full,
        hdi_summary,
        ba_summary,
        reduced,
        raw_correlation,
        logged,
        log_correlation,
        log_fit,
        final_set,
        final_correlation,
        fit,
        baseline_hdi,
    })
}

// ln(HDI) ~ const + ln(BA)
fn fit_log_model(data: &Dataset<LogRecord>, config: &AnalysisConfig) -> Result<OlsFit> {
    fit_ols(
        Column::LnHdi.name(),
        &data.column(Column::LnHdi)?,
        Column::LnBioArea.name(),
        &data.column(Column::LnBioArea)?,
        config.confidence_level,
    )
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Descriptive statistics ({} countries):", self.full.len())?;
        writeln!(f, "  {}", self.hdi_summary)?;
        writeln!(f, "  {}", self.ba_summary)?;
        writeln!(f)?;
        writeln!(
            f,
            "HDI vs BA, {} countries:            r = {:.3}",
            self.reduced.len(),
            self.raw_correlation.r
        )?;
        writeln!(
            f,
            "ln(HDI) vs ln(BA), {} countries:    r = {:.3}  R^2 = {:.3}",
            self.logged.len(),
            self.log_correlation.r,
            self.log_correlation.r_squared
        )?;
        writeln!(
            f,
            "ln(HDI) vs ln(BA), {} countries:    r = {:.3}  R^2 = {:.3}",
            self.final_set.len(),
            self.final_correlation.r,
            self.final_correlation.r_squared
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.fit)?;
        writeln!(f)?;
        writeln!(
            f,
            "Baseline HDI (BA = 1%) exp(const) = {:.3}, {:.0}% interval [{:.3}, {:.3}]",
            self.baseline_hdi.estimate,
            self.fit.confidence_level * 100.0,
            self.baseline_hdi.lower,
            self.baseline_hdi.upper
        )?;
        write!(
            f,
            "A 1% increase in organic farming area goes with a {:.4}% change in HDI",
            self.fit.slope.estimate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn dataset(rows: &[(&str, f64, f64)]) -> Dataset<CountryRecord> {
        Dataset::new(
            rows.iter()
                .map(|&(country, hdi, ba)| CountryRecord {
                    country: country.to_string(),
                    hdi,
                    ba,
                })
                .collect(),
        )
    }

    fn europe_like() -> Dataset<CountryRecord> {
        dataset(&[
            ("Austria", 0.922, 26.1),
            ("Belgium", 0.931, 6.9),
            ("Bulgaria", 0.816, 2.3),
            ("Croatia", 0.851, 7.2),
            ("Denmark", 0.940, 10.9),
            ("Estonia", 0.892, 22.3),
            ("Finland", 0.938, 13.5),
            ("France", 0.901, 8.1),
            ("Iceland", 0.949, 0.4),
            ("Luxembourg", 0.916, 4.4),
            ("Malta", 0.895, 0.5),
            ("Netherlands", 0.944, 3.2),
            ("Norway", 0.957, 4.6),
            ("Poland", 0.880, 3.5),
            ("Romania", 0.828, 2.9),
            ("Sweden", 0.945, 20.3),
        ])
    }

    #[test]
    fn test_three_country_scenario() {
        let data = dataset(&[("A", 0.9, 10.0), ("B", 0.8, 5.0), ("C", 0.95, 20.0)]);

        let report = run_analysis(data, &AnalysisConfig::default()).unwrap();

        assert!((report.hdi_summary.mean - 0.8833).abs() < 1e-4);
        assert_eq!(report.reduced.len(), 3);
        assert_eq!(report.final_set.len(), 3);
        assert!(report.log_correlation.r.is_finite());
        assert_eq!(report.log_correlation.r_squared, report.log_correlation.r * report.log_correlation.r);
        assert_eq!(report.fit.n_obs, 3);
    }

    #[test]
    fn test_excluding_absent_name_keeps_rows() {
        let data = dataset(&[("A", 0.9, 10.0), ("B", 0.8, 5.0), ("C", 0.95, 20.0)]);
        let config = AnalysisConfig {
            first_exclusions: vec!["Z"],
            second_exclusions: vec![],
            ..AnalysisConfig::default()
        };

        let report = run_analysis(data, &config).unwrap();

        assert_eq!(report.reduced.countries(), vec!["A", "B", "C"]);
        assert_eq!(report.final_set.len(), 3);
    }

    #[test]
    fn test_exclusion_rounds_shrink_working_sets() {
        let report = run_analysis(europe_like(), &AnalysisConfig::default()).unwrap();

        assert_eq!(report.full.len(), 16);
        assert_eq!(report.reduced.len(), 13);
        assert_eq!(report.final_set.len(), 11);
        for name in ["Iceland", "Luxembourg", "Malta", "Netherlands", "Norway"] {
            assert!(!report.final_set.contains(name));
        }
        assert!(report.reduced.contains("Norway"));
    }

    #[test]
    fn test_final_model_matches_final_correlation() {
        let report = run_analysis(europe_like(), &AnalysisConfig::default()).unwrap();

        assert!(report.fit.slope.estimate > 0.0);
        assert!((report.fit.r_squared - report.final_correlation.r_squared).abs() < 1e-10);
        assert!((report.log_fit.r_squared - report.log_correlation.r_squared).abs() < 1e-10);
        assert!(report.baseline_hdi.lower <= report.baseline_hdi.estimate);
        assert!(report.baseline_hdi.estimate <= report.baseline_hdi.upper);
        assert!((report.baseline_hdi.estimate.ln() - report.fit.intercept.estimate).abs() < 1e-12);
    }

    #[test]
    fn test_report_mentions_every_stage() {
        let report = run_analysis(europe_like(), &AnalysisConfig::default()).unwrap();

        let text = report.to_string();

        assert!(text.contains("Descriptive statistics (16 countries)"));
        assert!(text.contains("13 countries"));
        assert!(text.contains("11 countries"));
        assert!(text.contains("OLS Regression Results"));
        assert!(text.contains("Baseline HDI (BA = 1%)"));
    }

    #[test]
    fn test_too_few_rows_left_for_regression() {
        let data = dataset(&[("A", 0.9, 10.0), ("B", 0.8, 5.0), ("Norway", 0.95, 20.0)]);
        let config = AnalysisConfig {
            second_exclusions: vec!["Norway", "B"],
            ..AnalysisConfig::default()
        };

        let err = run_analysis(data, &config).unwrap_err();

        assert!(matches!(err, AnalysisError::DegenerateRegression { .. }));
    }

    #[test]
    fn test_constant_area_is_degenerate() {
        let data = dataset(&[("A", 0.9, 10.0), ("B", 0.8, 10.0), ("C", 0.95, 10.0)]);

        let err = run_analysis(data, &AnalysisConfig::default()).unwrap_err();

        match err {
            AnalysisError::DegenerateRegression { reason } => assert!(reason.contains("BA")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_constant_hdi_has_no_correlation() {
        let data = dataset(&[("A", 0.9, 10.0), ("B", 0.9, 5.0), ("C", 0.9, 20.0)]);

        let err = run_analysis(data, &AnalysisConfig::default()).unwrap_err();

        assert!(matches!(err, AnalysisError::UndefinedCorrelation { x: "HDI", y: "BA" }));
    }

    #[test]
    fn test_slope_reads_as_elasticity() {
        // ln(HDI) = ln(0.8) + 0.0331 ln(BA), exactly
        let rows: Vec<(String, f64, f64)> = [2.0f64, 5.0, 10.0, 20.0, 30.0]
            .iter()
            .enumerate()
            .map(|(i, &ba)| (format!("C{}", i), (0.8f64.ln() + 0.0331 * ba.ln()).exp(), ba))
            .collect();
        let data = Dataset::new(
            rows.into_iter()
                .map(|(country, hdi, ba)| CountryRecord { country, hdi, ba })
                .collect(),
        );

        let report = run_analysis(data, &AnalysisConfig::default()).unwrap();
        let text = report.to_string();

        assert!((report.fit.slope.estimate - 0.0331).abs() < 1e-10);
        assert!(text.contains("A 1% increase in organic farming area goes with a 0.0331% change in HDI"));
        assert!(text.contains("Baseline HDI (BA = 1%) exp(const) = 0.800"));
    }

    #[test]
    fn test_non_positive_area_is_rejected() {
        let data = dataset(&[("A", 0.9, 10.0), ("B", 0.8, 0.0), ("C", 0.95, 20.0)]);

        let err = run_analysis(data, &AnalysisConfig::default()).unwrap_err();

        assert!(matches!(err, AnalysisError::Domain { column: "BA", .. }));
    }
}
