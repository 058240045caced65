//! Ordinary least squares with one regressor and an intercept
//!
//! Closed-form fit plus the inference and residual diagnostics of a
//! conventional OLS summary table.

use std::fmt;

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

use crate::error::{AnalysisError, Result};

/// One estimated parameter with its inference statistics.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Coefficient {
    pub(crate) name: String,
    pub(crate) estimate: f64,
    pub(crate) std_error: f64,
    pub(crate) t_value: f64,
    /// Two-sided p-value for H0: coefficient = 0
    pub(crate) p_value: f64,
    pub(crate) ci_lower: f64,
    pub(crate) ci_upper: f64,
}

/// Jarque-Bera normality test on the residuals.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JarqueBera {
    pub(crate) statistic: f64,
    /// p-value from chi-squared with 2 degrees of freedom
    pub(crate) p_value: f64,
    pub(crate) skewness: f64,
    /// Plain kurtosis, 3.0 for a normal distribution
    pub(crate) kurtosis: f64,
}

/// A fitted simple linear model `y = intercept + slope * x`.
///
/// With exactly two observations the line interpolates both points: the
/// residual standard error is zero and every statistic that needs residual
/// degrees of freedom is NaN.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OlsFit {
    pub(crate) y_name: String,
    pub(crate) n_obs: usize,
    pub(crate) df_model: usize,
    pub(crate) df_resid: usize,
    pub(crate) confidence_level: f64,
    pub(crate) intercept: Coefficient,
    pub(crate) slope: Coefficient,
    pub(crate) r_squared: f64,
    pub(crate) adj_r_squared: f64,
    pub(crate) residual_std_error: f64,
    pub(crate) f_statistic: f64,
    pub(crate) f_pvalue: f64,
    pub(crate) log_likelihood: f64,
    pub(crate) aic: f64,
    pub(crate) bic: f64,
    pub(crate) durbin_watson: f64,
    pub(crate) jarque_bera: Option<JarqueBera>,
}

impl OlsFit {
    pub(crate) fn predict(&self, x: f64) -> f64 {
        self.intercept.estimate + self.slope.estimate * x
    }
}

fn distribution_error(e: impl fmt::Display) -> AnalysisError {
    AnalysisError::Distribution(e.to_string())
}

fn degenerate(reason: impl Into<String>) -> AnalysisError {
    AnalysisError::DegenerateRegression {
        reason: reason.into(),
    }
}

/// Fail with `DegenerateRegression` unless `x` has at least two finite
/// values that are not all equal.
pub(crate) fn check_regressor(x_name: &str, x: &[f64]) -> Result<()> {
    let finite: Vec<f64> = x.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return Err(degenerate(format!(
            "{} valid observation(s), need at least 2",
            finite.len()
        )));
    }
    if finite.iter().all(|&v| v == finite[0]) {
        return Err(degenerate(format!("{} has zero variance", x_name)));
    }
    Ok(())
}

/// Fit an OLS regression of `y` on `x` with an intercept
///
/// # Arguments
/// * `y`, `x` - paired observations; pairs with a non-finite value are dropped
/// * `confidence_level` - level of the coefficient intervals, e.g. 0.95
///
/// # Errors
/// `DegenerateRegression` when fewer than two valid pairs remain or `x` is
/// constant, `LengthMismatch` when the inputs differ in length.
pub(crate) fn fit_ols(
    y_name: &str,
    y: &[f64],
    x_name: &str,
    x: &[f64],
    confidence_level: f64,
) -> Result<OlsFit> {
    if y.len() != x.len() {
        return Err(AnalysisError::LengthMismatch {
            y_len: y.len(),
            x_len: x.len(),
        });
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(distribution_error(format!(
            "confidence level {} is outside (0, 1)",
            confidence_level
        )));
    }

    let (x, y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(&xi, &yi)| (xi, yi))
        .unzip();

    check_regressor(x_name, &x)?;

    let n = x.len();
    let n_f = n as f64;
    let x_mean = x.iter().sum::<f64>() / n_f;
    let y_mean = y.iter().sum::<f64>() / n_f;
    let sxx: f64 = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum();
    let sxy: f64 = x.iter().zip(&y).map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean)).sum();
    let sst: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let fitted: Vec<f64> = x.iter().map(|&xi| intercept + slope * xi).collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(&yi, &fi)| yi - fi).collect();
    let ssr: f64 = residuals.iter().map(|e| e * e).sum();

    let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { f64::NAN };
    let df_model = 1;
    let df_resid = n - 2;

    let (intercept_coef, slope_coef, residual_std_error, adj_r_squared, f_statistic, f_pvalue) =
        if df_resid > 0 {
            let df = df_resid as f64;
            let sigma2 = ssr / df;
            let se_slope = (sigma2 / sxx).sqrt();
            let se_intercept = (sigma2 * (1.0 / n_f + x_mean * x_mean / sxx)).sqrt();

            let t_dist = StudentsT::new(0.0, 1.0, df).map_err(distribution_error)?;
            let t_crit = t_dist.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0);
            let coefficient = |name: &str, estimate: f64, std_error: f64| {
                let t_value = estimate / std_error;
                Coefficient {
                    name: name.to_string(),
                    estimate,
                    std_error,
                    t_value,
                    p_value: 2.0 * t_dist.sf(t_value.abs()),
                    ci_lower: estimate - t_crit * std_error,
                    ci_upper: estimate + t_crit * std_error,
                }
            };

            let f_statistic = (sst - ssr) / df_model as f64 / sigma2;
            let f_dist = FisherSnedecor::new(df_model as f64, df).map_err(distribution_error)?;

            (
                coefficient("const", intercept, se_intercept),
                coefficient(x_name, slope, se_slope),
                sigma2.sqrt(),
                1.0 - (1.0 - r_squared) * (n_f - 1.0) / df,
                f_statistic,
                f_dist.sf(f_statistic),
            )
        } else {
            let undefined = |name: &str, estimate: f64| Coefficient {
                name: name.to_string(),
                estimate,
                std_error: f64::NAN,
                t_value: f64::NAN,
                p_value: f64::NAN,
                ci_lower: f64::NAN,
                ci_upper: f64::NAN,
            };
            (
                undefined("const", intercept),
                undefined(x_name, slope),
                0.0,
                f64::NAN,
                f64::NAN,
                f64::NAN,
            )
        };

    // Gaussian log-likelihood at the ML variance ssr / n
    let log_likelihood =
        -n_f / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (ssr / n_f).ln() + 1.0);
    let k = (df_model + 1) as f64;

    Ok(OlsFit {
        y_name: y_name.to_string(),
        n_obs: n,
        df_model,
        df_resid,
        confidence_level,
        intercept: intercept_coef,
        slope: slope_coef,
        r_squared,
        adj_r_squared,
        residual_std_error,
        f_statistic,
        f_pvalue,
        log_likelihood,
        aic: -2.0 * log_likelihood + 2.0 * k,
        bic: -2.0 * log_likelihood + k * n_f.ln(),
        durbin_watson: durbin_watson(&residuals),
        jarque_bera: jarque_bera(&residuals)?,
    })
}

fn durbin_watson(residuals: &[f64]) -> f64 {
    let ssr: f64 = residuals.iter().map(|e| e * e).sum();
    let diffs: f64 = residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    diffs / ssr
}

/// `None` when there are fewer than 3 residuals or they have no spread.
fn jarque_bera(residuals: &[f64]) -> Result<Option<JarqueBera>> {
    let n = residuals.len();
    if n < 3 {
        return Ok(None);
    }

    let n_f = n as f64;
    let mean = residuals.iter().sum::<f64>() / n_f;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &e in residuals {
        let d = e - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    m2 /= n_f;
    m3 /= n_f;
    m4 /= n_f;

    if m2 <= 0.0 {
        return Ok(None);
    }

    let skewness = m3 / m2.powf(1.5);
    let kurtosis = m4 / (m2 * m2);
    let statistic = n_f / 6.0 * (skewness * skewness + (kurtosis - 3.0).powi(2) / 4.0);
    let chi2 = ChiSquared::new(2.0).map_err(distribution_error)?;

    Ok(Some(JarqueBera {
        statistic,
        p_value: chi2.sf(statistic),
        skewness,
        kurtosis,
    }))
}

impl fmt::Display for OlsFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(78);
        let thin = "-".repeat(78);
        let lower = (1.0 - self.confidence_level) / 2.0;
        let upper = 1.0 - lower;

        writeln!(f, "{:^78}", "OLS Regression Results")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "{:<18}{:>20}   {:<20}{:>17.3}", "Dep. Variable:", self.y_name, "R-squared:", self.r_squared)?;
        writeln!(f, "{:<18}{:>20}   {:<20}{:>17.3}", "Model:", "OLS", "Adj. R-squared:", self.adj_r_squared)?;
        writeln!(f, "{:<18}{:>20}   {:<20}{:>17.3}", "Method:", "Least Squares", "F-statistic:", self.f_statistic)?;
        writeln!(f, "{:<18}{:>20}   {:<20}{:>17.3e}", "No. Observations:", self.n_obs, "Prob (F-statistic):", self.f_pvalue)?;
        writeln!(f, "{:<18}{:>20}   {:<20}{:>17.3}", "Df Residuals:", self.df_resid, "Log-Likelihood:", self.log_likelihood)?;
        writeln!(f, "{:<18}{:>20}   {:<20}{:>17.2}", "Df Model:", self.df_model, "AIC:", self.aic)?;
        writeln!(f, "{:<18}{:>20}   {:<20}{:>17.2}", "Resid. Std. Err.:", format!("{:.5}", self.residual_std_error), "BIC:", self.bic)?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "{:<12}{:>10}{:>11}{:>10}{:>11}{:>12}{:>12}",
            "",
            "coef",
            "std err",
            "t",
            "P>|t|",
            format!("[{:.3}", lower),
            format!("{:.3}]", upper)
        )?;
        writeln!(f, "{}", thin)?;
        for c in [&self.intercept, &self.slope] {
            writeln!(
                f,
                "{:<12}{:>10.4}{:>11.4}{:>10.3}{:>11.4}{:>12.4}{:>12.4}",
                c.name, c.estimate, c.std_error, c.t_value, c.p_value, c.ci_lower, c.ci_upper
            )?;
        }
        writeln!(f, "{}", rule)?;
        match &self.jarque_bera {
            Some(jb) => {
                writeln!(f, "{:<18}{:>20.3}   {:<20}{:>17.3}", "Durbin-Watson:", self.durbin_watson, "Jarque-Bera (JB):", jb.statistic)?;
                writeln!(f, "{:<18}{:>20.3}   {:<20}{:>17.3}", "Skew:", jb.skewness, "Prob(JB):", jb.p_value)?;
                writeln!(f, "{:<18}{:>20.3}", "Kurtosis:", jb.kurtosis)?;
            }
            None => writeln!(f, "{:<18}{:>20.3}", "Durbin-Watson:", self.durbin_watson)?,
        }
        write!(f, "{}", rule)
    }
}
