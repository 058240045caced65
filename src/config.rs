use std::path::PathBuf;

pub(crate) const DEFAULT_INPUT: &str = "HDI-BioArea.csv";

// Small states and volcanic soil distort the raw relationship
pub(crate) const FIRST_EXCLUSIONS: [&str; 3] = ["Iceland", "Luxembourg", "Malta"];
// Mountainous north / horticulture instead of organic farming
pub(crate) const SECOND_EXCLUSIONS: [&str; 2] = ["Netherlands", "Norway"];

pub(crate) const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalysisConfig {
    pub(crate) input: PathBuf,
    pub(crate) output_dir: PathBuf,
    pub(crate) first_exclusions: Vec<&'static str>,
    pub(crate) second_exclusions: Vec<&'static str>,
    pub(crate) confidence_level: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            first_exclusions: FIRST_EXCLUSIONS.to_vec(),
            second_exclusions: SECOND_EXCLUSIONS.to_vec(),
            confidence_level: CONFIDENCE_LEVEL,
        }
    }
}

impl AnalysisConfig {
    /// Defaults, with the CSV path taken from the first argument if one is given.
    pub(crate) fn from_args(mut args: impl Iterator<Item = String>) -> Self {
        let mut config = AnalysisConfig::default();
        if let Some(path) = args.next() {
            config.input = PathBuf::from(path);
        }
        config
    }

    pub(crate) fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
