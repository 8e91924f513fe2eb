use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

pub const DEFAULT_RESULTS_DIR: &str = "tests/results";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    /// Multiplier applied to the largest CPU time for the Y axis upper bound
    pub y_headroom: f64,
    pub results_dir: PathBuf,
}

impl Default for ChartSettings {
    fn default() -> Self {
        ChartSettings {
            width: 1024,
            height: 768,
            y_headroom: 1.3,
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
        }
    }
}

impl ChartSettings {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let settings: ChartSettings =
            serde_yml::from_str(text).map_err(|err| ReportError::Settings(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReportError::Settings(format!(
                "chart size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.y_headroom.is_nan() || self.y_headroom < 1.0 {
            return Err(ReportError::Settings(format!(
                "y_headroom must be at least 1.0, got {}",
                self.y_headroom
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let settings = ChartSettings::from_yaml("{}").unwrap();
        assert_eq!(settings, ChartSettings::default());
        assert_eq!(settings.results_dir, PathBuf::from("tests/results"));
        assert_eq!(settings.y_headroom, 1.3);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let settings = ChartSettings::from_yaml("width: 640\nresults_dir: out\n").unwrap();
        assert_eq!(settings.width, 640);
        assert_eq!(settings.height, 768);
        assert_eq!(settings.results_dir, PathBuf::from("out"));
    }

    #[test]
    fn rejects_shrinking_headroom() {
        let err = ChartSettings::from_yaml("y_headroom: 0.5").unwrap_err();
        assert!(matches!(err, ReportError::Settings(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(ChartSettings::from_yaml("colour: red").is_err());
    }
}
