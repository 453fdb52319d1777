//! Threshold table loading
//!
//! A thresholds file lists sector tables in the same shape as the built-in
//! catalog. Sectors present in the file replace the built-in table for that
//! sector; the merged catalog must pass validation.

use std::path::{Path, PathBuf};

use application::ThresholdCatalog;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ConfigError;

/// Impact evaluator settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAppConfig {
    /// TOML file with threshold tables overriding the built-in ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds_path: Option<PathBuf>,
}

impl ImpactAppConfig {
    /// Build the catalog the evaluator will use
    pub fn catalog(&self) -> Result<ThresholdCatalog, ConfigError> {
        let catalog = match &self.thresholds_path {
            Some(path) => load_catalog(path)?,
            None => ThresholdCatalog::builtin(),
        };
        catalog
            .validate()
            .map_err(|e| invalid(self.thresholds_path.as_deref(), e.to_string()))?;
        Ok(catalog)
    }
}

/// Read a thresholds file and merge it over the built-in catalog
pub fn load_catalog(path: &Path) -> Result<ThresholdCatalog, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| invalid(Some(path), format!("cannot read file: {e}")))?;
    let overrides = parse_catalog(&text).map_err(|reason| invalid(Some(path), reason))?;

    let mut catalog = ThresholdCatalog::builtin();
    for (sector, table) in overrides.sectors {
        debug!(%sector, rules = table.rules.len(), "Overriding threshold table");
        catalog.sectors.insert(sector, table);
    }
    info!(path = %path.display(), "Loaded threshold tables");
    Ok(catalog)
}

/// Parse threshold tables from TOML text
pub fn parse_catalog(text: &str) -> Result<ThresholdCatalog, String> {
    toml::from_str(text).map_err(|e| e.to_string())
}

fn invalid(path: Option<&Path>, reason: String) -> ConfigError {
    ConfigError::InvalidThresholds {
        path: path.map_or_else(|| "built-in tables".to_string(), |p| p.display().to_string()),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use application::Measure;
    use domain::{ConcernCategory, IndustrySector, Metric};

    use super::*;

    const ENERGY_OVERRIDE: &str = r#"
[sectors.energy]
score = { temperature = { above = 1.0, below = 1.0 }, humidity = { above = 0.0, below = 0.0 }, wind = { above = 2.0, below = -1.0 } }

[sectors.energy.conditions]
Clear = "peak solar output"

[[sectors.energy.rules]]
metric = "wind"
category = "operational"
measure = "level"
comfort_max = 12.0
steps = [1.0, 5.0, 10.0]
concern = "turbine cut-out"
"#;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn builtin_when_no_path() {
        let catalog = ImpactAppConfig::default().catalog().unwrap();
        assert_eq!(catalog, ThresholdCatalog::builtin());
    }

    #[test]
    fn file_replaces_only_listed_sectors() {
        let file = write_file(ENERGY_OVERRIDE);
        let config = ImpactAppConfig {
            thresholds_path: Some(file.path().to_path_buf()),
        };
        let catalog = config.catalog().unwrap();

        let energy = catalog.table(IndustrySector::Energy).unwrap();
        assert_eq!(energy.rules.len(), 1);
        let rule = &energy.rules[0];
        assert_eq!(rule.metric, Metric::Wind);
        assert_eq!(rule.category, ConcernCategory::Operational);
        assert_eq!(rule.measure, Measure::Level);
        assert_eq!(rule.comfort_min, None);
        assert!((energy.score.wind.above - 2.0).abs() < f64::EPSILON);
        assert_eq!(
            catalog.condition_outlook(IndustrySector::Energy, "clear"),
            Some("peak solar output")
        );

        let builtin = ThresholdCatalog::builtin();
        assert_eq!(
            catalog.table(IndustrySector::Agriculture),
            builtin.table(IndustrySector::Agriculture)
        );
    }

    #[test]
    fn decreasing_steps_are_rejected() {
        let file = write_file(&ENERGY_OVERRIDE.replace("[1.0, 5.0, 10.0]", "[5.0, 1.0, 10.0]"));
        let config = ImpactAppConfig {
            thresholds_path: Some(file.path().to_path_buf()),
        };
        let err = config.catalog().unwrap_err();
        match err {
            ConfigError::InvalidThresholds { reason, .. } => {
                assert!(reason.contains("non-decreasing"), "{reason}");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_sector_is_a_parse_error() {
        let file = write_file("[sectors.mining]\nrules = []\n");
        let err = load_catalog(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThresholds { .. }));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_catalog(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
