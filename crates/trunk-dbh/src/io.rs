//! JSON configuration, input and report helpers for forest runs.

use crate::forest::{group_by_tree, ForestParams, ForestReport, LabeledPoint, TreeCloud};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use trunk_dbh_estimator::DbhEstimatorParams;

#[derive(thiserror::Error, Debug)]
pub enum ForestIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_true() -> bool {
    true
}

/// Configuration for a forest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// JSON file holding a [`ForestInput`].
    pub input_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub params: Option<DbhEstimatorParams>,
    #[serde(default = "default_true")]
    pub normalize_ground: bool,
    /// Overrides `params.seed` when set.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ForestConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ForestIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ForestIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("dbh_report.json"))
    }

    /// Build driver parameters, applying overrides from the config.
    pub fn build_params(&self) -> ForestParams {
        let mut estimator = self.params.clone().unwrap_or_default();
        if let Some(seed) = self.seed {
            estimator.seed = Some(seed);
        }
        ForestParams {
            estimator,
            normalize_ground: self.normalize_ground,
        }
    }
}

/// Labelled points of a segmented forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForestInput {
    pub points: Vec<LabeledPoint>,
}

impl ForestInput {
    /// Group the points by tree id.
    pub fn trees(&self) -> Vec<TreeCloud> {
        group_by_tree(&self.points)
    }

    /// Load input points from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ForestIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write input points to disk as JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ForestIoError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl ForestReport {
    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ForestIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ForestIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg: ForestConfig =
            serde_json::from_str(r#"{ "input_path": "plot_7.json" }"#).expect("config");
        assert!(cfg.normalize_ground);
        assert_eq!(cfg.output_path(), PathBuf::from("dbh_report.json"));
        assert_eq!(cfg.build_params(), ForestParams::default());
    }

    #[test]
    fn seed_overrides_params() {
        let cfg: ForestConfig = serde_json::from_str(
            r#"{
                "input_path": "in.json",
                "output_path": "out.json",
                "normalize_ground": false,
                "params": { "max_trunks": 2, "seed": 1 },
                "seed": 99
            }"#,
        )
        .expect("config");

        let params = cfg.build_params();
        assert!(!params.normalize_ground);
        assert_eq!(params.estimator.max_trunks, 2);
        assert_eq!(params.estimator.seed, Some(99));
        assert_eq!(cfg.output_path(), PathBuf::from("out.json"));
    }

    #[test]
    fn points_are_xyz_arrays() {
        let input: ForestInput = serde_json::from_str(
            r#"{ "points": [ { "tree_id": 3, "position": [1.0, 2.0, 3.5] } ] }"#,
        )
        .expect("input");
        assert_eq!(input.points[0].tree_id, 3);
        assert_eq!(input.points[0].position.z, 3.5);
    }
}
