//! Placement of generated artifacts under the output root.
//!
//! Flat and per-feature-folder placement write each artifact as soon as its
//! unit is done, replacing whatever was there. Aggregate placement buffers
//! every artifact of the run and writes the single aggregate file in
//! [`OutputPlacer::finish`].

use crate::config::{PipelineConfig, Placement};
use crate::error::Result;
use crate::fs::{ensure_dir, replace_file};
use crate::partition::ArtifactUnit;
use crate::plan::normalize_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Writes artifacts according to a placement policy.
#[derive(Debug)]
pub struct OutputPlacer {
    root: PathBuf,
    policy: Placement,
    aggregate_file_name: String,
    sections: Vec<String>,
    /// Normalized folder name to the unit that first claimed it.
    folders: HashMap<String, String>,
}

impl OutputPlacer {
    pub fn new(
        root: impl Into<PathBuf>,
        policy: Placement,
        aggregate_file_name: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            policy,
            aggregate_file_name: aggregate_file_name.into(),
            sections: Vec::new(),
            folders: HashMap::new(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            &config.output_root,
            config.placement,
            config.aggregate_file_name.clone(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> Placement {
        self.policy
    }

    /// Create the output root.
    pub fn prepare(&self) -> Result<()> {
        ensure_dir(&self.root)
    }

    /// Place the artifacts of one unit.
    ///
    /// Returns the paths written. Aggregate placement writes nothing here
    /// and returns an empty list.
    pub fn place(&mut self, unit_name: &str, units: &[ArtifactUnit]) -> Result<Vec<PathBuf>> {
        match self.policy {
            Placement::Flat => self.write_all(self.root.clone(), units),
            Placement::PerFeatureFolder => {
                let folder = self.claim_folder(unit_name);
                self.write_all(self.root.join(folder), units)
            }
            Placement::Aggregate => {
                for unit in units {
                    self.sections.push(format!(
                        "// ----- Testcase for {} -----\n{}\n",
                        unit_name, unit.content
                    ));
                }
                Ok(Vec::new())
            }
        }
    }

    /// Complete the run's output.
    ///
    /// Under aggregate placement this writes the buffered sections, joined by
    /// a blank line, as `<root>/<aggregate_file_name>`. When nothing was
    /// buffered the existing file is left alone and `None` is returned.
    pub fn finish(self) -> Result<Option<PathBuf>> {
        if self.policy != Placement::Aggregate {
            return Ok(None);
        }

        if self.sections.is_empty() {
            tracing::warn!(
                file = %self.root.join(&self.aggregate_file_name).display(),
                "no artifacts to aggregate, leaving aggregate file untouched"
            );
            return Ok(None);
        }

        let path = self.root.join(&self.aggregate_file_name);
        replace_file(&path, &self.sections.join("\n"))?;
        tracing::info!(file = %path.display(), sections = self.sections.len(), "aggregate file written");
        Ok(Some(path))
    }

    fn claim_folder(&mut self, unit_name: &str) -> String {
        let folder = normalize_name(unit_name);
        match self.folders.get(&folder) {
            Some(owner) if owner != unit_name => {
                tracing::warn!(
                    folder = %folder,
                    first = %owner,
                    unit = %unit_name,
                    "feature names collide after normalization; files may be overwritten"
                );
            }
            Some(_) => {}
            None => {
                self.folders.insert(folder.clone(), unit_name.to_string());
            }
        }
        folder
    }

    fn write_all(&self, dir: PathBuf, units: &[ArtifactUnit]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(units.len());
        for unit in units {
            let path = dir.join(&unit.path);
            replace_file(&path, &unit.content)?;
            tracing::debug!(file = %path.display(), bytes = unit.content.len(), "artifact written");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn units() -> Vec<ArtifactUnit> {
        vec![
            ArtifactUnit::new("and_driver.sv", "class and_driver;"),
            ArtifactUnit::new("and_test.sv", "class and_test;"),
        ]
    }

    #[test]
    fn test_flat_placement() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("out");
        let mut placer = OutputPlacer::new(&root, Placement::Flat, "all.sv");

        let written = placer.place("and", &units()).unwrap();

        assert_eq!(written, vec![root.join("and_driver.sv"), root.join("and_test.sv")]);
        assert_eq!(
            fs::read_to_string(root.join("and_driver.sv")).unwrap(),
            "class and_driver;"
        );
        assert_eq!(placer.finish().unwrap(), None);
    }

    #[test]
    fn test_per_feature_folder_placement() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("uvm_tests");
        let mut placer = OutputPlacer::new(&root, Placement::PerFeatureFolder, "all.sv");

        let written = placer
            .place(
                "Parity Check",
                &[ArtifactUnit::new("parity_check_test.sv", "class parity_test;")],
            )
            .unwrap();

        let expected = root.join("parity_check").join("parity_check_test.sv");
        assert_eq!(written, vec![expected.clone()]);
        assert_eq!(fs::read_to_string(expected).unwrap(), "class parity_test;");
    }

    #[test]
    fn test_nested_artifact_path() {
        let temp_dir = TempDir::new().unwrap();
        let mut placer = OutputPlacer::new(temp_dir.path(), Placement::Flat, "all.sv");

        placer
            .place("and", &[ArtifactUnit::new("rtl/and.sv", "module and_gate;")])
            .unwrap();
        assert!(temp_dir.path().join("rtl").join("and.sv").exists());
    }

    #[test]
    fn test_rerun_overwrites_instead_of_appending() {
        let temp_dir = TempDir::new().unwrap();

        for policy in [Placement::Flat, Placement::PerFeatureFolder] {
            for _ in 0..2 {
                let mut placer = OutputPlacer::new(temp_dir.path(), policy, "all.sv");
                placer.place("and", &units()).unwrap();
                placer.finish().unwrap();
            }
        }

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("and_test.sv")).unwrap(),
            "class and_test;"
        );
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("and").join("and_test.sv")).unwrap(),
            "class and_test;"
        );
    }

    #[test]
    fn test_aggregate_written_once_at_finish() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("out");
        let mut placer = OutputPlacer::new(&root, Placement::Aggregate, "all_features_testcases.sv");

        assert!(
            placer
                .place("Reset", &[ArtifactUnit::new("reset_test.sv", "class reset_test;")])
                .unwrap()
                .is_empty()
        );
        placer
            .place("Baud Rate", &[ArtifactUnit::new("baud_rate_test.sv", "class baud_test;")])
            .unwrap();
        assert!(!root.join("all_features_testcases.sv").exists());

        let path = placer.finish().unwrap().unwrap();
        assert_eq!(path, root.join("all_features_testcases.sv"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "// ----- Testcase for Reset -----\nclass reset_test;\n\n\
             // ----- Testcase for Baud Rate -----\nclass baud_test;\n"
        );
    }

    #[test]
    fn test_aggregate_rerun_replaces_file() {
        let temp_dir = TempDir::new().unwrap();

        for content in ["first", "second"] {
            let mut placer = OutputPlacer::new(temp_dir.path(), Placement::Aggregate, "all.sv");
            placer
                .place("Reset", &[ArtifactUnit::new("reset_test.sv", content)])
                .unwrap();
            placer.finish().unwrap();
        }

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("all.sv")).unwrap(),
            "// ----- Testcase for Reset -----\nsecond\n"
        );
    }

    #[test]
    fn test_empty_aggregate_leaves_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("all.sv"), "previous run").unwrap();

        let placer = OutputPlacer::new(temp_dir.path(), Placement::Aggregate, "all.sv");
        assert_eq!(placer.finish().unwrap(), None);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("all.sv")).unwrap(),
            "previous run"
        );
    }

    #[test]
    fn test_colliding_feature_names_share_folder() {
        let temp_dir = TempDir::new().unwrap();
        let mut placer = OutputPlacer::new(temp_dir.path(), Placement::PerFeatureFolder, "all.sv");

        placer
            .place("Parity Check", &[ArtifactUnit::new("parity_check_test.sv", "first")])
            .unwrap();
        placer
            .place("parity check", &[ArtifactUnit::new("parity_check_test.sv", "second")])
            .unwrap();

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("parity_check").join("parity_check_test.sv"))
                .unwrap(),
            "second"
        );
    }

    #[test]
    fn test_dot_feature_names_stay_under_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("uvm_tests");
        let mut placer = OutputPlacer::new(&root, Placement::PerFeatureFolder, "all.sv");

        for name in ["..", "."] {
            let written = placer
                .place(name, &[ArtifactUnit::new("dots_test.sv", name)])
                .unwrap();
            for path in written {
                assert!(path.starts_with(&root));
                assert_ne!(path.parent(), Some(root.as_path()));
                assert!(path.components().all(|c| c != std::path::Component::ParentDir));
            }
        }

        assert!(!temp_dir.path().join("dots_test.sv").exists());
        assert_eq!(
            fs::read_to_string(root.join("__").join("dots_test.sv")).unwrap(),
            ".."
        );
        assert_eq!(
            fs::read_to_string(root.join("_").join("dots_test.sv")).unwrap(),
            "."
        );
    }

    #[test]
    fn test_prepare_creates_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("a").join("b");
        OutputPlacer::new(&root, Placement::Flat, "all.sv")
            .prepare()
            .unwrap();
        assert!(root.is_dir());
    }
}
