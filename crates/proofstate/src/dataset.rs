//! Dataset split enumeration and sample loading.
//!
//! A split file names the projects belonging to the train, validation, and
//! test partitions. Each project is a subdirectory of the data root with
//! arbitrarily nested `.json` proof-sample files.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::RawSample;

/// Parsed split-definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct SplitFile {
    /// Projects in the training partition.
    pub projs_train: Vec<String>,
    /// Projects in the validation partition.
    pub projs_valid: Vec<String>,
    /// Projects in the test partition.
    pub projs_test: Vec<String>,
}

/// Data files per partition, in traversal order. No sorting, no dedup.
#[derive(Debug, Clone, Default)]
pub struct SplitFiles {
    pub train: Vec<PathBuf>,
    pub valid: Vec<PathBuf>,
    pub test: Vec<PathBuf>,
}

/// Enumerate every `.json` data file for each partition of a split.
///
/// Projects whose directory does not exist contribute no files, matching
/// glob semantics on a missing path.
pub fn files_on_split(root: &Path, split_path: &Path) -> anyhow::Result<SplitFiles> {
    let contents = std::fs::read_to_string(split_path).map_err(|e| {
        anyhow::anyhow!("failed to read split file {}: {e}", split_path.display())
    })?;
    let split: SplitFile = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse split file {}: {e}", split_path.display()))?;

    let mut files = SplitFiles::default();
    for proj in &split.projs_train {
        collect_json_files(&root.join(proj), &mut files.train)?;
    }
    for proj in &split.projs_valid {
        collect_json_files(&root.join(proj), &mut files.valid)?;
    }
    for proj in &split.projs_test {
        collect_json_files(&root.join(proj), &mut files.test)?;
    }

    tracing::info!(
        train = files.train.len(),
        valid = files.valid.len(),
        test = files.test.len(),
        root = %root.display(),
        "Enumerated split files"
    );

    Ok(files)
}

/// Recursively collect `.json` files under `dir` in directory order.
fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            out.push(path);
        }
    }
    Ok(())
}

/// Load one proof sample from a JSON data file.
pub fn load_sample(path: &Path) -> anyhow::Result<RawSample> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read sample {}: {e}", path.display()))?;
    let sample: RawSample = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("failed to parse sample {}: {e}", path.display()))?;
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_JSON: &str = r#"{
        "state": {
            "fg_goals": [{
                "id": 0,
                "type": "True",
                "sexp": "(Const True)",
                "hypotheses": []
            }]
        },
        "tactic": "trivial."
    }"#;

    fn write_split(dir: &Path, train: &[&str], valid: &[&str], test: &[&str]) -> PathBuf {
        let path = dir.join("split.json");
        let to_json = |projs: &[&str]| {
            projs
                .iter()
                .map(|p| format!("\"{p}\""))
                .collect::<Vec<_>>()
                .join(",")
        };
        std::fs::write(
            &path,
            format!(
                r#"{{"projs_train": [{}], "projs_valid": [{}], "projs_test": [{}]}}"#,
                to_json(train),
                to_json(valid),
                to_json(test)
            ),
        )
        .unwrap();
        path
    }

    #[test]
    fn test_files_on_split_recursive() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        std::fs::create_dir_all(root.join("proj_a/sub/deeper")).unwrap();
        std::fs::create_dir_all(root.join("proj_b")).unwrap();
        std::fs::write(root.join("proj_a/one.json"), SAMPLE_JSON).unwrap();
        std::fs::write(root.join("proj_a/sub/deeper/two.json"), SAMPLE_JSON).unwrap();
        std::fs::write(root.join("proj_a/notes.txt"), "not data").unwrap();
        std::fs::write(root.join("proj_b/three.json"), SAMPLE_JSON).unwrap();

        let split_path = write_split(root, &["proj_a"], &["proj_b"], &[]);
        let files = files_on_split(root, &split_path).unwrap();

        assert_eq!(files.train.len(), 2);
        assert_eq!(files.valid.len(), 1);
        assert!(files.test.is_empty());
        assert!(files
            .train
            .iter()
            .all(|p| p.extension().unwrap() == "json"));
    }

    #[test]
    fn test_empty_partition_others_populated() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();

        std::fs::create_dir_all(root.join("only")).unwrap();
        std::fs::write(root.join("only/a.json"), SAMPLE_JSON).unwrap();

        let split_path = write_split(root, &[], &["only"], &["only"]);
        let files = files_on_split(root, &split_path).unwrap();

        assert!(files.train.is_empty());
        assert_eq!(files.valid.len(), 1);
        assert_eq!(files.test.len(), 1);
    }

    #[test]
    fn test_missing_project_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let split_path = write_split(tmp.path(), &["ghost"], &[], &[]);
        let files = files_on_split(tmp.path(), &split_path).unwrap();
        assert!(files.train.is_empty());
    }

    #[test]
    fn test_missing_split_file() {
        let tmp = TempDir::new().unwrap();
        assert!(files_on_split(tmp.path(), &tmp.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_load_sample() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sample.json");
        std::fs::write(&path, SAMPLE_JSON).unwrap();

        let sample = load_sample(&path).unwrap();
        assert_eq!(sample.tactic, "trivial.");
        assert_eq!(sample.state.fg_goals.len(), 1);

        std::fs::write(&path, "not json").unwrap();
        assert!(load_sample(&path).is_err());
    }
}
