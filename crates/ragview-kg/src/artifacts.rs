//! Discovery of GraphML exports under `root/output/<timestamp>/artifacts/`.
//!
//! The indexing engine writes one timestamped folder per run. Only the two
//! fixed levels below `output` are inspected; nothing deeper is walked.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, instrument, warn};

pub const OUTPUT_DIR: &str = "output";
pub const ARTIFACTS_DIR: &str = "artifacts";
pub const GRAPHML_EXTENSION: &str = "graphml";
/// Export name written when `snapshots.graphml` is enabled.
pub const SUMMARIZED_GRAPH: &str = "summarized_graph.graphml";

pub const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Metadata for one GraphML file found on disk.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactRecord {
    pub path: PathBuf,
    /// Name of the timestamped run folder that holds the file.
    pub timestamp_dir: String,
    pub modified: DateTime<Local>,
    pub size_kb: f64,
}

impl ArtifactRecord {
    /// Modification time truncated to seconds.
    pub fn modified_display(&self) -> String {
        self.modified.format(MODIFIED_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    MissingOutputDir,
    NoTimestampDirs,
    Scanned,
}

/// Result of scanning a root directory.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactScan {
    pub output_dir: PathBuf,
    pub status: ScanStatus,
    pub records: Vec<ArtifactRecord>,
}

impl ArtifactScan {
    /// Human-readable note for the empty-result cases.
    pub fn diagnostic(&self) -> Option<String> {
        match self.status {
            ScanStatus::MissingOutputDir => {
                Some(format!("Output directory not found: {}", self.output_dir.display()))
            }
            ScanStatus::NoTimestampDirs => Some("No timestamp directories found.".to_string()),
            ScanStatus::Scanned => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Collect every GraphML export under `root/output/*/artifacts/`, newest first.
///
/// Missing directories are reported through [`ArtifactScan::status`], never as
/// an error. Ties on modification time keep discovery order.
#[instrument]
pub fn find_graphml_files(root: &Path) -> ArtifactScan {
    let output_dir = root.join(OUTPUT_DIR);
    if !output_dir.is_dir() {
        info!("Output directory not found: {}", output_dir.display());
        return ArtifactScan { output_dir, status: ScanStatus::MissingOutputDir, records: vec![] };
    }

    let timestamp_dirs = list_subdirs(&output_dir);
    if timestamp_dirs.is_empty() {
        info!("No timestamp directories found in {}", output_dir.display());
        return ArtifactScan { output_dir, status: ScanStatus::NoTimestampDirs, records: vec![] };
    }

    let mut records = Vec::new();
    for ts_dir in &timestamp_dirs {
        let artifacts_dir = ts_dir.join(ARTIFACTS_DIR);
        if !artifacts_dir.is_dir() {
            continue;
        }
        let timestamp_dir = ts_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for file in list_graphml(&artifacts_dir) {
            match fs::metadata(&file) {
                Ok(meta) => {
                    let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                    records.push((
                        mtime,
                        ArtifactRecord {
                            path: file,
                            timestamp_dir: timestamp_dir.clone(),
                            modified: DateTime::<Local>::from(mtime),
                            size_kb: meta.len() as f64 / 1024.0,
                        },
                    ));
                }
                Err(e) => warn!("Skipping {}: {}", file.display(), e),
            }
        }
    }

    // sort_by is stable, so equal times stay in discovery order
    records.sort_by(|a, b| b.0.cmp(&a.0));
    debug!(count = records.len(), "GraphML scan complete");

    ArtifactScan {
        output_dir,
        status: ScanStatus::Scanned,
        records: records.into_iter().map(|(_, r)| r).collect(),
    }
}

/// Locate the GraphML export of the most recent indexing run.
///
/// Picks the most recently modified folder under `root/output`, then prefers
/// [`SUMMARIZED_GRAPH`] and falls back to the first `*.graphml` by name.
#[instrument]
pub fn find_latest_graphml(root: &Path) -> Option<PathBuf> {
    let output_dir = root.join(OUTPUT_DIR);
    if !output_dir.is_dir() {
        return None;
    }

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for dir in list_subdirs(&output_dir) {
        let mtime = fs::metadata(&dir)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        // strict comparison keeps the first of equally recent folders
        if latest.as_ref().map_or(true, |(best, _)| mtime > *best) {
            latest = Some((mtime, dir));
        }
    }
    let (_, latest_dir) = latest?;
    let artifacts_dir = latest_dir.join(ARTIFACTS_DIR);

    let preferred = artifacts_dir.join(SUMMARIZED_GRAPH);
    if preferred.is_file() {
        debug!("Using summarized graph {}", preferred.display());
        return Some(preferred);
    }

    if !artifacts_dir.is_dir() {
        return None;
    }
    let mut candidates = list_graphml(&artifacts_dir);
    candidates.sort();
    candidates.into_iter().next()
}

fn list_subdirs(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read {}: {}", dir.display(), e);
            return vec![];
        }
    };
    entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|p| p.is_dir())
        .collect()
}

fn list_graphml(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read {}: {}", dir.display(), e);
            return vec![];
        }
    };
    entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_graphml(p))
        .collect()
}

fn is_graphml(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(GRAPHML_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch(path: &Path, bytes: usize, mtime: SystemTime) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![b'x'; bytes]).unwrap();
        File::options().write(true).open(path).unwrap().set_modified(mtime).unwrap();
    }

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
    }

    #[test]
    fn test_missing_output_dir_is_empty() {
        let dir = tempdir().unwrap();
        let scan = find_graphml_files(dir.path());
        assert!(scan.is_empty());
        assert_eq!(scan.status, ScanStatus::MissingOutputDir);
        assert!(scan.diagnostic().unwrap().starts_with("Output directory not found:"));
    }

    #[test]
    fn test_output_without_timestamp_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("output")).unwrap();
        fs::write(dir.path().join("output/stray.graphml"), "x").unwrap();

        let scan = find_graphml_files(dir.path());
        assert!(scan.is_empty());
        assert_eq!(scan.status, ScanStatus::NoTimestampDirs);
        assert_eq!(scan.diagnostic().as_deref(), Some("No timestamp directories found."));
    }

    #[test]
    fn test_records_sorted_newest_first() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("output");
        touch(&out.join("20240101-000000/artifacts/a.graphml"), 2048, at(10));
        touch(&out.join("20240102-000000/artifacts/b.graphml"), 512, at(30));
        touch(&out.join("20240103-000000/artifacts/c.graphml"), 1024, at(20));

        let scan = find_graphml_files(dir.path());
        assert_eq!(scan.status, ScanStatus::Scanned);
        let dirs: Vec<&str> = scan.records.iter().map(|r| r.timestamp_dir.as_str()).collect();
        assert_eq!(dirs, vec!["20240102-000000", "20240103-000000", "20240101-000000"]);
        assert!((scan.records[2].size_kb - 2.0).abs() < 1e-9);
        assert!((scan.records[0].size_kb - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_skips_dirs_without_artifacts_and_other_extensions() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("output");
        fs::create_dir_all(out.join("no-artifacts")).unwrap();
        touch(&out.join("run/artifacts/graph.graphml"), 10, at(1));
        touch(&out.join("run/artifacts/stats.json"), 10, at(2));
        touch(&out.join("run/artifacts/nested/deep.graphml"), 10, at(3));

        let scan = find_graphml_files(dir.path());
        assert_eq!(scan.records.len(), 1);
        assert!(scan.records[0].path.ends_with("graph.graphml"));
    }

    #[test]
    fn test_modified_display_has_second_precision() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("output/run/artifacts/g.graphml"), 1, at(0));
        let scan = find_graphml_files(dir.path());
        let shown = scan.records[0].modified_display();
        assert_eq!(shown.len(), "2023-11-14 22:13:20".len());
    }

    #[test]
    fn test_latest_prefers_summarized_graph() {
        let dir = tempdir().unwrap();
        let artifacts = dir.path().join("output/run/artifacts");
        touch(&artifacts.join("aaa.graphml"), 1, at(1));
        touch(&artifacts.join(SUMMARIZED_GRAPH), 1, at(0));

        let found = find_latest_graphml(dir.path()).unwrap();
        assert!(found.ends_with(SUMMARIZED_GRAPH));
    }

    #[test]
    fn test_latest_falls_back_to_first_graphml() {
        let dir = tempdir().unwrap();
        let artifacts = dir.path().join("output/run/artifacts");
        touch(&artifacts.join("zeta.graphml"), 1, at(1));
        touch(&artifacts.join("alpha.graphml"), 1, at(2));

        let found = find_latest_graphml(dir.path()).unwrap();
        assert!(found.ends_with("alpha.graphml"));
    }

    #[test]
    fn test_latest_uses_most_recent_run() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("output");
        touch(&out.join("old/artifacts/summarized_graph.graphml"), 1, at(1));
        touch(&out.join("new/artifacts/summarized_graph.graphml"), 1, at(1));
        File::open(out.join("old")).unwrap().set_modified(at(100)).unwrap();
        File::open(out.join("new")).unwrap().set_modified(at(200)).unwrap();

        let found = find_latest_graphml(dir.path()).unwrap();
        assert!(found.starts_with(out.join("new")));
    }

    #[test]
    fn test_latest_none_cases() {
        let dir = tempdir().unwrap();
        assert!(find_latest_graphml(dir.path()).is_none());

        fs::create_dir_all(dir.path().join("output/run")).unwrap();
        assert!(find_latest_graphml(dir.path()).is_none());

        fs::create_dir_all(dir.path().join("output/run/artifacts")).unwrap();
        assert!(find_latest_graphml(dir.path()).is_none());
    }
}
