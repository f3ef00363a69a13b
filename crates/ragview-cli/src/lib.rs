//! Report rendering for `check-graphml`.

use std::fmt;
use std::path::Path;

use ragview_kg::{ArtifactScan, ScanStatus};

const RULE_WIDTH: usize = 80;

/// Plain-text report, exactly as printed to stdout.
pub struct Report<'a> {
    root: &'a Path,
    scan: &'a ArtifactScan,
}

impl<'a> Report<'a> {
    pub fn new(root: &'a Path, scan: &'a ArtifactScan) -> Self {
        Self { root, scan }
    }

    fn hints(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\nNo GraphML files found. Make sure:")?;
        writeln!(
            f,
            "1. You've run the indexing process (python -m graphrag.index --root {})",
            self.root.display()
        )?;
        writeln!(f, "2. snapshots.graphml: yes is set in your settings.yaml file")
    }

    fn table(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f, "\nFound {} GraphML files:", self.scan.records.len())?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<60} {:<20} {:<10}", "Path", "Modified", "Size (KB)")?;
        writeln!(f, "{rule}")?;
        for record in &self.scan.records {
            writeln!(
                f,
                "{:<60} {:<20} {:<10.2}",
                record.path.display().to_string(),
                record.modified_display(),
                record.size_kb
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scan.status != ScanStatus::MissingOutputDir {
            writeln!(f, "Checking output directory: {}", self.scan.output_dir.display())?;
        }
        if let Some(note) = self.scan.diagnostic() {
            writeln!(f, "{note}")?;
        }
        if self.scan.is_empty() {
            self.hints(f)
        } else {
            self.table(f)
        }
    }
}

/// Machine-readable variant of [`Report`].
pub fn render_json(scan: &ArtifactScan) -> serde_json::Result<String> {
    serde_json::to_string_pretty(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ragview_kg::find_graphml_files;
    use std::fs;

    #[test]
    fn test_missing_output_dir_report() {
        let dir = tempfile::tempdir().unwrap();
        let scan = find_graphml_files(dir.path());
        let report = Report::new(dir.path(), &scan).to_string();

        let expected = format!(
            "Output directory not found: {}\n\
             \nNo GraphML files found. Make sure:\n\
             1. You've run the indexing process (python -m graphrag.index --root {})\n\
             2. snapshots.graphml: yes is set in your settings.yaml file\n",
            dir.path().join("output").display(),
            dir.path().display()
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn test_no_timestamp_dirs_report() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("output")).unwrap();
        let report = Report::new(dir.path(), &find_graphml_files(dir.path())).to_string();

        let mut lines = report.lines();
        assert!(lines.next().unwrap().starts_with("Checking output directory: "));
        assert_eq!(lines.next(), Some("No timestamp directories found."));
        assert!(report.contains("No GraphML files found. Make sure:"));
    }

    #[test]
    fn test_table_report() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = dir.path().join("output").join("20240101-000000").join("artifacts");
        fs::create_dir_all(&artifacts).unwrap();
        fs::write(artifacts.join("summarized_graph.graphml"), vec![b'x'; 2048]).unwrap();

        let scan = find_graphml_files(dir.path());
        let report = Report::new(dir.path(), &scan).to_string();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Found 1 GraphML files:");
        assert_eq!(lines[3], "-".repeat(80));
        assert_eq!(
            lines[4],
            format!("{:<60} {:<20} {:<10}", "Path", "Modified", "Size (KB)")
        );
        assert_eq!(lines[5], "-".repeat(80));
        assert!(lines[6].contains("summarized_graph.graphml"));
        assert!(lines[6].ends_with("2.00      "));
    }

    #[test]
    fn test_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let scan = find_graphml_files(dir.path());
        let value: serde_json::Value = serde_json::from_str(&render_json(&scan).unwrap()).unwrap();
        assert_eq!(value["status"], "missing_output_dir");
        assert_eq!(value["records"], serde_json::json!([]));
    }
}
