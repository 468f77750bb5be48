//! Output formatting.

use crate::cli::OutputFormat;
use serde::Serialize;

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Rewritten,
    Unchanged,
    Error,
}

/// The result of processing one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The file path, relative to the workspace when possible.
    pub filename: String,
    pub status: FileStatus,
    /// Where the rewritten code was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<String>,
    /// The rewritten code, when printing JSON without writing files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// The error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileReport {
    pub fn unchanged(filename: String) -> Self {
        Self {
            filename,
            status: FileStatus::Unchanged,
            written_to: None,
            code: None,
            message: None,
        }
    }

    pub fn error(filename: String, message: impl Into<String>) -> Self {
        Self {
            filename,
            status: FileStatus::Error,
            written_to: None,
            code: None,
            message: Some(message.into()),
        }
    }
}

/// Summary of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of files processed.
    pub file_count: usize,
    pub rewritten_count: usize,
    pub unchanged_count: usize,
    pub error_count: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let count = |status: FileStatus| reports.iter().filter(|r| r.status == status).count();
        Self {
            file_count: reports.len(),
            rewritten_count: count(FileStatus::Rewritten),
            unchanged_count: count(FileStatus::Unchanged),
            error_count: count(FileStatus::Error),
        }
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };

        format!(
            "====================================\nsvelte-stylex rewrote {} ({} unchanged) with {} in {}",
            plural(self.rewritten_count, "file"),
            self.unchanged_count,
            plural(self.error_count, "error"),
            plural(self.file_count, "file"),
        )
    }
}

/// Formats file reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a run: one entry per rewritten or failed file, then the summary.
    pub fn format(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(reports, summary),
            OutputFormat::Json => self.format_json(reports, summary),
        }
    }

    fn format_human(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        let mut output = String::new();

        for report in reports {
            match report.status {
                FileStatus::Rewritten => match &report.written_to {
                    Some(target) => {
                        output.push_str(&format!("{} -> {}\n", report.filename, target))
                    }
                    None => output.push_str(&format!("{}\n", report.filename)),
                },
                FileStatus::Error => output.push_str(&format!(
                    "{}\nError: {}\n\n",
                    report.filename,
                    report.message.as_deref().unwrap_or("unknown error")
                )),
                FileStatus::Unchanged => {}
            }
        }

        output.push_str(&summary.format());
        output
    }

    fn format_json(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        let root = serde_json::json!({
            "files": reports,
            "summary": summary,
        });
        serde_json::to_string_pretty(&root).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reports() -> Vec<FileReport> {
        vec![
            FileReport {
                filename: "src/App.svelte".to_string(),
                status: FileStatus::Rewritten,
                written_to: Some("out/src/App.svelte".to_string()),
                code: None,
                message: None,
            },
            FileReport::unchanged("src/Plain.svelte".to_string()),
            FileReport::error("src/Broken.svelte".to_string(), "src/Broken.svelte:3:0: unclosed tag: <div>"),
        ]
    }

    #[test]
    fn test_format_human() {
        let reports = reports();
        let summary = RunSummary::from_reports(&reports);
        let output = Formatter::new(OutputFormat::Human).format(&reports, &summary);

        assert!(output.contains("src/App.svelte -> out/src/App.svelte\n"));
        assert!(!output.contains("src/Plain.svelte"));
        assert!(output.contains("src/Broken.svelte\nError: src/Broken.svelte:3:0: unclosed tag"));
    }

    #[test]
    fn test_format_json() {
        let reports = reports();
        let summary = RunSummary::from_reports(&reports);
        let output = Formatter::new(OutputFormat::Json).format(&reports, &summary);

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["files"][0]["status"], "rewritten");
        assert_eq!(value["files"][1].get("message"), None);
        assert_eq!(value["files"][2]["status"], "error");
        assert_eq!(value["summary"]["error_count"], 1);
    }

    #[test]
    fn test_summary() {
        let summary = RunSummary {
            file_count: 5,
            rewritten_count: 1,
            unchanged_count: 3,
            error_count: 1,
        };

        insta::assert_snapshot!(summary.format(), @r"
        ====================================
        svelte-stylex rewrote 1 file (3 unchanged) with 1 error in 5 files
        ");
    }
}
