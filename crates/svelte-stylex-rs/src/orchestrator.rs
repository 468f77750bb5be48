//! Main orchestration logic.

use crate::cli::{Args, Destination, OutputFormat};
use crate::config::{apply_overrides, load_options, ConfigError, SvelteConfig};
use crate::output::{FileReport, FileStatus, Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use svelte_stylex::{InvalidOption, Preprocessor, Processed};
use thiserror::Error;
use walkdir::WalkDir;

/// Orchestration errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Unusable options file.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Options that would generate broken code.
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] InvalidOption),

    /// Watch error.
    #[error("watch error: {0}")]
    WatchFailed(String),
}

/// Runs the preprocessor over every selected file.
pub async fn run(args: Args) -> Result<RunSummary, OrchestratorError> {
    let session = Session::new(&args)?;
    let files = session.collect_files();

    if args.watch {
        run_watch_mode(&args, &session, files).await
    } else {
        let reports = session.process_all(&files);
        Ok(print_reports(&args, &reports))
    }
}

/// Resolved settings shared by every pass.
struct Session {
    workspace: Utf8PathBuf,
    /// Directories and files to process.
    roots: Vec<Utf8PathBuf>,
    preprocessor: Preprocessor,
    destination: Destination,
    source_map: bool,
    extensions: Vec<String>,
    ignore: GlobSet,
}

impl Session {
    fn new(args: &Args) -> Result<Self, OrchestratorError> {
        let workspace = absolute(&args.workspace);

        let options = load_options(&workspace, args.config.as_deref())?;
        let preprocessor = Preprocessor::new(apply_overrides(options, args))?;

        let svelte_config = SvelteConfig::load(&workspace);
        let extensions = svelte_config
            .file_extensions()
            .into_iter()
            .map(str::to_string)
            .collect();

        let roots = if args.paths.is_empty() {
            vec![workspace.clone()]
        } else {
            args.paths.iter().map(|p| workspace.join(p)).collect()
        };

        let destination = match args.destination() {
            Destination::OutDir(dir) => Destination::OutDir(absolute(&dir)),
            other => other,
        };

        Ok(Self {
            workspace,
            roots,
            preprocessor,
            destination,
            source_map: args.source_map,
            extensions,
            ignore: build_ignore_set(&args.ignore)?,
        })
    }

    /// Finds the files to process, sorted.
    fn collect_files(&self) -> Vec<Utf8PathBuf> {
        let mut files: Vec<Utf8PathBuf> = Vec::new();
        for root in &self.roots {
            if root.is_file() {
                // Explicitly named files skip the extension filter.
                files.push(root.clone());
                continue;
            }
            files.extend(
                WalkDir::new(root)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
                    .filter(|p| self.accepts(p)),
            );
        }
        files.sort();
        files.dedup();
        files
    }

    /// Whether a discovered path should be processed.
    fn accepts(&self, path: &Utf8Path) -> bool {
        let file_name = path.file_name().unwrap_or("");
        if !self.extensions.iter().any(|ext| file_name.ends_with(ext.as_str())) {
            return false;
        }
        if let Destination::OutDir(dir) = &self.destination {
            if path.starts_with(dir) {
                return false;
            }
        }
        let relative = path.strip_prefix(&self.workspace).unwrap_or(path);
        !self.ignore.is_match(relative.as_str())
            && self.roots.iter().any(|root| path.starts_with(root))
    }

    fn display_name(&self, path: &Utf8Path) -> String {
        path.strip_prefix(&self.workspace)
            .map(|p| p.to_string())
            .unwrap_or_else(|_| path.to_string())
    }

    /// Processes files in parallel, keeping their order.
    fn process_all(&self, files: &[Utf8PathBuf]) -> Vec<FileReport> {
        files.par_iter().map(|path| self.process(path)).collect()
    }

    fn process(&self, path: &Utf8Path) -> FileReport {
        let filename = self.display_name(path);
        let source = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => return FileReport::error(filename, format!("failed to read file: {e}")),
        };

        match self.preprocessor.markup(&source, Some(&filename)) {
            Ok(None) => FileReport::unchanged(filename),
            Ok(Some(processed)) => self
                .write(path, &filename, &source, &processed)
                .unwrap_or_else(|e| FileReport::error(filename, format!("failed to write output: {e}"))),
            Err(e) => FileReport::error(filename, e.to_string()),
        }
    }

    fn write(
        &self,
        path: &Utf8Path,
        filename: &str,
        source: &str,
        processed: &Processed,
    ) -> io::Result<FileReport> {
        let target = match &self.destination {
            Destination::Stdout => {
                return Ok(FileReport {
                    filename: filename.to_string(),
                    status: FileStatus::Rewritten,
                    written_to: None,
                    code: Some(processed.code.clone()),
                    message: None,
                });
            }
            Destination::InPlace => path.to_path_buf(),
            Destination::OutDir(dir) => {
                let relative = path
                    .strip_prefix(&self.workspace)
                    .unwrap_or_else(|_| Utf8Path::new(path.file_name().unwrap_or_default()));
                dir.join(relative)
            }
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &processed.code)?;

        if self.source_map {
            let map_path = Utf8PathBuf::from(format!("{target}.map"));
            fs::write(&map_path, processed.source_map_json(source, filename))?;
        }
        log::debug!("wrote {}", target);

        Ok(FileReport {
            filename: filename.to_string(),
            status: FileStatus::Rewritten,
            written_to: Some(self.display_name(&target)),
            code: None,
            message: None,
        })
    }
}

/// Prints the reports of one pass and returns its summary.
fn print_reports(args: &Args, reports: &[FileReport]) -> RunSummary {
    let summary = RunSummary::from_reports(reports);
    let formatter = Formatter::new(args.output);
    let to_stdout = args.destination() == Destination::Stdout;

    match args.output {
        OutputFormat::Human if to_stdout => {
            // Code owns stdout; everything else goes to stderr.
            for report in reports {
                if let Some(code) = &report.code {
                    if reports.len() > 1 {
                        eprintln!("=== {} ===", report.filename);
                    }
                    print!("{code}");
                }
            }
            eprintln!("{}", formatter.format(reports, &summary));
        }
        _ => println!("{}", formatter.format(reports, &summary)),
    }
    summary
}

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    if path.is_relative() {
        std::env::current_dir()
            .map(|p| Utf8PathBuf::try_from(p).unwrap_or_default())
            .unwrap_or_default()
            .join(path)
    } else {
        path.to_path_buf()
    }
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, OrchestratorError> {
    let mut ignore_builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        ignore_builder.add(glob);
    }

    for pattern in ["**/node_modules/**", "**/dist/**", "**/.svelte-kit/**"] {
        if let Ok(glob) = Glob::new(pattern) {
            ignore_builder.add(glob);
        }
    }

    ignore_builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Content hashes of files as last seen, so events that leave a file's
/// bytes unchanged (including our own in-place writes) are skipped.
#[derive(Debug, Default)]
struct ChangeTracker {
    hashes: FxHashMap<Utf8PathBuf, blake3::Hash>,
}

impl ChangeTracker {
    fn has_changed(&mut self, path: &Utf8Path) -> bool {
        match fs::read(path) {
            Ok(bytes) => self.hashes.get(path) != Some(&blake3::hash(&bytes)),
            Err(_) => {
                self.hashes.remove(path);
                false
            }
        }
    }

    fn refresh(&mut self, path: &Utf8Path) {
        if let Ok(bytes) = fs::read(path) {
            self.hashes.insert(path.to_path_buf(), blake3::hash(&bytes));
        }
    }
}

/// Runs in watch mode.
async fn run_watch_mode(
    args: &Args,
    session: &Session,
    initial_files: Vec<Utf8PathBuf>,
) -> Result<RunSummary, OrchestratorError> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    println!("Starting watch mode...\n");

    let mut tracker = ChangeTracker::default();
    let reports = session.process_all(&initial_files);
    for path in &initial_files {
        tracker.refresh(path);
    }
    print_reports(args, &reports);

    // Set up file watcher with tokio channel
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )
    .map_err(|e| OrchestratorError::WatchFailed(e.to_string()))?;

    watcher
        .watch(session.workspace.as_std_path(), RecursiveMode::Recursive)
        .map_err(|e| OrchestratorError::WatchFailed(e.to_string()))?;

    println!("Watching for changes... (Ctrl+C to stop)\n");

    while let Some(event) = rx.recv().await {
        let mut changed: Vec<Utf8PathBuf> = event
            .paths
            .into_iter()
            .filter_map(|p| Utf8PathBuf::try_from(p).ok())
            .filter(|p| session.accepts(p))
            .filter(|p| tracker.has_changed(p))
            .collect();
        changed.sort();
        changed.dedup();

        if changed.is_empty() {
            continue;
        }

        if !args.preserve_watch_output {
            // Clear screen
            print!("\x1B[2J\x1B[1;1H");
        }
        println!("File changed, re-processing...\n");

        let reports = session.process_all(&changed);
        for path in &changed {
            tracker.refresh(path);
        }
        print_reports(args, &reports);
    }

    Err(OrchestratorError::WatchFailed(
        "watch channel closed unexpectedly".to_string(),
    ))
}
