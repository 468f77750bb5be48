//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Rewrites StyleX attributes in Svelte components.
#[derive(Debug, Parser)]
#[command(name = "svelte-stylex-rs")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Files or directories to process, relative to the workspace
    pub paths: Vec<Utf8PathBuf>,

    /// Project root
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Write rewritten files into this directory, mirroring the workspace
    #[arg(long = "out-dir", conflicts_with = "write")]
    pub out_dir: Option<Utf8PathBuf>,

    /// Rewrite files in place
    #[arg(long)]
    pub write: bool,

    /// Write a `.map` source map next to every rewritten file
    #[arg(long = "source-map")]
    pub source_map: bool,

    /// Path to a JSON options file (default: stylex.config.json in the workspace)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Attribute passed to the runtime `attrs` helper
    #[arg(long = "attrs-name")]
    pub attrs_name: Option<String>,

    /// Shorthand attribute name, also usable as `{name}` and `{...name}`
    #[arg(long = "shorthand-name", conflicts_with = "no_shorthand")]
    pub shorthand_name: Option<String>,

    /// Disable the shorthand attribute
    #[arg(long = "no-shorthand")]
    pub no_shorthand: bool,

    /// Attribute holding an inline style definition
    #[arg(long = "create-name")]
    pub create_name: Option<String>,

    /// Attribute choosing where the inline style goes in the attrs list
    #[arg(long = "create-at-name")]
    pub create_at_name: Option<String>,

    /// Module the runtime is imported from
    #[arg(long = "import-source")]
    pub import_source: Option<String>,

    /// Namespace alias of the imported runtime
    #[arg(long = "runtime-alias")]
    pub runtime_alias: Option<String>,

    /// Name of the hoisted style-definition constant
    #[arg(long = "hoist-var")]
    pub hoist_var: Option<String>,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Watch mode
    #[arg(long)]
    pub watch: bool,

    /// Preserve watch output (don't clear screen)
    #[arg(long = "preserveWatchOutput")]
    pub preserve_watch_output: bool,

    /// Log debug information
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

/// Where rewritten code goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    OutDir(Utf8PathBuf),
    InPlace,
}

impl Args {
    pub fn destination(&self) -> Destination {
        match (&self.out_dir, self.write) {
            (Some(dir), _) => Destination::OutDir(dir.clone()),
            (None, true) => Destination::InPlace,
            (None, false) => Destination::Stdout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["svelte-stylex-rs"]);
        assert_eq!(args.workspace.as_str(), ".");
        assert!(args.paths.is_empty());
        assert!(matches!(args.output, OutputFormat::Human));
        assert_eq!(args.destination(), Destination::Stdout);
        assert!(!args.watch);
    }

    #[test]
    fn test_paths_and_out_dir() {
        let args = Args::parse_from([
            "svelte-stylex-rs",
            "src/routes",
            "src/App.svelte",
            "--out-dir",
            "build/preprocessed",
        ]);
        assert_eq!(args.paths.len(), 2);
        assert_eq!(
            args.destination(),
            Destination::OutDir(Utf8PathBuf::from("build/preprocessed"))
        );
    }

    #[test]
    fn test_write_conflicts_with_out_dir() {
        let result = Args::try_parse_from(["svelte-stylex-rs", "--write", "--out-dir", "x"]);
        assert!(result.is_err());

        let args = Args::parse_from(["svelte-stylex-rs", "--write"]);
        assert_eq!(args.destination(), Destination::InPlace);
    }

    #[test]
    fn test_option_overrides() {
        let args = Args::parse_from([
            "svelte-stylex-rs",
            "--attrs-name",
            "css",
            "--no-shorthand",
            "--runtime-alias",
            "sx",
        ]);
        assert_eq!(args.attrs_name.as_deref(), Some("css"));
        assert!(args.no_shorthand);
        assert_eq!(args.runtime_alias.as_deref(), Some("sx"));

        let result =
            Args::try_parse_from(["svelte-stylex-rs", "--no-shorthand", "--shorthand-name", "s"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_watch_mode() {
        let args = Args::parse_from(["svelte-stylex-rs", "--watch", "--preserveWatchOutput"]);
        assert!(args.watch);
        assert!(args.preserve_watch_output);
    }

    #[test]
    fn test_output_formats() {
        let args = Args::parse_from(["svelte-stylex-rs", "--output", "json", "-v"]);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.verbose);
    }
}
