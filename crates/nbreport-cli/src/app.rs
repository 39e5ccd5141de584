//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use nbreport_core::{Cleaner, Directives, Notebook, Rewriter, Settings};
use nbreport_pdf::{BuildOptions, BuildReport, ProcessRunner, Report, StepOutcome, Toolchain};

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripts and CI
    Json,
}

#[derive(Parser)]
#[command(name = "nbreport")]
#[command(author, version, about = "Turn Jupyter notebooks into PDF reports", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert, rewrite, compile and clean
    Build {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        directives: DirectiveArgs,

        #[command(flatten)]
        tools: ToolArgs,

        /// Keep intermediate files
        #[arg(long)]
        keep: bool,

        /// Carry on after failed steps
        #[arg(long)]
        no_fail_fast: bool,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply directives to an existing <notebook>.tex
    Rewrite {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        directives: DirectiveArgs,
    },

    /// Remove intermediate files
    Clean {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Show where the configured tools resolve
    Doctor {
        /// Working directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        tools: ToolArgs,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Notebook selection and configuration source
#[derive(Debug, Clone, Args)]
pub struct ProjectArgs {
    /// Notebook base name or .ipynb file (default: the only notebook in DIR)
    pub notebook: Option<String>,

    /// Working directory holding the notebook
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file path (default: DIR/nbreport.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Directive overrides; each replaces the key from the config file
#[derive(Debug, Clone, Default, Args)]
pub struct DirectiveArgs {
    /// Document title
    #[arg(long)]
    pub title: Option<String>,

    /// Author (repeatable)
    #[arg(long)]
    pub author: Vec<String>,

    /// Document date
    #[arg(long)]
    pub date: Option<String>,

    /// Header field as POS=TEXT (repeatable)
    #[arg(long, value_name = "POS=TEXT", value_parser = parse_page_field)]
    pub header: Vec<(String, String)>,

    /// Footer field as POS=TEXT (repeatable)
    #[arg(long, value_name = "POS=TEXT", value_parser = parse_page_field)]
    pub footer: Vec<(String, String)>,

    /// Package include as OPTIONS:NAME or NAME (repeatable)
    #[arg(long, value_name = "OPTIONS:NAME", value_parser = parse_package)]
    pub package: Vec<(String, String)>,

    /// Fail when an anchor line is missing instead of inserting after line 1
    #[arg(long)]
    pub strict_anchors: bool,
}

impl DirectiveArgs {
    /// Directives given on the command line
    pub fn to_directives(&self) -> Directives {
        Directives {
            title: self.title.clone(),
            author: non_empty(&self.author),
            date: self.date.clone(),
            header: non_empty(&self.header),
            footer: non_empty(&self.footer),
            package: non_empty(&self.package),
        }
    }
}

/// Tool command overrides
#[derive(Debug, Clone, Default, Args)]
pub struct ToolArgs {
    /// Notebook converter command
    #[arg(long)]
    pub converter: Option<String>,

    /// LaTeX compiler command
    #[arg(long)]
    pub compiler: Option<String>,

    /// Bibliography compiler command
    #[arg(long)]
    pub bibliography: Option<String>,

    /// Keep code cell inputs in the report
    #[arg(long)]
    pub include_input: bool,
}

impl ToolArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(converter) = &self.converter {
            settings.tools.converter = converter.clone();
        }
        if let Some(compiler) = &self.compiler {
            settings.tools.compiler = compiler.clone();
        }
        if let Some(bibliography) = &self.bibliography {
            settings.tools.bibliography = bibliography.clone();
        }
        if self.include_input {
            settings.tools.include_input = true;
        }
    }
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}

fn parse_page_field(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(pos, text)| (pos.to_string(), text.to_string()))
        .ok_or_else(|| format!("expected POS=TEXT, got `{value}`"))
}

fn parse_package(value: &str) -> std::result::Result<(String, String), String> {
    let (option, name) = value.rsplit_once(':').unwrap_or(("", value));
    if name.is_empty() {
        return Err(format!("missing package name in `{value}`"));
    }
    Ok((option.to_string(), name.to_string()))
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            project,
            directives,
            tools,
            keep,
            no_fail_fast,
            format,
        } => {
            let options = BuildOptions {
                fail_fast: !no_fail_fast,
                keep_intermediates: keep,
            };
            build_command(&project, &directives, &tools, options, format)?;
        }
        Commands::Rewrite {
            project,
            directives,
        } => {
            rewrite_command(&project, &directives)?;
        }
        Commands::Clean { project } => {
            clean_command(&project)?;
        }
        Commands::Doctor {
            dir,
            config,
            tools,
            format,
        } => {
            doctor_command(&dir, config.as_deref(), &tools, format)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the build command
pub fn build_command(
    project: &ProjectArgs,
    directives: &DirectiveArgs,
    tools: &ToolArgs,
    options: BuildOptions,
    format: OutputFormat,
) -> Result<BuildReport> {
    let (notebook, mut settings) = resolve_project(project)?;
    tools.apply(&mut settings);
    if directives.strict_anchors {
        settings.rewrite.strict_anchors = true;
    }
    let dirs = settings.directives.merged(&directives.to_directives());

    if !project.dir.join(notebook.notebook_file()).is_file() {
        anyhow::bail!(
            "Notebook not found: {}",
            project.dir.join(notebook.notebook_file()).display()
        );
    }

    if matches!(format, OutputFormat::Text) {
        println!("nbreport v{}", nbreport_core::VERSION);
        println!("Building: {}", notebook.notebook_file());
    }

    let report = Report::new(notebook, &project.dir, settings);
    let summary = report
        .build(&dirs, options)
        .with_context(|| format!("Failed to build report for {}", report.notebook()))?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize build report to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => print_build_summary(&summary),
    }

    Ok(summary)
}

fn print_build_summary(summary: &BuildReport) {
    println!("  Convert: {}", outcome_label(&summary.convert));
    for pass in &summary.passes {
        println!("  {:?}: {}", pass.pass, outcome_label(&pass.outcome));
    }
    if let Some(cleaned) = &summary.cleaned {
        println!(
            "  Cleaned: {} file(s), {} directory(ies)",
            cleaned.files.len(),
            cleaned.directories.len()
        );
    }
    println!();
    if summary.pdf_exists {
        println!("Build complete!");
        println!("  Output: {}", summary.pdf.display());
    } else {
        println!("Build finished without a PDF");
        println!("  Expected: {}", summary.pdf.display());
    }
}

fn outcome_label(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Success => "ok".to_string(),
        StepOutcome::Failed {
            exit_code: Some(code),
            ..
        } => format!("failed (exit code {code})"),
        StepOutcome::Failed { exit_code: None, .. } => "failed (signal)".to_string(),
    }
}

/// Execute the rewrite command
pub fn rewrite_command(project: &ProjectArgs, directives: &DirectiveArgs) -> Result<()> {
    let (notebook, mut settings) = resolve_project(project)?;
    if directives.strict_anchors {
        settings.rewrite.strict_anchors = true;
    }
    let dirs = settings.directives.merged(&directives.to_directives());

    let tex_path = project.dir.join(notebook.tex_file());
    if !tex_path.exists() {
        anyhow::bail!(
            "LaTeX source not found: {}\n\
             \n\
             Run `nbreport build --keep` or `jupyter nbconvert --to latex` first.",
            tex_path.display()
        );
    }

    Rewriter::new(settings.rewrite)
        .rewrite_file(&tex_path, &dirs)
        .with_context(|| format!("Failed to rewrite {}", tex_path.display()))?;

    println!("Rewrote: {}", tex_path.display());
    Ok(())
}

/// Execute the clean command
pub fn clean_command(project: &ProjectArgs) -> Result<()> {
    let (notebook, settings) = resolve_project(project)?;

    let summary = Cleaner::new(settings.clean)
        .clean(&project.dir, &notebook)
        .with_context(|| format!("Failed to clean artifacts of {}", notebook))?;

    if summary.is_empty() {
        println!("Nothing to clean for {}", notebook);
    } else {
        for path in summary.files.iter().chain(&summary.directories) {
            println!("  Removed: {}", path.display());
        }
    }
    Ok(())
}

/// Execute the doctor command
pub fn doctor_command(
    dir: &Path,
    config: Option<&Path>,
    tools: &ToolArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut settings = load_settings(dir, config)?;
    tools.apply(&mut settings);

    let toolchain = Toolchain::new(settings.tools, ProcessRunner::new(dir));
    let checks = toolchain.preflight()?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&checks)
                .context("Failed to serialize tool checks to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            for check in &checks {
                match &check.path {
                    Some(path) => println!("✓ {}: {}", check.tool, path.display()),
                    None => println!("✗ {}: `{}` not found on PATH", check.tool, check.program),
                }
            }
        }
    }

    if checks.iter().any(|c| c.path.is_none()) {
        std::process::exit(1);
    }
    Ok(())
}

/// Pick the notebook and load settings for a project
fn resolve_project(project: &ProjectArgs) -> Result<(Notebook, Settings)> {
    let notebook = match &project.notebook {
        Some(name) => Notebook::new(name),
        None => Notebook::detect(&project.dir)
            .with_context(|| format!("No notebook given for {}", project.dir.display()))?,
    };
    let settings = load_settings(&project.dir, project.config.as_deref())?;
    Ok((notebook, settings))
}

/// Load settings from a config file or discover one in `dir`
fn load_settings(dir: &Path, config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Settings::load(path).with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Settings::discover(dir)
            .with_context(|| format!("Failed to load config from {}", dir.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_build() {
        let args = vec![
            "nbreport",
            "build",
            "analysis",
            "--title",
            "Results",
            "--author",
            "Ada",
            "--author",
            "Charles",
            "--footer",
            "C=Page \\thepage",
            "--package",
            "utf8:inputenc",
            "--keep",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build {
                project,
                directives,
                keep,
                no_fail_fast,
                format,
                ..
            } => {
                assert_eq!(project.notebook.as_deref(), Some("analysis"));
                assert_eq!(project.dir, PathBuf::from("."));
                assert_eq!(directives.title.as_deref(), Some("Results"));
                assert_eq!(directives.author, vec!["Ada", "Charles"]);
                assert_eq!(
                    directives.footer,
                    vec![("C".to_string(), "Page \\thepage".to_string())]
                );
                assert_eq!(
                    directives.package,
                    vec![("utf8".to_string(), "inputenc".to_string())]
                );
                assert!(keep);
                assert!(!no_fail_fast);
                assert!(matches!(format, OutputFormat::Text));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parse_build_defaults() {
        let args = vec!["nbreport", "build"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Build {
                project,
                directives,
                tools,
                ..
            } => {
                assert!(project.notebook.is_none());
                assert!(project.config.is_none());
                assert!(directives.to_directives().is_empty());
                assert!(tools.converter.is_none());
                assert!(!tools.include_input);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_parse_rewrite_with_dir() {
        let args = vec![
            "nbreport",
            "rewrite",
            "nb.ipynb",
            "--dir",
            "work",
            "--strict-anchors",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Rewrite {
                project,
                directives,
            } => {
                assert_eq!(project.notebook.as_deref(), Some("nb.ipynb"));
                assert_eq!(project.dir, PathBuf::from("work"));
                assert!(directives.strict_anchors);
            }
            _ => panic!("Expected Rewrite command"),
        }
    }

    #[test]
    fn test_cli_parse_doctor_json() {
        let args = vec!["nbreport", "doctor", "--format", "json", "--compiler", "xelatex"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Doctor { tools, format, .. } => {
                assert_eq!(tools.compiler.as_deref(), Some("xelatex"));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("Expected Doctor command"),
        }
    }

    #[test]
    fn test_cli_parse_verbose_after_subcommand() {
        let cli = Cli::try_parse_from(vec!["nbreport", "clean", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_rejects_malformed_header() {
        let args = vec!["nbreport", "build", "--header", "no-separator"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_page_field_keeps_later_equals() {
        assert_eq!(
            parse_page_field("R=a=b").unwrap(),
            ("R".to_string(), "a=b".to_string())
        );
    }

    #[test]
    fn test_parse_package_forms() {
        assert_eq!(
            parse_package("margin=1in:geometry").unwrap(),
            ("margin=1in".to_string(), "geometry".to_string())
        );
        assert_eq!(
            parse_package("xcolor").unwrap(),
            (String::new(), "xcolor".to_string())
        );
        assert!(parse_package("utf8:").is_err());
    }

    #[test]
    fn test_directive_args_override_config() {
        let file = Directives::new().with_title("File").with_date("yesterday");
        let cli = DirectiveArgs {
            title: Some("Flag".to_string()),
            ..DirectiveArgs::default()
        };

        let merged = file.merged(&cli.to_directives());
        assert_eq!(merged.title.as_deref(), Some("Flag"));
        assert_eq!(merged.date.as_deref(), Some("yesterday"));
    }

    #[test]
    fn test_tool_args_apply() {
        let mut settings = Settings::default();
        let tools = ToolArgs {
            compiler: Some("xelatex -interaction=nonstopmode".to_string()),
            include_input: true,
            ..ToolArgs::default()
        };
        tools.apply(&mut settings);

        assert_eq!(settings.tools.compiler, "xelatex -interaction=nonstopmode");
        assert_eq!(settings.tools.converter, "jupyter nbconvert");
        assert!(settings.tools.include_input);
    }

    #[test]
    fn test_load_settings_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let result = load_settings(dir.path(), Some(missing.as_path()));
        assert!(result.is_err());
    }
}
