//! Filepath: src/cli.rs
//! Command-line surface: `assemble`, `optimize`, `split`, `diff-split`,
//! `stream`, `init`, `completions`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,
    pub no_color: bool,
    pub dry_run: bool,
}

#[derive(Parser)]
#[command(name = "ctxpack")]
#[command(about = "Assembles, transforms, and packages source-code contexts for LLM workflows")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without executing
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk a project and build a context artifact (in-memory or streamed)
    Assemble(AssembleArgs),

    /// Run the content optimizer over one or more files
    Optimize(OptimizeArgs),

    /// Split an existing artifact into token-budgeted chunks
    Split(SplitArgs),

    /// Split a unified diff into line-budgeted chunks
    DiffSplit(DiffSplitArgs),

    /// Paginate through a streaming context by line range
    Stream(StreamArgs),

    /// Initialize a ctxpack.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Plain,
    Manifest,
    Json,
    Markdown,
    Xml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OptimizePreset {
    Default,
    Aggressive,
    Skeleton,
}

#[derive(Parser)]
pub struct AssembleArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Additional glob patterns to ignore
    #[arg(short, long)]
    pub ignore: Vec<String>,

    /// Optimization preset to apply before formatting
    #[arg(long, value_enum, default_value_t = OptimizePreset::Default)]
    pub preset: OptimizePreset,

    /// Output format for the artifact
    #[arg(long, value_enum, default_value_t = OutputFormatArg::Plain)]
    pub format: OutputFormatArg,

    /// Output file path; stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct OptimizeArgs {
    /// Files to optimize
    pub files: Vec<PathBuf>,

    /// Optimization preset
    #[arg(long, value_enum, default_value_t = OptimizePreset::Default)]
    pub preset: OptimizePreset,

    /// Write optimized content back in place instead of to stdout
    #[arg(long)]
    pub in_place: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SplitStrategyArg {
    File,
    Token,
    Smart,
}

#[derive(Parser)]
pub struct SplitArgs {
    /// Artifact file to split (reads stdin if omitted)
    pub input: Option<PathBuf>,

    /// Maximum approximate tokens per chunk
    #[arg(long, default_value_t = 8000)]
    pub max_tokens: usize,

    /// Approximate token overlap between chunks (token strategy only)
    #[arg(long, default_value_t = 0)]
    pub overlap: usize,

    /// Split strategy
    #[arg(long, value_enum, default_value_t = SplitStrategyArg::Smart)]
    pub strategy: SplitStrategyArg,

    /// Output directory for numbered chunk files; stdout-separated if omitted
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DiffSplitArgs {
    /// Unified diff file to split (reads stdin if omitted)
    pub input: Option<PathBuf>,

    /// Maximum lines per chunk
    #[arg(long, default_value_t = 200)]
    pub max_lines: usize,

    /// Output directory for numbered chunk files; stdout-separated if omitted
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct StreamArgs {
    /// Root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Additional glob patterns to ignore
    #[arg(short, long)]
    pub ignore: Vec<String>,

    /// Line to start paginating from
    #[arg(long, default_value_t = 0)]
    pub start_line: usize,

    /// Number of lines per page (1..=1000)
    #[arg(long, default_value_t = 1000)]
    pub line_count: usize,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
