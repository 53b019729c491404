use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,             // global --quiet
    pub no_color: bool,          // global --no-color
    pub root: Option<PathBuf>,   // global --root
}

#[derive(Parser)]
#[command(name = "themescope")]
#[command(
    about = "Static context discovery for Liquid themes: which objects a template file can reach"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Theme root (auto-detected from the file when omitted)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Log filter (e.g. "debug", "themescope=trace"); RUST_LOG wins
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the structural kind of each path
    Classify(ClassifyArgs),

    /// Resolve the verified contexts of a theme file
    Resolve(ResolveArgs),

    /// List the files that render a snippet
    Includers(IncludersArgs),

    /// List the page contexts whose manifests use a section or block type
    Wired(WiredArgs),

    /// Completion candidates at a cursor position
    Complete(CompleteArgs),

    /// Initialize a themescope.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// Paths to classify (need not exist)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ResolveArgs {
    /// Theme file to resolve
    pub file: PathBuf,

    /// Also print the tiered object ranking
    #[arg(long)]
    pub objects: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct IncludersArgs {
    /// Snippet name (file stem, e.g. "price")
    pub snippet: String,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct WiredArgs {
    /// Section or block type (e.g. "hero")
    pub fragment_type: String,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CompleteArgs {
    /// Theme file being edited
    pub file: PathBuf,

    /// Text of the current line before the cursor
    #[arg(long, conflicts_with_all = ["line", "column"])]
    pub prefix: Option<String>,

    /// 1-based cursor line (read from the file)
    #[arg(long, requires = "column")]
    pub line: Option<usize>,

    /// 0-based cursor column in characters
    #[arg(long, requires = "line")]
    pub column: Option<usize>,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to write themescope.toml into
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Directory for the generated completion file
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}
