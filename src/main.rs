use anyhow::Result;
use clap::Parser;
use themescope::cli::{AppContext, Cli, Commands};
use themescope::cli_ext::{complete_cmd, discover_cmd};
use themescope::infra::{config, logging};
use tracing::warn;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken config file falls back to defaults, reported once logging is up
    let (cfg, cfg_error) = match config::load_config() {
        Ok(cfg) => (cfg, None),
        Err(err) => (config::Config::default(), Some(err)),
    };
    logging::init(cli.log_level.as_deref(), &cfg.logging, !cli.no_color)?;
    if let Some(err) = cfg_error {
        warn!(error = %format!("{err:#}"), "config ignored, using defaults");
    }

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        root: cli.root,
    };

    match cli.command {
        Commands::Classify(args) => discover_cmd::classify_run(args, &ctx),
        Commands::Resolve(args) => discover_cmd::resolve_run(args, &ctx, cfg),
        Commands::Includers(args) => discover_cmd::includers_run(args, &ctx, cfg),
        Commands::Wired(args) => discover_cmd::wired_run(args, &ctx, cfg),
        Commands::Complete(args) => complete_cmd::run(args, &ctx, cfg),
        Commands::Init(args) => themescope::infra::config::init(args, &ctx),
        Commands::Completions(args) => themescope::completion::run(args, &ctx),
    }
}
