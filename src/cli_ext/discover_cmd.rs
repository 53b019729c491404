//! CLI command handlers for classification and context discovery.
//!
//! `classify`, `resolve`, `includers` and `wired` all open the theme the
//! same way: `--root`, else `theme_root` from config, else the nearest
//! ancestor of the file that looks like a theme, else the working
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use serde_json::json;
use tabled::{Table, Tabled};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::cli::{AppContext, ClassifyArgs, IncludersArgs, ResolveArgs, WiredArgs};
use crate::core::classify::{FileKind, classify_path};
use crate::core::context::Context;
use crate::core::discover::Discovery;
use crate::core::knowledge::KnowledgeBase;
use crate::core::manifest::ManifestScanner;
use crate::core::rank::{Candidate, Tier, rank_objects};
use crate::core::usage::{Directive, UsageScanner};
use crate::infra::config::Config;
use crate::infra::source::DiskSource;
use crate::infra::walk::FileWalker;

/// Directories whose presence marks a theme root.
const THEME_MARKERS: [&str; 4] = ["templates", "sections", "snippets", "layout"];

/// An opened theme plus the queried file relative to its root.
pub struct Theme
{
    pub discovery: Discovery<DiskSource>,
    pub file: Option<PathBuf>,
    pub config: Config,
}

fn absolute(path: &Path) -> Result<PathBuf>
{
    if path.exists()
    {
        return dunce::canonicalize(path)
            .with_context(|| format!("cannot resolve {}", path.display()));
    }
    let cwd = std::env::current_dir().context("cannot read working directory")?;
    Ok(cwd.join(path))
}

/// Nearest ancestor of `file` containing a theme marker directory.
pub fn detect_theme_root(file: &Path) -> Option<PathBuf>
{
    file.ancestors()
        .skip(1)
        .find(|dir| {
            THEME_MARKERS
                .iter()
                .any(|m| dir.join(m).is_dir())
        })
        .map(Path::to_path_buf)
}

/// Open the theme around `file` (or the configured/current root).
pub fn open_theme(
    file: Option<&Path>,
    ctx: &AppContext,
    config: Config,
) -> Result<Theme>
{
    let abs_file = file
        .map(absolute)
        .transpose()?;

    let root = match (&ctx.root, &config.theme_root, &abs_file)
    {
        (Some(root), _, _) => root.clone(),
        (None, Some(root), _) => root.clone(),
        (None, None, Some(f)) => detect_theme_root(f).unwrap_or_else(|| PathBuf::from(".")),
        (None, None, None) => PathBuf::from("."),
    };

    let walker = FileWalker::new(&config.ignore_patterns)?.with_follow_symlinks(config.follow_symlinks);
    let source = DiskSource::new(&root, walker)?;
    debug!(root = %source.root().display(), "theme opened");

    // Classification works on the root-relative path when possible.
    let file = match (abs_file, file)
    {
        (Some(abs), Some(given)) => Some(
            abs.strip_prefix(source.root())
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| given.to_path_buf()),
        ),
        _ => None,
    };

    let discovery = Discovery::new(source, config.overrides.clone());

    Ok(Theme { discovery, file, config })
}

#[derive(Tabled)]
struct ContextRow
{
    context_key: String,
    display_name: String,
}

fn print_contexts(
    contexts: &[Context],
    ctx: &AppContext,
)
{
    if contexts.is_empty()
    {
        if !ctx.quiet
        {
            println!("(no contexts)");
        }
        return;
    }

    let rows: Vec<ContextRow> = contexts
        .iter()
        .map(|c| ContextRow { context_key: c.context_key.clone(), display_name: c.display_name.clone() })
        .collect();
    println!("{}", Table::new(rows));
}

/// One line per candidate, colored by tier.
pub fn print_candidates(
    candidates: &[Candidate],
    ctx: &AppContext,
)
{
    for c in candidates
    {
        let line = format!("{:<28} {}", c.label, c.detail);
        if ctx.no_color
        {
            println!("{line}");
            continue;
        }
        match c.tier
        {
            Tier::Global => println!("{}", line.green()),
            Tier::Verified => println!("{}", line.cyan()),
            Tier::Unwired => println!("{}", line.yellow()),
        }
    }
}

pub fn classify_run(
    args: ClassifyArgs,
    _ctx: &AppContext,
) -> Result<()>
{
    let kinds: Vec<(String, FileKind)> = args
        .paths
        .iter()
        .map(|p| (p.display().to_string(), classify_path(p)))
        .collect();

    if args.json
    {
        let out: Vec<_> = kinds
            .iter()
            .map(|(path, kind)| json!({ "path": path, "kind": kind }))
            .collect();
        println!("{}", serde_json::Value::Array(out));
        return Ok(());
    }

    for (path, kind) in kinds
    {
        println!("{kind}\t{path}");
    }
    Ok(())
}

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn resolve_run(
    args: ResolveArgs,
    ctx: &AppContext,
    config: Config,
) -> Result<()>
{
    let theme = open_theme(Some(&args.file), ctx, config)?;
    let file = theme
        .file
        .clone()
        .unwrap_or_else(|| args.file.clone());
    let kind = classify_path(&file);

    let contexts = theme
        .discovery
        .resolve_file(&file, &CancellationToken::new())?;

    let objects = if args.objects
    {
        let kb = KnowledgeBase::load(&theme.config.knowledge)?;
        Some(rank_objects(&kb, kind, &contexts))
    }
    else
    {
        None
    };

    if args.json
    {
        let mut out = json!({
            "file": file.display().to_string(),
            "kind": kind,
            "contexts": contexts,
        });
        if let Some(objects) = &objects
        {
            out["objects"] = json!(objects);
        }
        println!("{out}");
        return Ok(());
    }

    if !ctx.quiet
    {
        println!("{} ({})", file.display(), kind);
    }
    print_contexts(&contexts, ctx);
    if let Some(objects) = &objects
    {
        print_candidates(objects, ctx);
    }
    Ok(())
}

pub fn includers_run(
    args: IncludersArgs,
    ctx: &AppContext,
    config: Config,
) -> Result<()>
{
    let theme = open_theme(None, ctx, config)?;
    let includers = UsageScanner::new(theme.discovery.source()).find_includers(
        &args.snippet,
        Directive::Render,
        &CancellationToken::new(),
    )?;

    if args.json
    {
        println!("{}", json!({ "snippet": args.snippet, "includers": includers }));
        return Ok(());
    }

    if includers.is_empty() && !ctx.quiet
    {
        println!("(no includers of '{}')", args.snippet);
    }
    for inc in includers
    {
        println!("{}\t{}\t{}", inc.kind, inc.name, inc.path.display());
    }
    Ok(())
}

pub fn wired_run(
    args: WiredArgs,
    ctx: &AppContext,
    config: Config,
) -> Result<()>
{
    let theme = open_theme(None, ctx, config)?;
    let contexts = ManifestScanner::new(theme.discovery.source(), &theme.config.overrides)
        .find_contexts_using(&args.fragment_type, &CancellationToken::new())?;

    if args.json
    {
        println!("{}", json!({ "type": args.fragment_type, "contexts": contexts }));
        return Ok(());
    }

    print_contexts(&contexts, ctx);
    Ok(())
}
