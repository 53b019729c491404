//! `complete`: candidates for the text before a cursor.

use anyhow::{Result, bail};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::cli::{AppContext, CompleteArgs};
use crate::cli_ext::discover_cmd::{open_theme, print_candidates};
use crate::core::classify::classify_path;
use crate::core::complete::{complete, parse_trigger};
use crate::core::knowledge::KnowledgeBase;
use crate::infra::io::read_text;
use crate::infra::line_index::NewlineIndex;

/// Line prefix from `--prefix`, or from the file at `--line/--column`.
fn line_prefix(args: &CompleteArgs) -> Result<String>
{
    if let Some(prefix) = &args.prefix
    {
        return Ok(prefix.clone());
    }

    let (Some(line), Some(column)) = (args.line, args.column)
    else
    {
        bail!("provide --prefix or both --line and --column");
    };

    let text = read_text(&args.file)?;
    let index = NewlineIndex::build(text.as_bytes());

    match index.line_prefix(&text, line, column)
    {
        Some(prefix) => Ok(prefix.to_string()),
        None => bail!("line {line} is outside {}", args.file.display()),
    }
}

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn run(
    args: CompleteArgs,
    ctx: &AppContext,
    config: crate::infra::config::Config,
) -> Result<()>
{
    let prefix = line_prefix(&args)?;
    let theme = open_theme(Some(&args.file), ctx, config)?;
    let file = theme
        .file
        .clone()
        .unwrap_or_else(|| args.file.clone());
    let kind = classify_path(&file);

    let kb = KnowledgeBase::load(&theme.config.knowledge)?;
    let contexts = theme
        .discovery
        .resolve_file(&file, &CancellationToken::new())?;
    let candidates = complete(&kb, kind, &contexts, &prefix);

    if args.json
    {
        println!(
            "{}",
            json!({
                "file": file.display().to_string(),
                "kind": kind,
                "trigger": parse_trigger(&prefix),
                "contexts": contexts,
                "candidates": candidates,
            })
        );
        return Ok(());
    }

    if candidates.is_empty()
    {
        if !ctx.quiet
        {
            println!("(no suggestions)");
        }
        return Ok(());
    }

    print_candidates(&candidates, ctx);
    Ok(())
}
