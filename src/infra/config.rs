use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Theme root; auto-detected from the queried file when unset
    pub theme_root: Option<PathBuf>,

    /// Extra ignore patterns (in addition to .gitignore)
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links while walking the theme
    pub follow_symlinks: bool,

    /// Knowledge base locations (built-in data when unset)
    pub knowledge: KnowledgeConfig,

    /// Fixed-context override rules
    pub overrides: Vec<OverrideRule>,

    /// Diagnostics output
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig
{
    /// `{ globals, template_map }` JSON file
    pub context_map: Option<PathBuf>,

    /// Object documentation JSON file
    pub objects: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig
{
    /// Default filter directive when RUST_LOG is unset
    pub level: String,

    /// "text" or "json"
    pub format: String,
}

/// A rule that pins a fixed context key onto matching files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverrideRule
{
    /// Manifests whose path contains `segment` resolve to `context_key`
    /// regardless of their file name.
    ManifestSegment
    {
        segment: String,
        context_key: String,
    },

    /// Files whose stem matches one of `stems` (case-insensitive, `-` and
    /// `_` interchangeable) always expose `context_key`.
    FileStem
    {
        stems: Vec<String>,
        context_key: String,
    },
}

impl OverrideRule
{
    /// Built-in rules for the storefront's catch-all and API contexts.
    pub fn defaults() -> Vec<OverrideRule>
    {
        vec![
            OverrideRule::ManifestSegment {
                segment: "templates/metaobject/".to_string(),
                context_key: "metaobject".to_string(),
            },
            OverrideRule::FileStem {
                stems: vec!["predictive_search".to_string()],
                context_key: "predictive_search".to_string(),
            },
        ]
    }
}

impl Default for LoggingConfig
{
    fn default() -> Self
    {
        Self { level: "warn".to_string(), format: "text".to_string() }
    }
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            theme_root: None,
            ignore_patterns: vec![
                "node_modules/".to_string(),
                ".git/".to_string(),
                ".shopify/".to_string(),
                "dist/".to_string(),
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
            ],
            follow_symlinks: false,
            knowledge: KnowledgeConfig::default(),
            overrides: OverrideRule::defaults(),
            logging: LoggingConfig::default(),
        }
    }
}

pub fn load_config() -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["themescope.toml", "themescope.yaml", "themescope.json", ".themescope.toml"];

    for path in &config_paths
    {
        if Path::new(path).exists()
        {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with THEMESCOPE_ prefix
    builder = builder.add_source(
        config::Environment::with_prefix("THEMESCOPE")
            .prefix_separator("_")
            .separator("__"),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join("themescope.toml");

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
