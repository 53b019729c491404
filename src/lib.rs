//! **themescope** - Static context discovery for Liquid storefront themes
//!
//! Given a template file, works out which runtime objects are reachable
//! there: classifies the file by location, walks the snippet inclusion
//! graph, cross-references JSON template manifests, and ranks the result
//! into global / verified / unwired tiers for completion.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Context discovery engine
pub mod core {
    /// Path → structural kind
    pub mod classify;
    pub use classify::{FileKind, classify, classify_path};

    /// Context values and the per-query accumulator
    pub mod context;
    pub use context::{Context, ContextSet};

    /// Static context map and object documentation
    pub mod knowledge;
    pub use knowledge::{KnowledgeBase, StaticContextMap};

    /// JSON template manifest scanner
    pub mod manifest;
    pub use manifest::ManifestScanner;

    /// Snippet inclusion graph
    pub mod usage;
    pub use usage::{Directive, Includer, UsageScanner};

    /// Orchestrator: verified contexts for one file
    pub mod discover;
    pub use discover::{Discovery, DiscoveryError};

    /// Tiered object ranking
    pub mod rank;
    pub use rank::{Candidate, Tier, rank_objects};

    /// Trigger parsing and member completion
    pub mod complete;
    pub use complete::{Trigger, complete, parse_trigger};
}

/// Command handlers
pub mod cli_ext {
    /// classify / resolve / includers / wired
    pub mod discover_cmd;

    /// complete
    pub mod complete_cmd;
}

/// Infrastructure - configuration, logging, file access
pub mod infra {
    /// Configuration management with TOML support and override rules
    pub mod config;
    pub use config::{Config, OverrideRule, init as config_init, load_config};

    /// Memory-mapped file I/O for large files (>1MB threshold)
    pub mod io;

    /// CRLF/LF-robust line indexing for cursor → line prefix
    pub mod line_index;
    pub use line_index::NewlineIndex;

    /// tracing-subscriber setup
    pub mod logging;

    /// `ThemeSource` capability: disk and in-memory
    pub mod source;
    pub use source::{DiskSource, MemorySource, ThemeSource};

    /// Gitignore-aware directory walking
    pub mod walk;
    pub use walk::FileWalker;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{Context, Discovery, FileKind, KnowledgeBase, classify};
pub use infra::{Config, MemorySource, ThemeSource, load_config};
