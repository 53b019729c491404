//! Filepath: src/core/rank.rs
//! Tiered ranking of reachable objects for presentation.
//!
//! Tiers, best first:
//! - `Global`   objects every page exposes (plus structural references of
//!   sections and blocks)
//! - `Verified` objects of contexts the discovery engine proved
//! - `Unwired`  objects of every other known context; usable only once the
//!   file is wired into such a page, so they carry a warning
//!
//! An object lands in the first tier that claims it. Final order is the
//! explicit `(tier, label)` key.

use std::collections::HashSet;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use crate::core::classify::FileKind;
use crate::core::context::{Context, GLOBAL_KEY, SETTINGS_KEY};
use crate::core::knowledge::KnowledgeBase;

/// Presentation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier
{
    Global = 0,
    Verified = 1,
    Unwired = 2,
}

impl Tier
{
    /// Short label shown next to a candidate.
    pub fn label(self) -> &'static str
    {
        match self
        {
            Tier::Global => "global",
            Tier::Verified => "verified",
            Tier::Unwired => "not wired into this page: will error if used",
        }
    }
}

/// What a candidate completes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind
{
    /// Top-level object
    Object,
    /// `section` / `block` reference of the file itself
    Structural,
    /// Property evaluating to another object
    NestedObject,
    /// Plain property
    Property,
}

/// One completion entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate
{
    pub label: String,
    pub tier: Tier,
    pub kind: CandidateKind,
    pub detail: String,
    /// Display names of the contexts that contributed this entry
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl Candidate
{
    /// Explicit ordering key.
    pub fn sort_key(&self) -> (Tier, &str)
    {
        (self.tier, self.label.as_str())
    }
}

/// Markdown docs for a top-level object.
pub fn object_docs(
    kb: &KnowledgeBase,
    name: &str,
) -> Option<String>
{
    let doc = kb.object(name)?;

    Some(format!(
        "## {name}\n---\n{}\n\n[Open documentation]({})",
        doc.description, doc.link
    ))
}

/// Accumulates candidates; the first tier to claim a label keeps it.
struct Ranking<'k>
{
    kb: &'k KnowledgeBase,
    entries: IndexMap<String, Candidate>,
}

impl<'k> Ranking<'k>
{
    fn add(
        &mut self,
        label: &str,
        tier: Tier,
        kind: CandidateKind,
        source: &str,
    )
    {
        match self
            .entries
            .entry(label.to_string())
        {
            Entry::Occupied(mut slot) =>
            {
                let existing = slot.get_mut();
                if existing.tier == tier && !existing.sources.iter().any(|s| s == source)
                {
                    existing
                        .sources
                        .push(source.to_string());
                    existing.detail = detail(tier, &existing.sources);
                }
            }
            Entry::Vacant(slot) =>
            {
                let sources = vec![source.to_string()];
                slot.insert(Candidate {
                    label: label.to_string(),
                    tier,
                    kind,
                    detail: detail(tier, &sources),
                    sources,
                    documentation: object_docs(self.kb, label),
                });
            }
        }
    }

    fn finish(self) -> Vec<Candidate>
    {
        let mut out: Vec<Candidate> = self
            .entries
            .into_values()
            .collect();
        out.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        out
    }
}

fn detail(
    tier: Tier,
    sources: &[String],
) -> String
{
    match tier
    {
        Tier::Global => "global object".to_string(),
        Tier::Verified => format!("verified in {}", sources.join(", ")),
        Tier::Unwired => format!("{} ({})", Tier::Unwired.label(), sources.join(", ")),
    }
}

/// Build the tiered candidate list for a file of `file_kind` whose
/// verified contexts are `contexts`.
pub fn rank_objects(
    kb: &KnowledgeBase,
    file_kind: FileKind,
    contexts: &[Context],
) -> Vec<Candidate>
{
    let mut ranking = Ranking { kb, entries: IndexMap::new() };
    let map = &kb.contexts;

    // Assets only see theme settings.
    if file_kind == FileKind::Asset
    {
        ranking.add(SETTINGS_KEY, Tier::Global, CandidateKind::Object, SETTINGS_KEY);
        return ranking.finish();
    }

    for global in &map.globals
    {
        ranking.add(global, Tier::Global, CandidateKind::Object, GLOBAL_KEY);
    }

    let structural: &[&str] = match file_kind
    {
        FileKind::Section => &["section"],
        FileKind::Block => &["block", "section"],
        _ => &[],
    };
    for name in structural
    {
        ranking.add(name, Tier::Global, CandidateKind::Structural, file_kind.as_str());
    }

    for context in contexts
        .iter()
        .filter(|c| !c.is_bundle())
    {
        for object in map.objects_for(&context.context_key)
        {
            ranking.add(object, Tier::Verified, CandidateKind::Object, &context.display_name);
        }
    }

    let verified: HashSet<&str> = contexts
        .iter()
        .map(|c| c.context_key.as_str())
        .collect();

    for key in map
        .context_keys()
        .filter(|k| !verified.contains(k))
    {
        for object in map.objects_for(key)
        {
            ranking.add(object, Tier::Unwired, CandidateKind::Object, key);
        }
    }

    ranking.finish()
}
