//! Filepath: src/core/complete.rs
//! Completion entry point: trigger detection and member lookup.
//!
//! Two triggers are recognised on the text before the cursor:
//! - `obj.` / `obj.prop.` (member access) → properties of the object the
//!   path evaluates to, following each property's `type`
//! - a bare identifier → tier-ranked objects reachable in this file

use serde::Serialize;

use crate::core::classify::FileKind;
use crate::core::context::Context;
use crate::core::knowledge::{KnowledgeBase, ObjectDoc};
use crate::core::rank::{Candidate, CandidateKind, Tier, rank_objects};

/// What the user is typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum Trigger
{
    /// `product.featured_image.al` → path `[product, featured_image]`,
    /// partial `al`
    Member
    {
        path: Vec<String>,
        partial: String,
    },
    /// Bare identifier (possibly empty right after `{{ `)
    Object
    {
        partial: String,
    },
    None,
}

fn is_ident_char(c: char) -> bool
{
    c.is_alphanumeric() || matches!(c, '_' | '-' | '?' | '.')
}

/// Classify the text before the cursor.
pub fn parse_trigger(line_prefix: &str) -> Trigger
{
    let token_start = line_prefix
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(line_prefix.len());
    let token = &line_prefix[token_start..];

    match token.rsplit_once('.')
    {
        Some((head, partial)) =>
        {
            let path: Vec<String> = head
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();

            if path.is_empty()
            {
                return Trigger::None;
            }
            Trigger::Member { path, partial: partial.to_string() }
        }
        None if !line_prefix
            .trim()
            .is_empty() =>
        {
            Trigger::Object { partial: token.to_string() }
        }
        None => Trigger::None,
    }
}

/// The object a member path evaluates to.
/// Follows property `type` links from the root; when the chain breaks,
/// falls back to looking the last segment up directly.
pub fn resolve_member<'k>(
    kb: &'k KnowledgeBase,
    path: &[String],
) -> Option<(&'k str, &'k ObjectDoc)>
{
    let chained = path
        .split_first()
        .and_then(|(root, rest)| {
            let (mut name, mut doc) = kb
                .objects
                .get_key_value(root.as_str())?;

            for segment in rest
            {
                let object_type = doc
                    .properties
                    .get(segment)?
                    .object_type
                    .as_deref()?;
                (name, doc) = kb
                    .objects
                    .get_key_value(object_type)?;
            }

            Some((name.as_str(), doc))
        });

    chained.or_else(|| {
        let last = path.last()?;
        kb.objects
            .get_key_value(last.as_str())
            .map(|(name, doc)| (name.as_str(), doc))
    })
}

fn starts_with_ignore_case(
    label: &str,
    partial: &str,
) -> bool
{
    label
        .to_lowercase()
        .starts_with(&partial.to_lowercase())
}

/// Property candidates for a member trigger.
fn member_candidates(
    kb: &KnowledgeBase,
    path: &[String],
    partial: &str,
    root_tier: Tier,
) -> Vec<Candidate>
{
    let Some((object_name, doc)) = resolve_member(kb, path)
    else
    {
        return Vec::new();
    };
    let written = path.join(".");

    doc.properties
        .iter()
        .filter(|(key, _)| starts_with_ignore_case(key, partial))
        .map(|(key, prop)| {
            let (kind, detail) = match &prop.object_type
            {
                Some(t) => (CandidateKind::NestedObject, format!("(Object: {t})")),
                None => (CandidateKind::Property, "(Property)".to_string()),
            };

            let mut docs = format!(
                "### {key}\n---\n{}\n\n**Usage:**\n```liquid\n{{{{ {written}.{key} }}}}\n```\n",
                prop.description
            );
            if let Some(mock) = prop.mock_display()
            {
                docs.push_str(&format!("\nExample value: `{mock}`\n"));
            }
            docs.push_str(&format!("\n---\n[View reference]({}{})", doc.link, prop.link));

            Candidate {
                label: key.clone(),
                tier: root_tier,
                kind,
                detail,
                sources: vec![object_name.to_string()],
                documentation: Some(docs),
            }
        })
        .collect()
}

/// Completion candidates for the text before the cursor in a file of
/// `file_kind` with verified `contexts`. No suggestion is an empty list.
pub fn complete(
    kb: &KnowledgeBase,
    file_kind: FileKind,
    contexts: &[Context],
    line_prefix: &str,
) -> Vec<Candidate>
{
    match parse_trigger(line_prefix)
    {
        Trigger::Member { path, partial } =>
        {
            // Properties inherit the standing of their root object.
            let root_tier = rank_objects(kb, file_kind, contexts)
                .into_iter()
                .find(|c| c.label == path[0])
                .map(|c| c.tier)
                .unwrap_or(Tier::Global);

            member_candidates(kb, &path, &partial, root_tier)
        }
        Trigger::Object { partial } => rank_objects(kb, file_kind, contexts)
            .into_iter()
            .filter(|c| starts_with_ignore_case(&c.label, &partial))
            .collect(),
        Trigger::None => Vec::new(),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn member(
        path: &[&str],
        partial: &str,
    ) -> Trigger
    {
        Trigger::Member {
            path: path
                .iter()
                .map(|s| s.to_string())
                .collect(),
            partial: partial.to_string(),
        }
    }

    #[test]
    fn test_parse_trigger()
    {
        assert_eq!(parse_trigger("{{ product."), member(&["product"], ""));
        assert_eq!(parse_trigger("{%- if product.featured_image.al"), member(&["product", "featured_image"], "al"));
        assert_eq!(parse_trigger("{{ prod"), Trigger::Object { partial: "prod".to_string() });
        assert_eq!(parse_trigger("{{ "), Trigger::Object { partial: String::new() });
        assert_eq!(parse_trigger("   "), Trigger::None);
        assert_eq!(parse_trigger(""), Trigger::None);
        assert_eq!(parse_trigger("{{ ."), Trigger::None);
    }

    #[test]
    fn test_member_follows_types()
    {
        let kb = KnowledgeBase::builtin().unwrap();
        let path = vec!["product".to_string(), "featured_image".to_string()];

        let (name, _) = resolve_member(&kb, &path).unwrap();
        assert_eq!(name, "image");

        // Loop variables fall back to a direct lookup of the last segment.
        let (name, _) = resolve_member(&kb, &["item".to_string(), "variant".to_string()]).unwrap();
        assert_eq!(name, "variant");

        assert!(resolve_member(&kb, &["nothing".to_string()]).is_none());
    }

    #[test]
    fn test_member_candidates_docs_and_kinds()
    {
        let kb = KnowledgeBase::builtin().unwrap();
        let contexts = vec![Context::global(), Context::from_name("product")];

        let found = complete(&kb, FileKind::Template, &contexts, "{{ product.");
        let title = found
            .iter()
            .find(|c| c.label == "title")
            .unwrap();
        assert_eq!(title.kind, CandidateKind::Property);
        assert_eq!(title.tier, Tier::Verified);
        let docs = title
            .documentation
            .as_deref()
            .unwrap();
        assert!(docs.contains("{{ product.title }}"));
        assert!(docs.contains("Health potion"));
        assert!(docs.contains("https://shopify.dev/docs/api/liquid/objects/product#product-title"));

        let image = found
            .iter()
            .find(|c| c.label == "featured_image")
            .unwrap();
        assert_eq!(image.kind, CandidateKind::NestedObject);
        assert_eq!(image.detail, "(Object: image)");
    }

    #[test]
    fn test_member_on_unwired_root_carries_warning_tier()
    {
        let kb = KnowledgeBase::builtin().unwrap();
        let found = complete(&kb, FileKind::Snippet, &[], "{{ collection.ti");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label, "title");
        assert_eq!(found[0].tier, Tier::Unwired);
    }

    #[test]
    fn test_object_trigger_filters_ranked()
    {
        let kb = KnowledgeBase::builtin().unwrap();
        let found = complete(&kb, FileKind::Template, &[Context::from_name("product")], "{{ pro");

        let labels: Vec<_> = found
            .iter()
            .map(|c| c.label.as_str())
            .collect();
        assert_eq!(labels, vec!["product"]);
        assert!(complete(&kb, FileKind::Template, &[], "{{ unknown_thing.").is_empty());
    }
}
