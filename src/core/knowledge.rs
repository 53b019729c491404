//! Filepath: src/core/knowledge.rs
//! Read-only knowledge base: which objects exist where, and their docs.
//!
//! Two JSON documents feed it:
//! - the static context map `{ globals: [..], template_map: { key: [..] } }`
//! - the object database `{ name: { description, link, properties } }`
//!
//! Built-in copies are embedded at compile time; config may point at
//! replacements. Loaded once per process and never mutated afterwards.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::infra::config::KnowledgeConfig;

const BUILTIN_CONTEXT_MAP: &str = include_str!("../../data/context_map.json");
const BUILTIN_OBJECTS: &str = include_str!("../../data/objects.json");

/// Knowledge base loading failures. Query-time lookups never fail.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError
{
    #[error("failed to read {path}")]
    Read
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {what}")]
    Parse
    {
        what: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Global object names and the per-context object bundles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticContextMap
{
    #[serde(default)]
    pub globals: Vec<String>,

    #[serde(default)]
    pub template_map: IndexMap<String, Vec<String>>,
}

impl StaticContextMap
{
    /// Objects exposed by `context_key`; empty when unknown.
    pub fn objects_for(
        &self,
        context_key: &str,
    ) -> &[String]
    {
        self.template_map
            .get(context_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn context_keys(&self) -> impl Iterator<Item = &str>
    {
        self.template_map
            .keys()
            .map(String::as_str)
    }
}

/// Documentation for one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDoc
{
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDoc>,
}

/// Documentation for one property of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDoc
{
    pub description: String,
    pub link: String,

    /// Name of the object this property evaluates to, when it nests.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_value: Option<serde_json::Value>,
}

impl PropertyDoc
{
    /// Mock value rendered for display (strings unquoted).
    pub fn mock_display(&self) -> Option<String>
    {
        self.mock_value
            .as_ref()
            .map(|v| {
                match v
                {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                }
            })
    }
}

/// The whole read-only knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase
{
    pub contexts: StaticContextMap,
    pub objects: IndexMap<String, ObjectDoc>,
}

impl KnowledgeBase
{
    /// Data embedded in the binary.
    pub fn builtin() -> Result<Self, KnowledgeError>
    {
        Self::from_json(BUILTIN_CONTEXT_MAP, BUILTIN_OBJECTS)
    }

    pub fn from_json(
        context_map: &str,
        objects: &str,
    ) -> Result<Self, KnowledgeError>
    {
        let contexts = serde_json::from_str(context_map).map_err(|source| {
            KnowledgeError::Parse { what: "context map".to_string(), source }
        })?;
        let objects = serde_json::from_str(objects).map_err(|source| {
            KnowledgeError::Parse { what: "object database".to_string(), source }
        })?;

        Ok(Self { contexts, objects })
    }

    /// Built-in data with any configured file replacing its counterpart.
    pub fn load(config: &KnowledgeConfig) -> Result<Self, KnowledgeError>
    {
        if config.context_map.is_none() && config.objects.is_none()
        {
            return Self::builtin();
        }

        let context_map = match &config.context_map
        {
            Some(path) => read(path)?,
            None => BUILTIN_CONTEXT_MAP.to_string(),
        };
        let objects = match &config.objects
        {
            Some(path) => read(path)?,
            None => BUILTIN_OBJECTS.to_string(),
        };

        let kb = Self::from_json(&context_map, &objects)?;
        debug!(
            globals = kb
                .contexts
                .globals
                .len(),
            contexts = kb
                .contexts
                .template_map
                .len(),
            objects = kb
                .objects
                .len(),
            "knowledge base loaded"
        );

        Ok(kb)
    }

    pub fn object(
        &self,
        name: &str,
    ) -> Option<&ObjectDoc>
    {
        self.objects
            .get(name)
    }
}

fn read(path: &Path) -> Result<String, KnowledgeError>
{
    std::fs::read_to_string(path)
        .map_err(|source| KnowledgeError::Read { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_builtin_parses_and_is_consistent()
    {
        let kb = KnowledgeBase::builtin().unwrap();

        assert!(
            kb.contexts
                .globals
                .contains(&"shop".to_string())
        );
        assert_eq!(kb.contexts.objects_for("product")[0], "product");
        assert!(
            kb.contexts
                .objects_for("nope")
                .is_empty()
        );

        // Every property type points at a documented object.
        for (name, doc) in &kb.objects
        {
            for (prop, p) in &doc.properties
            {
                if let Some(t) = &p.object_type
                {
                    assert!(kb.object(t).is_some(), "{name}.{prop} -> missing {t}");
                }
            }
        }
    }

    #[test]
    fn test_override_file_replaces_builtin()
    {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("map.json");
        std::fs::write(&path, r#"{"globals":["shop"],"template_map":{"page":["page"]}}"#).unwrap();

        let kb = KnowledgeBase::load(&KnowledgeConfig { context_map: Some(path), objects: None })
            .unwrap();

        assert_eq!(kb.contexts.globals, vec!["shop".to_string()]);
        assert_eq!(
            kb.contexts
                .context_keys()
                .collect::<Vec<_>>(),
            vec!["page"]
        );
        assert!(kb.object("product").is_some());
    }

    #[test]
    fn test_malformed_and_missing_files_error()
    {
        assert!(matches!(
            KnowledgeBase::from_json("{", "{}"),
            Err(KnowledgeError::Parse { .. })
        ));

        let missing = KnowledgeConfig {
            context_map: Some(PathBuf::from("/no/such/map.json")),
            objects: None,
        };
        assert!(matches!(KnowledgeBase::load(&missing), Err(KnowledgeError::Read { .. })));
    }

    #[test]
    fn test_mock_display()
    {
        let kb = KnowledgeBase::builtin().unwrap();
        let title = &kb
            .object("product")
            .unwrap()
            .properties["title"];
        assert_eq!(title.mock_display().as_deref(), Some("Health potion"));
    }
}
