use crate::error::{RemapError, Result};
use crate::io::{self, ImportFormat};
use crate::paths;
use crate::types::{TopicFreshness, TopicKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

// ---------------------------------------------------------------------------
// Topic
// ---------------------------------------------------------------------------

/// One planned content node in the target topic map. `parent_id` links
/// topics into a tree; core topics are its pillars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: TopicKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub freshness: TopicFreshness,
}

// ---------------------------------------------------------------------------
// TopicSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSet {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

fn default_version() -> u32 {
    1
}

impl Default for TopicSet {
    fn default() -> Self {
        Self {
            version: 1,
            topics: Vec::new(),
        }
    }
}

impl TopicSet {
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = paths::topics_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let topics: TopicSet = serde_yaml::from_str(&data)?;
        Ok(topics)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::topics_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// Import a topic map export (`.yaml`/`.yml`/`.json`) and persist it.
    /// Accepts either a full document or a bare topic list.
    pub fn import(root: &Path, source: &Path) -> Result<Self> {
        let format = io::import_format(source)?;
        let data = std::fs::read_to_string(source)?;
        let topics = Self::parse_import(&data, format).map_err(|e| RemapError::InvalidImport {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;
        topics.save(root)?;
        Ok(topics)
    }

    fn parse_import(data: &str, format: ImportFormat) -> Result<Self> {
        match format {
            ImportFormat::Yaml => {
                if let Ok(doc) = serde_yaml::from_str::<TopicSet>(data) {
                    return Ok(doc);
                }
                let topics: Vec<Topic> = serde_yaml::from_str(data)?;
                Ok(TopicSet { version: 1, topics })
            }
            ImportFormat::Json => {
                if let Ok(doc) = serde_json::from_str::<TopicSet>(data) {
                    return Ok(doc);
                }
                let topics: Vec<Topic> = serde_json::from_str(data)?;
                Ok(TopicSet { version: 1, topics })
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn core_count(&self) -> usize {
        self.topics
            .iter()
            .filter(|t| t.kind == TopicKind::Core)
            .count()
    }

    /// Depth of a topic in the tree: 0 for roots and unknown ids. Safe on
    /// cyclic parent links — the walk stops when it revisits an id.
    pub fn depth_of(&self, id: &str) -> usize {
        let by_id: BTreeMap<&str, &Topic> =
            self.topics.iter().map(|t| (t.id.as_str(), t)).collect();

        let mut depth = 0;
        let mut seen = BTreeSet::new();
        let mut current = id;
        seen.insert(current);

        while let Some(parent) = by_id.get(current).and_then(|t| t.parent_id.as_deref()) {
            if !seen.insert(parent) {
                break;
            }
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Structural warnings: duplicate ids, dangling parent references, and
    /// parent cycles. None of these stop the engine, but all of them distort
    /// depth and gap reporting.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut seen = BTreeSet::new();
        for topic in &self.topics {
            if !seen.insert(topic.id.as_str()) {
                warnings.push(format!("duplicate topic id '{}'", topic.id));
            }
        }

        for topic in &self.topics {
            if let Some(parent) = &topic.parent_id {
                if self.find(parent).is_none() {
                    warnings.push(format!(
                        "topic '{}' references missing parent '{}'",
                        topic.id, parent
                    ));
                }
                if parent == &topic.id {
                    warnings.push(format!("topic '{}' is its own parent", topic.id));
                }
            }
        }

        // Cycle detection across longer parent chains
        for topic in &self.topics {
            let mut seen = BTreeSet::new();
            let mut current = topic.id.as_str();
            seen.insert(current);
            while let Some(parent) = self.find(current).and_then(|t| t.parent_id.as_deref()) {
                if !seen.insert(parent) {
                    if parent == topic.id {
                        warnings.push(format!("topic '{}' is part of a parent cycle", topic.id));
                    }
                    break;
                }
                current = parent;
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
