use crate::error::{RemapError, Result};
use crate::io::{self, ImportFormat};
use crate::paths;
use crate::types::{MatchCategory, MatchSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// InventoryItem
// ---------------------------------------------------------------------------

/// One crawled page of the existing site. The crawl fields are read-only
/// input; the disposition fields at the bottom are written by batch-confirm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub monthly_clicks: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped_topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_category: Option<MatchCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_source: Option<MatchSource>,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

fn default_version() -> u32 {
    1
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            version: 1,
            items: Vec::new(),
        }
    }
}

impl Inventory {
    /// Load the project inventory; an absent file is an empty inventory,
    /// not an error.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = paths::inventory_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let inventory: Inventory = serde_yaml::from_str(&data)?;
        Ok(inventory)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::inventory_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    /// Import a crawl export (`.yaml`/`.yml`/`.json`) and persist it as the
    /// project inventory. Accepts either a full document or a bare item list.
    pub fn import(root: &Path, source: &Path) -> Result<Self> {
        let format = io::import_format(source)?;
        let data = std::fs::read_to_string(source)?;
        let inventory = Self::parse_import(&data, format).map_err(|e| RemapError::InvalidImport {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;
        inventory.save(root)?;
        Ok(inventory)
    }

    fn parse_import(data: &str, format: ImportFormat) -> Result<Self> {
        match format {
            ImportFormat::Yaml => {
                if let Ok(doc) = serde_yaml::from_str::<Inventory>(data) {
                    return Ok(doc);
                }
                let items: Vec<InventoryItem> = serde_yaml::from_str(data)?;
                Ok(Inventory { version: 1, items })
            }
            ImportFormat::Json => {
                if let Ok(doc) = serde_json::from_str::<Inventory>(data) {
                    return Ok(doc);
                }
                let items: Vec<InventoryItem> = serde_json::from_str(data)?;
                Ok(Inventory { version: 1, items })
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut InventoryItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Number of items with a confirmed topic mapping.
    pub fn mapped_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.mapped_topic_id.is_some())
            .count()
    }
}

// ---------------------------------------------------------------------------
// Query signals
// ---------------------------------------------------------------------------

/// One search query a URL currently ranks for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySignal {
    pub query: String,
    #[serde(default)]
    pub monthly_clicks: u64,
}

/// Per-URL top search queries, an optional input to matching. Keyed by the
/// exact URL as crawled; lists are capped to the top entries by volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySignalTable {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub urls: BTreeMap<String, Vec<QuerySignal>>,
}

impl Default for QuerySignalTable {
    fn default() -> Self {
        Self {
            version: 1,
            urls: BTreeMap::new(),
        }
    }
}

impl QuerySignalTable {
    pub const MAX_QUERIES_PER_URL: usize = 10;

    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = paths::signals_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let mut table: QuerySignalTable = serde_yaml::from_str(&data)?;
        table.apply_cap();
        Ok(table)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::signals_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    pub fn import(root: &Path, source: &Path) -> Result<Self> {
        let format = io::import_format(source)?;
        let data = std::fs::read_to_string(source)?;
        let mut table: QuerySignalTable = match format {
            ImportFormat::Yaml => serde_yaml::from_str(&data)?,
            ImportFormat::Json => serde_json::from_str(&data)?,
        };
        table.apply_cap();
        table.save(root)?;
        Ok(table)
    }

    pub fn queries_for(&self, url: &str) -> Option<&[QuerySignal]> {
        self.urls.get(url).map(|v| v.as_slice())
    }

    /// Keep at most MAX_QUERIES_PER_URL queries per URL, highest volume
    /// first. Sorting before truncating makes the cap independent of the
    /// order the exporter wrote the list in.
    fn apply_cap(&mut self) {
        for queries in self.urls.values_mut() {
            queries.sort_by(|a, b| {
                b.monthly_clicks
                    .cmp(&a.monthly_clicks)
                    .then_with(|| a.query.cmp(&b.query))
            });
            queries.truncate(Self::MAX_QUERIES_PER_URL);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
