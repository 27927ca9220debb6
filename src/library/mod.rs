pub mod knowledge;
pub mod store;

pub use knowledge::{InsightFilter, KnowledgeBundle, KnowledgeLibrary, KnowledgeStats, StoredInsight};
pub use store::{JsonFileStore, MemoryStore, Store};

use crate::constants::{EXPORT_VERSION, LIBRARY_NAMESPACE};
use crate::models::{deserialize_id, Analysis, Energy};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Fresh record id and RFC 3339 timestamp
pub(crate) fn new_record_stamp() -> (String, String) {
    (uuid::Uuid::new_v4().to_string(), chrono::Utc::now().to_rfc3339())
}

/// A cataloged analysis with its record metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub analysis: Analysis,
}

impl CatalogEntry {
    fn matches_query(&self, lower: &str) -> bool {
        let a = &self.analysis;
        a.name.to_lowercase().contains(lower)
            || a.description.to_lowercase().contains(lower)
            || a.filename.to_lowercase().contains(lower)
            || a.tags.iter().any(|tag| tag.to_lowercase().contains(lower))
    }
}

/// User edits applied to an entry; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub energy: Option<Energy>,
    pub tags: Option<Vec<String>>,
    pub best_for: Option<String>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnergyFilter {
    #[default]
    All,
    Only(Energy),
}

impl FromStr for EnergyFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(EnergyFilter::All);
        }
        s.parse::<Energy>().map(EnergyFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total: usize,
    pub energetic: usize,
    pub flowing: usize,
    pub calm: usize,
    pub focused: usize,
    pub spiral: usize,
}

impl LibraryStats {
    pub fn count(&self, energy: Energy) -> usize {
        match energy {
            Energy::Energetic => self.energetic,
            Energy::Flowing => self.flowing,
            Energy::Calm => self.calm,
            Energy::Focused => self.focused,
            Energy::Spiral => self.spiral,
        }
    }
}

/// Portable snapshot of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryBundle {
    pub version: String,
    pub timestamp: String,
    pub stats: LibraryStats,
    pub apps: Vec<CatalogEntry>,
}

/// The app catalog, persisted under its own store namespace.
/// Every mutation is saved immediately.
pub struct Library {
    store: Arc<dyn Store>,
    entries: Vec<CatalogEntry>,
}

impl Library {
    /// Load the catalog from `store`. Unreadable state is logged and
    /// replaced by an empty catalog.
    pub fn open(store: Arc<dyn Store>) -> Self {
        let entries = match store.load(LIBRARY_NAMESPACE) {
            Ok(Some(value)) => match serde_json::from_value::<Vec<CatalogEntry>>(value) {
                Ok(entries) => {
                    info!("Loaded {} apps from library", entries.len());
                    entries
                }
                Err(e) => {
                    warn!("Failed to load library, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to load library, starting empty: {:#}", e);
                Vec::new()
            }
        };

        Self { store, entries }
    }

    fn save(&self) -> Result<()> {
        let value = serde_json::to_value(&self.entries).context("Failed to serialize library")?;
        self.store.save(LIBRARY_NAMESPACE, &value)?;
        info!("Saved {} apps to library", self.entries.len());
        Ok(())
    }

    /// Catalog an analysis and return its new id
    pub fn add(&mut self, analysis: Analysis) -> Result<String> {
        let (id, timestamp) = new_record_stamp();
        self.entries.push(CatalogEntry {
            id: id.clone(),
            timestamp,
            analysis,
        });
        self.save()?;
        Ok(id)
    }

    /// Apply `update` to entry `id`. Returns false if no such entry exists.
    pub fn update(&mut self, id: &str, update: EntryUpdate) -> Result<bool> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(false);
        };

        let analysis = &mut entry.analysis;
        if let Some(name) = update.name {
            analysis.name = name;
        }
        if let Some(description) = update.description {
            analysis.description = description;
        }
        if let Some(energy) = update.energy {
            analysis.energy = energy;
        }
        if let Some(tags) = update.tags {
            analysis.tags = crate::pipeline::merge_tags(&tags, &[]);
        }
        if let Some(best_for) = update.best_for {
            analysis.best_for = best_for;
        }

        self.save()?;
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        self.entries.remove(index);
        self.save()?;
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn all(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filter(&self, filter: EnergyFilter) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| match filter {
                EnergyFilter::All => true,
                EnergyFilter::Only(energy) => e.analysis.energy == energy,
            })
            .collect()
    }

    /// Case-insensitive search over name, description, filename and tags.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let lower = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| lower.is_empty() || e.matches_query(&lower))
            .collect()
    }

    /// Whether an entry with this content hash is already cataloged
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.entries.iter().any(|e| e.analysis.content_hash == hash)
    }

    pub fn stats(&self) -> LibraryStats {
        let mut stats = LibraryStats {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            match entry.analysis.energy {
                Energy::Energetic => stats.energetic += 1,
                Energy::Flowing => stats.flowing += 1,
                Energy::Calm => stats.calm += 1,
                Energy::Focused => stats.focused += 1,
                Energy::Spiral => stats.spiral += 1,
            }
        }
        stats
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    pub fn export(&self) -> LibraryBundle {
        LibraryBundle {
            version: EXPORT_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            stats: self.stats(),
            apps: self.entries.clone(),
        }
    }

    /// Replace the catalog with the `apps` array of an exported bundle.
    ///
    /// Every entry is validated before anything is replaced; entries without
    /// an id or timestamp get fresh ones.
    pub fn import(&mut self, data: Value) -> Result<usize> {
        let Some(apps) = data.get("apps").filter(|apps| apps.is_array()) else {
            bail!("Import data has no `apps` array");
        };

        let mut entries: Vec<CatalogEntry> =
            serde_json::from_value(apps.clone()).context("Import data contains invalid app entries")?;
        for entry in &mut entries {
            if entry.id.is_empty() || entry.timestamp.is_empty() {
                let (id, timestamp) = new_record_stamp();
                if entry.id.is_empty() {
                    entry.id = id;
                }
                if entry.timestamp.is_empty() {
                    entry.timestamp = timestamp;
                }
            }
            if entry.analysis.content_hash.is_empty() && !entry.analysis.content.is_empty() {
                entry.analysis.content_hash = crate::utils::content_hash(&entry.analysis.content);
            }
        }

        self.entries = entries;
        self.save()?;
        Ok(self.entries.len())
    }
}
