use crate::constants::{EXPORT_VERSION, KNOWLEDGE_NAMESPACE};
use crate::library::{new_record_stamp, Store};
use crate::models::{deserialize_id, Book, Insight};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// An insight with its record metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInsight {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub insight: Insight,
}

/// Conjunctive insight filter; unset criteria match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightFilter {
    pub gate: Option<u8>,
    pub line: Option<u8>,
    pub concept: Option<String>,
}

impl InsightFilter {
    fn matches(&self, insight: &Insight) -> bool {
        self.gate.map_or(true, |gate| insight.gate == Some(gate))
            && self.line.map_or(true, |line| insight.line == Some(line))
            && self.concept.as_deref().map_or(true, |concept| {
                let concept = concept.to_lowercase();
                insight.concepts.iter().any(|c| c.to_lowercase() == concept)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeStats {
    pub total_books: usize,
    pub total_insights: usize,
    pub total_gates: usize,
    pub total_concepts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBundle {
    pub version: String,
    pub timestamp: String,
    pub stats: KnowledgeStats,
    pub books: Vec<Book>,
    pub insights: Vec<StoredInsight>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Persisted {
    books: Vec<Book>,
    insights: Vec<StoredInsight>,
}

#[derive(Serialize)]
struct PersistedRef<'a> {
    books: &'a [Book],
    insights: &'a [StoredInsight],
}

/// Books and their insights, indexed by gate and by concept
pub struct KnowledgeLibrary {
    store: Arc<dyn Store>,
    books: Vec<Book>,
    insights: Vec<StoredInsight>,
    /// Gate number to positions in `insights`
    gate_index: BTreeMap<u8, Vec<usize>>,
    /// Lowercased concept to positions in `insights`
    concept_index: BTreeMap<String, Vec<usize>>,
}

impl KnowledgeLibrary {
    /// Load from `store`; unreadable state is logged and replaced by an empty library
    pub fn open(store: Arc<dyn Store>) -> Self {
        let persisted = match store.load(KNOWLEDGE_NAMESPACE) {
            Ok(Some(value)) => serde_json::from_value::<Persisted>(value).unwrap_or_else(|e| {
                warn!("Failed to load knowledge, starting empty: {}", e);
                Persisted::default()
            }),
            Ok(None) => Persisted::default(),
            Err(e) => {
                warn!("Failed to load knowledge, starting empty: {:#}", e);
                Persisted::default()
            }
        };

        let mut library = Self {
            store,
            books: persisted.books,
            insights: persisted.insights,
            gate_index: BTreeMap::new(),
            concept_index: BTreeMap::new(),
        };
        library.rebuild_indexes();
        info!(
            "Loaded {} books, {} insights",
            library.books.len(),
            library.insights.len()
        );
        library
    }

    fn save(&self) -> Result<()> {
        let value = serde_json::to_value(PersistedRef {
            books: &self.books,
            insights: &self.insights,
        })
        .context("Failed to serialize knowledge")?;
        self.store.save(KNOWLEDGE_NAMESPACE, &value)?;
        info!("Saved {} books, {} insights", self.books.len(), self.insights.len());
        Ok(())
    }

    fn index_insight(&mut self, position: usize) {
        let insight = &self.insights[position].insight;
        if let Some(gate) = insight.gate {
            self.gate_index.entry(gate).or_default().push(position);
        }
        for concept in &insight.concepts {
            let positions = self.concept_index.entry(concept.to_lowercase()).or_default();
            if !positions.contains(&position) {
                positions.push(position);
            }
        }
    }

    pub fn rebuild_indexes(&mut self) {
        self.gate_index.clear();
        self.concept_index.clear();
        for position in 0..self.insights.len() {
            self.index_insight(position);
        }
    }

    /// Store a book, keeping its id if it already has one
    pub fn add_book(&mut self, mut book: Book) -> Result<String> {
        let (id, timestamp) = new_record_stamp();
        if book.id.is_empty() {
            book.id = id;
        }
        if book.timestamp.is_empty() {
            book.timestamp = timestamp;
        }
        let id = book.id.clone();
        self.books.push(book);
        self.save()?;
        Ok(id)
    }

    fn push_insight(&mut self, insight: Insight) -> String {
        let (id, timestamp) = new_record_stamp();
        self.insights.push(StoredInsight {
            id: id.clone(),
            timestamp,
            insight,
        });
        self.index_insight(self.insights.len() - 1);
        id
    }

    pub fn add_insight(&mut self, insight: Insight) -> Result<String> {
        let id = self.push_insight(insight);
        self.save()?;
        Ok(id)
    }

    /// Add a batch with a single save
    pub fn add_insights(&mut self, insights: Vec<Insight>) -> Result<Vec<String>> {
        let ids: Vec<String> = insights.into_iter().map(|i| self.push_insight(i)).collect();
        self.save()?;
        Ok(ids)
    }

    fn at(&self, positions: Option<&Vec<usize>>) -> Vec<&StoredInsight> {
        positions
            .map(|positions| positions.iter().map(|&p| &self.insights[p]).collect())
            .unwrap_or_default()
    }

    pub fn by_gate(&self, gate: u8) -> Vec<&StoredInsight> {
        self.at(self.gate_index.get(&gate))
    }

    /// Insights of `gate`, narrowed to `line` when given
    pub fn by_gate_line(&self, gate: u8, line: Option<u8>) -> Vec<&StoredInsight> {
        let insights = self.by_gate(gate);
        match line {
            Some(line) => insights.into_iter().filter(|s| s.insight.line == Some(line)).collect(),
            None => insights,
        }
    }

    pub fn by_concept(&self, concept: &str) -> Vec<&StoredInsight> {
        self.at(self.concept_index.get(&concept.trim().to_lowercase()))
    }

    /// Case-insensitive search over insight text, book title and concepts.
    /// A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&StoredInsight> {
        let lower = query.trim().to_lowercase();
        self.insights
            .iter()
            .filter(|stored| {
                let insight = &stored.insight;
                lower.is_empty()
                    || insight.text.to_lowercase().contains(&lower)
                    || insight
                        .book_title
                        .as_deref()
                        .is_some_and(|title| title.to_lowercase().contains(&lower))
                    || insight.concepts.iter().any(|c| c.to_lowercase().contains(&lower))
            })
            .collect()
    }

    pub fn filter(&self, filter: &InsightFilter) -> Vec<&StoredInsight> {
        self.insights.iter().filter(|s| filter.matches(&s.insight)).collect()
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn insights(&self) -> &[StoredInsight] {
        &self.insights
    }

    /// Gates with at least one insight, ascending
    pub fn gates(&self) -> Vec<u8> {
        self.gate_index.keys().copied().collect()
    }

    /// Indexed concepts, sorted
    pub fn concepts(&self) -> Vec<&str> {
        self.concept_index.keys().map(String::as_str).collect()
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            total_books: self.books.len(),
            total_insights: self.insights.len(),
            total_gates: self.gate_index.len(),
            total_concepts: self.concept_index.len(),
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.books.clear();
        self.insights.clear();
        self.rebuild_indexes();
        self.save()
    }

    pub fn export(&self) -> KnowledgeBundle {
        KnowledgeBundle {
            version: EXPORT_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            stats: self.stats(),
            books: self.books.clone(),
            insights: self.insights.clone(),
        }
    }

    /// Replace all state with an exported bundle. The `insights` array is
    /// required; `books` is optional.
    pub fn import(&mut self, data: Value) -> Result<usize> {
        let Some(insights) = data.get("insights").filter(|v| v.is_array()) else {
            bail!("Import data has no `insights` array");
        };

        let mut insights: Vec<StoredInsight> =
            serde_json::from_value(insights.clone()).context("Import data contains invalid insights")?;
        let books: Vec<Book> = match data.get("books") {
            Some(books) if !books.is_null() => {
                serde_json::from_value(books.clone()).context("Import data contains invalid books")?
            }
            _ => Vec::new(),
        };

        for stored in &mut insights {
            if stored.id.is_empty() {
                stored.id = new_record_stamp().0;
            }
        }

        self.books = books;
        self.insights = insights;
        self.rebuild_indexes();
        self.save()?;
        Ok(self.insights.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{JsonFileStore, MemoryStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn insight(text: &str, gate: Option<u8>, line: Option<u8>, concepts: &[&str]) -> Insight {
        Insight {
            text: text.to_string(),
            gate,
            line,
            concepts: concepts.iter().map(|c| c.to_string()).collect(),
            book_title: Some("Field Notes".to_string()),
            ..Default::default()
        }
    }

    fn populated() -> KnowledgeLibrary {
        let mut library = KnowledgeLibrary::open(Arc::new(MemoryStore::new()));
        library
            .add_insights(vec![
                insight("Gate 23 splits the mind", Some(23), Some(4), &["mind"]),
                insight("Gate 23 again", Some(23), Some(1), &[]),
                insight("Gate 5 waits", Some(5), None, &["Resonance", "field"]),
                insight("Entanglement binds", None, None, &["entanglement", "field"]),
            ])
            .unwrap();
        library
    }

    #[test]
    fn test_gate_index() {
        let library = populated();
        assert_eq!(library.by_gate(23).len(), 2);
        assert_eq!(library.by_gate_line(23, Some(4)).len(), 1);
        assert_eq!(library.by_gate_line(23, None).len(), 2);
        assert!(library.by_gate(64).is_empty());
        assert_eq!(library.gates(), vec![5, 23]);
    }

    #[test]
    fn test_concept_index_is_case_insensitive() {
        let library = populated();
        assert_eq!(library.by_concept("resonance").len(), 1);
        assert_eq!(library.by_concept("FIELD").len(), 2);
        assert_eq!(library.concepts(), vec!["entanglement", "field", "mind", "resonance"]);
    }

    #[test]
    fn test_search_and_filter() {
        let library = populated();
        assert_eq!(library.search("gate 23").len(), 2);
        assert_eq!(library.search("field notes").len(), 4);
        assert_eq!(library.search("entangle").len(), 1);
        assert_eq!(library.search("  ").len(), 4);

        let filter = InsightFilter {
            gate: Some(5),
            concept: Some("field".to_string()),
            ..Default::default()
        };
        assert_eq!(library.filter(&filter).len(), 1);
        assert_eq!(library.filter(&InsightFilter::default()).len(), 4);
    }

    #[test]
    fn test_stats() {
        let library = populated();
        assert_eq!(
            library.stats(),
            KnowledgeStats {
                total_books: 0,
                total_insights: 4,
                total_gates: 2,
                total_concepts: 4,
            }
        );
    }

    #[test]
    fn test_add_book_keeps_existing_id() {
        let mut library = KnowledgeLibrary::open(Arc::new(MemoryStore::new()));
        let book = Book {
            id: "kept".to_string(),
            title: "T".to_string(),
            ..Default::default()
        };
        assert_eq!(library.add_book(book).unwrap(), "kept");

        let fresh = library.add_book(Book::default()).unwrap();
        assert!(!fresh.is_empty());
        assert!(!library.books()[1].timestamp.is_empty());
    }

    #[test]
    fn test_reopen_rebuilds_indexes() {
        let temp_dir = TempDir::new().unwrap();
        let store: Arc<dyn Store> = Arc::new(JsonFileStore::new(temp_dir.path()));

        {
            let mut library = KnowledgeLibrary::open(store.clone());
            library.add_insight(insight("Gate 7 leads", Some(7), None, &["design"])).unwrap();
        }

        let reopened = KnowledgeLibrary::open(store);
        assert_eq!(reopened.by_gate(7).len(), 1);
        assert_eq!(reopened.by_concept("design").len(), 1);
    }

    #[test]
    fn test_export_import_and_clear() {
        let mut source = populated();
        let bundle = serde_json::to_value(source.export()).unwrap();
        assert_eq!(bundle["version"], "1.0");
        assert_eq!(bundle["stats"]["totalInsights"], 4);

        let mut target = KnowledgeLibrary::open(Arc::new(MemoryStore::new()));
        assert_eq!(target.import(bundle).unwrap(), 4);
        assert_eq!(target.insights(), source.insights());
        assert_eq!(target.gates(), vec![5, 23]);

        assert!(target.import(json!({"books": []})).is_err());
        assert_eq!(target.insights().len(), 4);

        source.clear().unwrap();
        assert_eq!(source.stats(), KnowledgeStats::default());
        assert!(source.gates().is_empty());
    }

    #[test]
    fn test_import_legacy_numeric_ids() {
        let mut library = KnowledgeLibrary::open(Arc::new(MemoryStore::new()));
        let data = json!({
            "books": [{"id": 17.5, "title": "Old", "wordCount": 3}],
            "insights": [{"id": 18.5, "text": "old quote", "gate": 3, "bookId": 17.5}]
        });
        assert_eq!(library.import(data).unwrap(), 1);
        assert_eq!(library.books()[0].id, "17.5");
        assert_eq!(library.insights()[0].insight.book_id.as_deref(), Some("17.5"));
        assert_eq!(library.by_gate(3).len(), 1);
    }
}
