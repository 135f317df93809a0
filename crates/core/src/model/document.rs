use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

//
// ─── DOCUMENT ──────────────────────────────────────────────────────────────────
//

/// A single uploaded document as described by the remote listing.
///
/// The filename acts as the primary key within a user's corpus; everything
/// else is optional metadata the listing may or may not carry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub filename: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Document {
    /// A document known only by name, e.g. a similarity-group reference whose
    /// details never appeared in any other grouping.
    #[must_use]
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size: None,
            uploaded_at: None,
            summary: None,
        }
    }
}

//
// ─── GROUPINGS ─────────────────────────────────────────────────────────────────
//

/// Documents bucketed under a topic or folder name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentGroup {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// A cluster of documents the remote service considers similar.
///
/// Members are filename references into the other groupings, not owned
/// document records.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimilarityGroup {
    #[serde(default)]
    pub similarity_percentage: f64,
    #[serde(default)]
    pub documents: Vec<String>,
}

/// The four heterogeneous groupings returned by the document listing call.
///
/// Topics and folders arrive as JSON objects; their entry order is preserved
/// because the aggregation order (and therefore the UI order) depends on it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentGroups {
    #[serde(default)]
    pub uncategorized: Vec<Document>,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub topics: Vec<(String, DocumentGroup)>,
    #[serde(default, deserialize_with = "ordered_entries")]
    pub folders: Vec<(String, DocumentGroup)>,
    #[serde(default)]
    pub similarity_groups: Vec<SimilarityGroup>,
}

impl DocumentGroups {
    /// True when every grouping is empty, meaning the user has no documents.
    ///
    /// Callers should render this as "no documents available", not as an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uncategorized.is_empty()
            && self.topics.iter().all(|(_, g)| g.documents.is_empty())
            && self.folders.iter().all(|(_, g)| g.documents.is_empty())
            && self.similarity_groups.iter().all(|g| g.documents.is_empty())
    }

    /// Looks up a document's details by filename across the owning groupings.
    #[must_use]
    pub fn find(&self, filename: &str) -> Option<&Document> {
        self.uncategorized
            .iter()
            .find(|d| d.filename == filename)
            .or_else(|| {
                self.topics
                    .iter()
                    .flat_map(|(_, g)| &g.documents)
                    .find(|d| d.filename == filename)
            })
            .or_else(|| {
                self.folders
                    .iter()
                    .flat_map(|(_, g)| &g.documents)
                    .find(|d| d.filename == filename)
            })
    }

    /// Merges all groupings into one de-duplicated sequence of documents.
    ///
    /// Emission order is: uncategorized, topic documents (topic order as
    /// received), folder documents, then similarity-group references. The
    /// first occurrence of a filename wins; later occurrences are skipped.
    /// Similarity entries only carry filenames, so their details are looked
    /// up in the earlier groupings and fall back to a name-only document.
    #[must_use]
    pub fn aggregate(&self) -> Vec<Document> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut merged = Vec::new();

        let owned = self
            .uncategorized
            .iter()
            .chain(self.topics.iter().flat_map(|(_, g)| &g.documents))
            .chain(self.folders.iter().flat_map(|(_, g)| &g.documents));
        for doc in owned {
            if seen.insert(doc.filename.as_str()) {
                merged.push(doc.clone());
            }
        }

        for group in &self.similarity_groups {
            for filename in &group.documents {
                if seen.contains(filename.as_str()) {
                    continue;
                }
                let doc = self
                    .find(filename)
                    .cloned()
                    .unwrap_or_else(|| Document::named(filename.clone()));
                merged.push(doc);
                seen.insert(filename.as_str());
            }
        }

        merged
    }

    /// All distinct filenames in aggregation order.
    #[must_use]
    pub fn filenames(&self) -> Vec<String> {
        self.aggregate().into_iter().map(|d| d.filename).collect()
    }
}

/// Deserializes a JSON object into a vector of entries, keeping wire order.
fn ordered_entries<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct EntriesVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of named document groups")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
