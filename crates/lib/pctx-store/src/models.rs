use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb_types::SurrealValue;

/// A stored (document text, embedding) pair inside a collection.
///
/// The record id is assigned by the database and not carried here.
#[derive(Debug, Clone, Serialize, Deserialize, SurrealValue, PartialEq)]
#[surreal(crate = "surrealdb_types")]
pub struct Fragment {
    pub document: String,
    pub embedding: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Fragment {
    #[must_use]
    pub const fn new(document: String, embedding: Vec<f32>) -> Self {
        Self {
            document,
            embedding,
            metadata: None,
        }
    }
}

/// A single neighbor returned by a nearest-neighbor search.
///
/// Both fields are optional because collections are populated by external
/// tools and may hold records without a document.
#[derive(Debug, Clone, Serialize, Deserialize, SurrealValue, PartialEq)]
#[surreal(crate = "surrealdb_types")]
pub struct FragmentMatch {
    #[serde(default)]
    #[surreal(default)]
    pub document: Option<String>,
    #[serde(default)]
    #[surreal(default)]
    pub distance: Option<f64>,
}

/// Neighbors for each submitted query embedding, in submission order.
///
/// `documents[i]` and `distances[i]` hold the ranked results for the i-th
/// embedding, nearest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    #[serde(default)]
    pub documents: Vec<Vec<String>>,
    #[serde(default)]
    pub distances: Vec<Vec<f64>>,
}

impl QueryResult {
    /// Appends the matches for one query embedding, skipping matches that
    /// carry no document text.
    pub fn push_matches(&mut self, matches: Vec<FragmentMatch>) {
        let (documents, distances): (Vec<String>, Vec<f64>) = matches
            .into_iter()
            .filter_map(|row| {
                row.document
                    .map(|document| (document, row.distance.unwrap_or(f64::NAN)))
            })
            .unzip();
        self.documents.push(documents);
        self.distances.push(distances);
    }

    /// Takes the documents for the first query embedding, if any.
    #[must_use]
    pub fn into_first_documents(self) -> Vec<String> {
        self.documents.into_iter().next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(document: Option<&str>, distance: f64) -> FragmentMatch {
        FragmentMatch {
            document: document.map(str::to_string),
            distance: Some(distance),
        }
    }

    #[test]
    fn push_matches_skips_rows_without_documents() {
        let mut result = QueryResult::default();
        result.push_matches(vec![hit(Some("a"), 0.1), hit(None, 0.2), hit(Some("c"), 0.3)]);

        assert_eq!(result.documents, vec![vec!["a".to_string(), "c".to_string()]]);
        assert_eq!(result.distances, vec![vec![0.1, 0.3]]);
    }

    #[test]
    fn first_documents_of_empty_result_is_empty() {
        assert!(QueryResult::default().into_first_documents().is_empty());
    }

    #[test]
    fn fragment_serializes_without_metadata() {
        let fragment = Fragment::new("text".to_string(), vec![0.5, 0.25]);
        let value = serde_json::to_value(&fragment).expect("fragment should serialize");

        assert_eq!(
            value,
            serde_json::json!({ "document": "text", "embedding": [0.5, 0.25] })
        );
    }
}
