//! Nonterminal and tactic vocabularies.
//!
//! Both are flat JSON arrays of strings. The nonterminal vocabulary's
//! cardinality fixes the one-hot input width of the first graph
//! convolution, so it must match the vocabulary the dataset was built with.

use std::collections::HashMap;
use std::path::Path;

/// AST nonterminal labels with index lookup.
#[derive(Debug, Clone)]
pub struct NonterminalVocab {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl NonterminalVocab {
    /// Load from a JSON array file.
    pub fn from_json(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read nonterminals {}: {e}", path.display())
        })?;
        let labels: Vec<String> = serde_json::from_str(&contents)?;
        tracing::info!(count = labels.len(), path = %path.display(), "Loaded nonterminal vocabulary");
        Ok(Self::from_labels(labels))
    }

    /// Build from an in-memory label list.
    pub fn from_labels(labels: Vec<String>) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        NonterminalVocab { labels, index }
    }

    /// One-hot index of a label, if it is in the vocabulary.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Label at an index.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Vocabulary size (one-hot width).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Known tactic names with index lookup.
#[derive(Debug, Clone)]
pub struct TacticVocab {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl TacticVocab {
    /// Load from a JSON array file.
    pub fn from_json(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read tactics {}: {e}", path.display()))?;
        let names: Vec<String> = serde_json::from_str(&contents)?;
        tracing::info!(count = names.len(), path = %path.display(), "Loaded tactic vocabulary");
        Ok(Self::from_names(names))
    }

    /// Build from an in-memory name list.
    pub fn from_names(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        TacticVocab { names, index }
    }

    /// Index of a tactic name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Index of the head tactic of a tactic script, e.g. `apply H2.` → `apply`.
    pub fn index_of_head(&self, tactic: &str) -> Option<usize> {
        proofstate::tactic::head(tactic).and_then(|h| self.index_of(h))
    }

    /// Tactic name at an index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    /// Number of known tactics.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
