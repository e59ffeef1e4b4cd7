//! Symbol table mapping declared type names to their owning namespace.

use crate::scanner::SourceDeclaration;
use std::collections::HashMap;
use tracing::info;

/// Insertion-ordered map from type name to owning namespace.
///
/// The first declaration of a name wins; later declarations of the same name
/// are ignored whatever namespace they come from.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from scanned declarations, in scan order.
    pub fn from_declarations(declarations: &[SourceDeclaration]) -> Self {
        let mut table = Self::new();
        for declaration in declarations {
            for name in &declaration.declared_type_names {
                table.insert(name, &declaration.owning_namespace);
            }
        }

        info!(symbols = table.len(), "symbol table built");
        table
    }

    /// Record `name` as owned by `namespace` unless it is already known.
    ///
    /// Returns `true` when the entry was added.
    pub fn insert(&mut self, name: &str, namespace: &str) -> bool {
        if self.index.contains_key(name) {
            return false;
        }

        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), namespace.to_string()));
        true
    }

    /// Namespace owning `name`, if it was declared anywhere.
    pub fn namespace_of(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Whether `name` has been declared.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, namespace)| (name.as_str(), namespace.as_str()))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn declaration(namespace: &str, names: &[&str]) -> SourceDeclaration {
        SourceDeclaration {
            file_path: PathBuf::from(format!("{namespace}.cs")),
            relative_path: PathBuf::from(format!("{namespace}.cs")),
            owning_namespace: namespace.to_string(),
            declared_type_names: names.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn test_first_writer_wins() {
        let table = SymbolTable::from_declarations(&[
            declaration("Nest", &["SearchRequest", "Hit"]),
            declaration("Nest.Other", &["Hit", "Shard"]),
        ]);

        assert_eq!(table.namespace_of("Hit"), Some("Nest"));
        assert_eq!(table.namespace_of("Shard"), Some("Nest.Other"));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_request_and_descriptor_names_are_not_overwritten() {
        let mut table = SymbolTable::new();
        assert!(table.insert("SearchRequest", "Nest"));
        assert!(table.insert("SearchDescriptor", "Nest"));

        assert!(!table.insert("SearchRequest", "Nest.Generated"));
        assert!(!table.insert("SearchDescriptor", "Nest.Generated"));

        assert_eq!(table.namespace_of("SearchRequest"), Some("Nest"));
        assert_eq!(table.namespace_of("SearchDescriptor"), Some("Nest"));
    }

    #[test]
    fn test_reinsertion_is_idempotent() {
        let mut table = SymbolTable::new();
        table.insert("Hit", "Nest");
        let before: Vec<_> = table.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect();

        assert!(!table.insert("Hit", "Nest"));

        let after: Vec<_> = table.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let table = SymbolTable::from_declarations(&[
            declaration("B", &["Zeta", "Alpha"]),
            declaration("A", &["Mid"]),
        ]);

        let names: Vec<_> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_unknown_name() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        assert!(!table.contains("Missing"));
        assert_eq!(table.namespace_of("Missing"), None);
    }
}
