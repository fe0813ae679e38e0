//! Synonym lookup tables, one per term field.
//!
//! Tables are built once from the vocabulary definitions in
//! [`crate::types`]. Keys are case-folded. A key may appear in more than one
//! table (`wide`, `side`); the matcher resolves that purely by table order.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::types::{Field, Term};

/// Case-folded synonym → term index for a single field.
#[derive(Debug)]
pub struct SynonymTable {
    field: Field,
    entries: HashMap<String, Term>,
}

impl SynonymTable {
    /// Build the table for `field` from its vocabulary.
    pub fn build(field: Field) -> Self {
        let mut entries = HashMap::new();
        for term in Term::all_of(field) {
            for synonym in term.synonyms() {
                // first term listing a synonym keeps it
                entries.entry(fold(synonym)).or_insert(term);
            }
        }
        Self { field, entries }
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Look up an already case-folded token.
    pub fn lookup(&self, token: &str) -> Option<Term> {
        self.entries.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static TABLES: LazyLock<Vec<SynonymTable>> =
    LazyLock::new(|| Field::PRIORITY.iter().map(|f| SynonymTable::build(*f)).collect());

/// All six tables in matcher priority order.
pub fn tables() -> &'static [SynonymTable] {
    &TABLES
}

/// Resolve a single value against one field's table.
///
/// Used when reading terms back from the inference service, which may
/// answer with a canonical label or any listed synonym.
pub fn resolve(field: Field, value: &str) -> Option<Term> {
    let key = fold(value.trim());
    tables()
        .iter()
        .find(|t| t.field() == field)
        .and_then(|t| t.lookup(&key))
}

/// Case-fold a token for lookup.
pub(crate) fn fold(s: &str) -> String {
    s.to_lowercase()
}
