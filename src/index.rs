use std::collections::HashMap;

use tracing::debug;

use crate::domain::CanonicalKey;
use crate::error::MergeError;
use crate::table::Table;

pub const ACCESSION_COLUMN: &str = "Accession";
pub const SEQID_COLUMN: &str = "SeqID";

#[derive(Debug, Clone, Default)]
pub struct CrossRefIndex {
    by_key: HashMap<String, Vec<String>>,
    entries: usize,
}

impl CrossRefIndex {
    pub fn build(mapping: &Table) -> Result<Self, MergeError> {
        for column in [ACCESSION_COLUMN, SEQID_COLUMN] {
            if !mapping.has_column(column) {
                return Err(MergeError::missing_column("transcript-to-UniProt", column));
            }
        }

        let mut index = CrossRefIndex::default();
        for row in 0..mapping.len() {
            let key = CanonicalKey::from(mapping.value(row, ACCESSION_COLUMN)).into_string();
            let seq_id = mapping.value(row, SEQID_COLUMN).to_string();
            index.by_key.entry(key).or_default().push(seq_id);
            index.entries += 1;
        }
        debug!(keys = index.len(), entries = index.entries, "built accession index");
        Ok(index)
    }

    pub fn lookup(&self, key: &str) -> &[String] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }
}
