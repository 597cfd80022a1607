use serde::Serialize;

use crate::aggregate::sorted_unique_join;
use crate::domain::{CanonicalKey, Cardinality};
use crate::error::MergeError;
use crate::index::CrossRefIndex;
use crate::table::Table;

pub const QUERY_COLUMN: &str = "qseqid";
pub const HIT_ACCESSION_COLUMN: &str = "accession";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseRow {
    pub query_id: String,
    pub accession: String,
    pub seq_id: String,
}

/// No match gives one row with an empty `seq_id`. With
/// [`Cardinality::FanOut`] each index entry gives its own row, repeats
/// included; [`Cardinality::Collapse`] gives one row holding the sorted
/// distinct ids.
pub fn resolve_base(
    best_hits: &Table,
    index: &CrossRefIndex,
    cardinality: Cardinality,
) -> Result<Vec<BaseRow>, MergeError> {
    if !best_hits.has_column(HIT_ACCESSION_COLUMN) {
        return Err(MergeError::missing_column("best-hit", HIT_ACCESSION_COLUMN));
    }

    let mut rows = Vec::with_capacity(best_hits.len());
    for row in 0..best_hits.len() {
        let query_id = best_hits.value(row, QUERY_COLUMN);
        let accession = best_hits.value(row, HIT_ACCESSION_COLUMN);
        let key = CanonicalKey::from(accession);
        let seq_ids = index.lookup(key.as_str());

        let make = |seq_id: String| BaseRow {
            query_id: query_id.to_string(),
            accession: accession.to_string(),
            seq_id,
        };

        if seq_ids.is_empty() {
            rows.push(make(String::new()));
            continue;
        }
        match cardinality {
            Cardinality::Collapse => rows.push(make(sorted_unique_join(seq_ids))),
            Cardinality::FanOut => rows.extend(seq_ids.iter().cloned().map(make)),
        }
    }
    Ok(rows)
}
