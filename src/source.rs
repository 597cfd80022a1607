use std::collections::HashMap;

use tracing::{debug, warn};

use crate::aggregate::semijoin_unique;
use crate::domain::AnnotationSource;
use crate::index::SEQID_COLUMN;
use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub input: &'static str,
    pub output: &'static str,
}

impl ColumnSpec {
    const fn same(name: &'static str) -> Self {
        Self {
            input: name,
            output: name,
        }
    }

    const fn renamed(input: &'static str, output: &'static str) -> Self {
        Self { input, output }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub source: AnnotationSource,
    pub marker: &'static str,
    pub columns: Vec<ColumnSpec>,
}

impl SourceSpec {
    pub fn go() -> Self {
        Self {
            source: AnnotationSource::Go,
            marker: "GOterm",
            columns: vec![
                ColumnSpec::same("Accession"),
                ColumnSpec::same("GOterm"),
                ColumnSpec::same("NameSpace"),
                ColumnSpec::same("Description"),
            ],
        }
    }

    pub fn kegg() -> Self {
        Self {
            source: AnnotationSource::Kegg,
            marker: "Annotation",
            columns: vec![
                ColumnSpec::renamed("Accession", "kegg_accession"),
                ColumnSpec::renamed("Annotation", "kegg_annotation"),
            ],
        }
    }

    pub fn kog() -> Self {
        Self {
            source: AnnotationSource::Kog,
            marker: "KogClassName",
            columns: vec![ColumnSpec::same("KogClassName")],
        }
    }

    pub fn pfam() -> Self {
        Self {
            source: AnnotationSource::Pfam,
            marker: "HMMProfile",
            columns: vec![
                ColumnSpec::renamed("Accession", "pfam_accession"),
                ColumnSpec::same("HMMProfile"),
                ColumnSpec::renamed("Description", "pfam_description"),
            ],
        }
    }

    pub fn for_source(source: AnnotationSource) -> Self {
        match source {
            AnnotationSource::Go => Self::go(),
            AnnotationSource::Kegg => Self::kegg(),
            AnnotationSource::Kog => Self::kog(),
            AnnotationSource::Pfam => Self::pfam(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregationTable {
    source: AnnotationSource,
    value_columns: Vec<String>,
    seq_ids: Vec<String>,
    by_seq_id: HashMap<String, usize>,
    values: Vec<Vec<String>>,
    degraded: bool,
}

impl AggregationTable {
    pub fn build(table: &Table, spec: &SourceSpec) -> Self {
        for required in [SEQID_COLUMN, spec.marker] {
            if !table.has_column(required) {
                warn!(
                    source = %spec.source,
                    column = required,
                    "annotation table lacks a required column; continuing without it"
                );
                return Self::degraded(spec.source);
            }
        }

        let present: Vec<&ColumnSpec> = spec
            .columns
            .iter()
            .filter(|column| table.has_column(column.input))
            .collect();

        let mut seq_ids: Vec<String> = Vec::new();
        let mut by_seq_id: HashMap<String, usize> = HashMap::new();
        let mut collected: Vec<Vec<Vec<&str>>> = Vec::new();
        for row in 0..table.len() {
            let seq_id = table.value(row, SEQID_COLUMN);
            if seq_id.is_empty() {
                continue;
            }
            let slot = *by_seq_id.entry(seq_id.to_string()).or_insert_with(|| {
                seq_ids.push(seq_id.to_string());
                collected.push(vec![Vec::new(); present.len()]);
                seq_ids.len() - 1
            });
            for (idx, column) in present.iter().enumerate() {
                collected[slot][idx].push(table.value(row, column.input));
            }
        }

        let values = collected
            .into_iter()
            .map(|columns| columns.into_iter().map(semijoin_unique).collect())
            .collect();

        debug!(
            source = %spec.source,
            rows = table.len(),
            transcripts = seq_ids.len(),
            "aggregated annotation table"
        );

        Self {
            source: spec.source,
            value_columns: present.iter().map(|column| column.output.to_string()).collect(),
            seq_ids,
            by_seq_id,
            values,
            degraded: false,
        }
    }

    fn degraded(source: AnnotationSource) -> Self {
        Self {
            source,
            value_columns: Vec::new(),
            seq_ids: Vec::new(),
            by_seq_id: HashMap::new(),
            values: Vec::new(),
            degraded: true,
        }
    }

    pub fn source(&self) -> AnnotationSource {
        self.source
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    pub fn lookup(&self, seq_id: &str) -> Option<&[String]> {
        self.by_seq_id
            .get(seq_id)
            .map(|&slot| self.values[slot].as_slice())
    }

    pub fn seq_ids(&self) -> &[String] {
        &self.seq_ids
    }

    pub fn len(&self) -> usize {
        self.seq_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq_ids.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            std::iter::once(SEQID_COLUMN.to_string()).chain(self.value_columns.iter().cloned()),
        );
        for (seq_id, values) in self.seq_ids.iter().zip(&self.values) {
            let mut row = Vec::with_capacity(values.len() + 1);
            row.push(seq_id.clone());
            row.extend(values.iter().cloned());
            table.push_row(row);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(columns.iter().copied());
        for row in rows {
            table.push_row(row.iter().map(|cell| cell.to_string()).collect());
        }
        table
    }

    #[test]
    fn go_terms_collapse_per_transcript() {
        let go = table(
            &["SeqID", "Accession", "GOterm", "NameSpace", "Description"],
            &[
                &["T1", "GO:2", "b", "BP", "beta"],
                &["T2", "GO:9", "z", "CC", "zeta"],
                &["T1", "GO:1", "a", "BP", "alpha"],
                &["T1", "GO:2", "b", "BP", "beta"],
            ],
        );
        let agg = AggregationTable::build(&go, &SourceSpec::go());
        assert_eq!(agg.seq_ids(), ["T1", "T2"]);
        assert_eq!(
            agg.value_columns(),
            ["Accession", "GOterm", "NameSpace", "Description"]
        );
        assert_eq!(
            agg.lookup("T1").unwrap(),
            ["GO:2;GO:1", "b;a", "BP", "beta;alpha"]
        );
        assert!(!agg.is_degraded());
    }

    #[test]
    fn kegg_columns_are_renamed() {
        let kegg = table(
            &["SeqID", "Accession", "Annotation"],
            &[&["T1", "K00001", "alcohol dehydrogenase"]],
        );
        let agg = AggregationTable::build(&kegg, &SourceSpec::kegg());
        assert_eq!(agg.value_columns(), ["kegg_accession", "kegg_annotation"]);
        assert_eq!(agg.lookup("T1").unwrap(), ["K00001", "alcohol dehydrogenase"]);
    }

    #[test]
    fn missing_marker_degrades_to_key_only() {
        let kegg = table(&["SeqID", "Accession"], &[&["T1", "K00001"]]);
        let agg = AggregationTable::build(&kegg, &SourceSpec::kegg());
        assert!(agg.is_degraded());
        assert!(agg.is_empty());
        assert_eq!(agg.to_table().columns(), ["SeqID"]);
        assert!(agg.lookup("T1").is_none());
    }

    #[test]
    fn missing_seqid_degrades() {
        let kog = table(&["Gene", "KogClassName"], &[&["T1", "x"]]);
        let agg = AggregationTable::build(&kog, &SourceSpec::kog());
        assert!(agg.is_degraded());
    }

    #[test]
    fn optional_columns_are_skipped_when_absent() {
        let pfam = table(&["SeqID", "HMMProfile"], &[&["T1", "PF00001"]]);
        let agg = AggregationTable::build(&pfam, &SourceSpec::pfam());
        assert_eq!(agg.value_columns(), ["HMMProfile"]);
        assert_eq!(agg.lookup("T1").unwrap(), ["PF00001"]);
    }

    #[test]
    fn rows_without_seqid_are_ignored() {
        let kog = table(&["SeqID", "KogClassName"], &[&["", "x"], &["T1", "y"]]);
        let agg = AggregationTable::build(&kog, &SourceSpec::kog());
        assert_eq!(agg.seq_ids(), ["T1"]);
        assert!(agg.lookup("").is_none());
    }

    #[test]
    fn to_table_lists_seqid_first() {
        let kog = table(&["SeqID", "KogClassName"], &[&["T1", "x"], &["T1", "y"]]);
        let agg = AggregationTable::build(&kog, &SourceSpec::kog());
        let out = agg.to_table();
        assert_eq!(out.columns(), ["SeqID", "KogClassName"]);
        assert_eq!(out.rows()[0], ["T1", "x;y"]);
    }
}
