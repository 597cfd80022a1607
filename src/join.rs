use std::collections::HashSet;

use crate::error::MergeError;
use crate::index::SEQID_COLUMN;
use crate::resolve::{BaseRow, HIT_ACCESSION_COLUMN, QUERY_COLUMN};
use crate::source::AggregationTable;
use crate::table::Table;

pub const OUTPUT_COLUMNS: [&str; 13] = [
    QUERY_COLUMN,
    HIT_ACCESSION_COLUMN,
    SEQID_COLUMN,
    "Accession",
    "GOterm",
    "NameSpace",
    "Description",
    "kegg_accession",
    "kegg_annotation",
    "KogClassName",
    "pfam_accession",
    "HMMProfile",
    "pfam_description",
];

pub fn assemble(base: &[BaseRow], aggregates: &[AggregationTable]) -> Result<Table, MergeError> {
    let mut seen: HashSet<&str> = HashSet::from([QUERY_COLUMN, HIT_ACCESSION_COLUMN, SEQID_COLUMN]);
    for aggregate in aggregates {
        for column in aggregate.value_columns() {
            if !seen.insert(column.as_str()) {
                return Err(MergeError::ColumnCollision(column.clone()));
            }
        }
    }

    // (aggregate, position within its values) for each projected column
    let mut projection: Vec<(&str, Option<(usize, usize)>)> = Vec::new();
    for name in OUTPUT_COLUMNS {
        if !seen.contains(name) {
            continue;
        }
        let origin = aggregates.iter().enumerate().find_map(|(agg_idx, aggregate)| {
            aggregate
                .value_columns()
                .iter()
                .position(|column| column == name)
                .map(|pos| (agg_idx, pos))
        });
        projection.push((name, origin));
    }

    let mut table = Table::new(projection.iter().map(|(name, _)| *name));
    for row in base {
        let matches: Vec<Option<&[String]>> = aggregates
            .iter()
            .map(|aggregate| aggregate.lookup(&row.seq_id))
            .collect();
        let cells = projection
            .iter()
            .map(|(name, origin)| match origin {
                Some((agg_idx, pos)) => matches[*agg_idx]
                    .map(|values| values[*pos].clone())
                    .unwrap_or_default(),
                None => match *name {
                    QUERY_COLUMN => row.query_id.clone(),
                    HIT_ACCESSION_COLUMN => row.accession.clone(),
                    _ => row.seq_id.clone(),
                },
            })
            .collect();
        table.push_row(cells);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::source::SourceSpec;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(columns.iter().copied());
        for row in rows {
            table.push_row(row.iter().map(|cell| cell.to_string()).collect());
        }
        table
    }

    fn base(rows: &[(&str, &str, &str)]) -> Vec<BaseRow> {
        rows.iter()
            .map(|(query_id, accession, seq_id)| BaseRow {
                query_id: query_id.to_string(),
                accession: accession.to_string(),
                seq_id: seq_id.to_string(),
            })
            .collect()
    }

    #[test]
    fn fills_unmatched_cells_with_empty_strings() {
        let go = AggregationTable::build(
            &table(&["SeqID", "GOterm"], &[&["T1", "GO:1"], &["T1", "GO:2"]]),
            &SourceSpec::go(),
        );
        let kog = AggregationTable::build(
            &table(&["SeqID", "KogClassName"], &[&["T2", "J"]]),
            &SourceSpec::kog(),
        );
        let out = assemble(
            &base(&[("q1", "sp|A|x", "T1"), ("q2", "sp|B|x", "T2"), ("q3", "z", "")]),
            &[go, kog],
        )
        .unwrap();

        assert_eq!(
            out.columns(),
            ["qseqid", "accession", "SeqID", "GOterm", "KogClassName"]
        );
        assert_eq!(out.rows()[0], ["q1", "sp|A|x", "T1", "GO:1;GO:2", ""]);
        assert_eq!(out.rows()[1], ["q2", "sp|B|x", "T2", "", "J"]);
        assert_eq!(out.rows()[2], ["q3", "z", "", "", ""]);
    }

    #[test]
    fn degraded_source_contributes_no_columns() {
        let kegg = AggregationTable::build(
            &table(&["SeqID", "Accession"], &[&["T1", "K1"]]),
            &SourceSpec::kegg(),
        );
        let out = assemble(&base(&[("q1", "a", "T1")]), &[kegg]).unwrap();
        assert_eq!(out.columns(), ["qseqid", "accession", "SeqID"]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn projection_order_is_fixed() {
        let pfam = AggregationTable::build(
            &table(
                &["Description", "HMMProfile", "SeqID", "Accession"],
                &[&["kinase", "PF1", "T1", "PF00069"]],
            ),
            &SourceSpec::pfam(),
        );
        let go = AggregationTable::build(
            &table(&["GOterm", "SeqID"], &[&["GO:9", "T1"]]),
            &SourceSpec::go(),
        );
        let out = assemble(&base(&[("q1", "a", "T1")]), &[pfam, go]).unwrap();
        assert_eq!(
            out.columns(),
            [
                "qseqid",
                "accession",
                "SeqID",
                "GOterm",
                "pfam_accession",
                "HMMProfile",
                "pfam_description"
            ]
        );
        assert_eq!(out.rows()[0], ["q1", "a", "T1", "GO:9", "PF00069", "PF1", "kinase"]);
    }

    #[test]
    fn repeated_value_column_is_a_collision() {
        let kog = table(&["SeqID", "KogClassName"], &[&["T1", "J"]]);
        let first = AggregationTable::build(&kog, &SourceSpec::kog());
        let second = AggregationTable::build(&kog, &SourceSpec::kog());
        let err = assemble(&base(&[]), &[first, second]).unwrap_err();
        assert_matches!(err, MergeError::ColumnCollision(ref column) if column == "KogClassName");
    }
}
