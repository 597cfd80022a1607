use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::domain::{AnnotationSource, Cardinality};
use crate::error::MergeError;
use crate::index::CrossRefIndex;
use crate::join::assemble;
use crate::resolve::resolve_base;
use crate::source::{AggregationTable, SourceSpec};
use crate::table::Table;
use crate::tsv::{ReadOptions, read_table, write_table};

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => {
                tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message)
            }
            None => tracing::info!("{}", event.message),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl ProgressSink for SilentSink {
    fn event(&self, _event: ProgressEvent) {}
}

fn note(sink: &dyn ProgressSink, message: impl Into<String>) {
    sink.event(ProgressEvent {
        message: message.into(),
        elapsed: None,
    });
}

pub trait TableReader {
    fn read(&self, path: &Utf8Path) -> Result<Table, MergeError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TsvReader {
    options: ReadOptions,
}

impl TsvReader {
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }
}

impl TableReader for TsvReader {
    fn read(&self, path: &Utf8Path) -> Result<Table, MergeError> {
        read_table(path, &self.options)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeInputs {
    pub best_hits: Utf8PathBuf,
    pub trans_uniprot: Utf8PathBuf,
    pub go: Utf8PathBuf,
    pub kegg: Utf8PathBuf,
    pub kog: Utf8PathBuf,
    pub pfam: Utf8PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct InputTables {
    pub best_hits: Table,
    pub trans_uniprot: Table,
    pub go: Table,
    pub kegg: Table,
    pub kog: Table,
    pub pfam: Table,
}

impl InputTables {
    pub fn annotation(&self, source: AnnotationSource) -> &Table {
        match source {
            AnnotationSource::Go => &self.go,
            AnnotationSource::Kegg => &self.kegg,
            AnnotationSource::Kog => &self.kog,
            AnnotationSource::Pfam => &self.pfam,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputReport {
    pub name: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: AnnotationSource,
    pub transcripts: usize,
    pub degraded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub cardinality: Cardinality,
    pub inputs: Vec<InputReport>,
    pub index_keys: usize,
    pub index_entries: usize,
    pub sources: Vec<SourceReport>,
    pub base_rows: usize,
    pub unresolved_rows: usize,
    pub output_rows: usize,
    pub columns: Vec<String>,
    pub output: Option<String>,
    pub finished_at: Option<String>,
}

pub struct Merger<R: TableReader> {
    reader: R,
}

impl<R: TableReader> Merger<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn run(
        &self,
        inputs: &MergeInputs,
        output: &Utf8Path,
        options: MergeOptions,
        sink: &dyn ProgressSink,
    ) -> Result<MergeReport, MergeError> {
        let start = Instant::now();
        let tables = self.load(inputs, sink)?;
        let (table, mut report) = Self::merge(&tables, options, sink)?;

        write_table(output, &table)?;
        sink.event(ProgressEvent {
            message: format!("[OK] Wrote {} rows to {output}", table.len()),
            elapsed: Some(start.elapsed()),
        });

        report.output = Some(output.to_string());
        report.finished_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(report)
    }

    pub fn load(
        &self,
        inputs: &MergeInputs,
        sink: &dyn ProgressSink,
    ) -> Result<InputTables, MergeError> {
        note(sink, "Loading input files...");
        let tables = InputTables {
            best_hits: self.read_input("best_hits", &inputs.best_hits)?,
            trans_uniprot: self.read_input("trans_uniprot", &inputs.trans_uniprot)?,
            go: self.read_input("go", &inputs.go)?,
            kegg: self.read_input("kegg", &inputs.kegg)?,
            kog: self.read_input("kog", &inputs.kog)?,
            pfam: self.read_input("pfam", &inputs.pfam)?,
        };
        note(sink, format!("  Anno: {} rows", tables.best_hits.len()));
        note(sink, format!("  UniProt: {} rows", tables.trans_uniprot.len()));
        note(sink, format!("  GO: {} rows", tables.go.len()));
        note(sink, format!("  KEGG: {} rows", tables.kegg.len()));
        note(sink, format!("  KOG: {} rows", tables.kog.len()));
        note(sink, format!("  Pfam: {} rows", tables.pfam.len()));
        Ok(tables)
    }

    fn read_input(&self, name: &str, path: &Utf8Path) -> Result<Table, MergeError> {
        let table = self.reader.read(path)?;
        tracing::debug!(input = name, %path, columns = ?table.columns(), "loaded table");
        Ok(table)
    }

    pub fn merge(
        tables: &InputTables,
        options: MergeOptions,
        sink: &dyn ProgressSink,
    ) -> Result<(Table, MergeReport), MergeError> {
        note(sink, "Building index...");
        let index = CrossRefIndex::build(&tables.trans_uniprot)?;

        note(sink, "Aggregating annotations...");
        let aggregates: Vec<AggregationTable> = AnnotationSource::ALL
            .iter()
            .map(|&source| {
                AggregationTable::build(tables.annotation(source), &SourceSpec::for_source(source))
            })
            .collect();

        note(sink, "Mapping to SeqIDs...");
        let base = resolve_base(&tables.best_hits, &index, options.cardinality)?;
        note(sink, format!("  Base table: {} rows", base.len()));

        note(sink, "Merging annotations...");
        let table = assemble(&base, &aggregates)?;

        let report = MergeReport {
            cardinality: options.cardinality,
            inputs: vec![
                input_report("best_hits", &tables.best_hits),
                input_report("trans_uniprot", &tables.trans_uniprot),
                input_report("go", &tables.go),
                input_report("kegg", &tables.kegg),
                input_report("kog", &tables.kog),
                input_report("pfam", &tables.pfam),
            ],
            index_keys: index.len(),
            index_entries: index.entry_count(),
            sources: aggregates
                .iter()
                .map(|aggregate| SourceReport {
                    source: aggregate.source(),
                    transcripts: aggregate.len(),
                    degraded: aggregate.is_degraded(),
                })
                .collect(),
            base_rows: base.len(),
            unresolved_rows: base.iter().filter(|row| row.seq_id.is_empty()).count(),
            output_rows: table.len(),
            columns: table.columns().to_vec(),
            output: None,
            finished_at: None,
        };
        Ok((table, report))
    }
}

fn input_report(name: &str, table: &Table) -> InputReport {
    InputReport {
        name: name.to_string(),
        rows: table.len(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        messages: Mutex<Vec<String>>,
    }

    impl ProgressSink for RecordingSink {
        fn event(&self, event: ProgressEvent) {
            self.messages.lock().unwrap().push(event.message);
        }
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(columns.iter().copied());
        for row in rows {
            table.push_row(row.iter().map(|cell| cell.to_string()).collect());
        }
        table
    }

    #[test]
    fn merge_reports_stage_counts() {
        let tables = InputTables {
            best_hits: table(&["qseqid", "accession"], &[&["q1", "sp|P1|A"], &["q2", "none"]]),
            trans_uniprot: table(&["SeqID", "Accession"], &[&["T1", "sp|P1|A"]]),
            go: table(&["SeqID", "GOterm"], &[&["T1", "GO:1"]]),
            kegg: Table::default(),
            kog: table(&["SeqID", "KogClassName"], &[&["T1", "J"]]),
            pfam: Table::default(),
        };
        let sink = RecordingSink::default();
        let (out, report) =
            Merger::<TsvReader>::merge(&tables, MergeOptions::default(), &sink).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(report.base_rows, 2);
        assert_eq!(report.unresolved_rows, 1);
        assert_eq!(report.index_keys, 1);
        let degraded: Vec<_> = report
            .sources
            .iter()
            .filter(|source| source.degraded)
            .map(|source| source.source)
            .collect();
        assert_eq!(degraded, [AnnotationSource::Kegg, AnnotationSource::Pfam]);

        let messages = sink.messages.lock().unwrap();
        assert_eq!(messages.first().map(String::as_str), Some("Building index..."));
        assert!(messages.iter().any(|message| message == "  Base table: 2 rows"));
    }
}
