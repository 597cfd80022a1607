use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_annotation_merger::app::{MergeReport, Merger, TracingSink, TsvReader};
use kira_annotation_merger::config::{Config, ConfigLoader};
use kira_annotation_merger::error::MergeError;
use kira_annotation_merger::output::{JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "kira-am")]
#[command(about = "Merge best hits with GO/KEGG/KOG/Pfam annotations via accession -> SeqID")]
#[command(version, author)]
struct Cli {
    #[arg(
        long = "anno_uniprot_besthit",
        value_name = "PATH",
        help = "Best hit annotation file (from diamond)"
    )]
    anno_uniprot_besthit: Option<Utf8PathBuf>,

    #[arg(long = "trans_uniprot", value_name = "PATH", help = "Transcript to UniProt mapping")]
    trans_uniprot: Option<Utf8PathBuf>,

    #[arg(long = "trans_go", value_name = "PATH", help = "GO annotation file")]
    trans_go: Option<Utf8PathBuf>,

    #[arg(long = "trans_kegg", value_name = "PATH", help = "KEGG annotation file")]
    trans_kegg: Option<Utf8PathBuf>,

    #[arg(long = "trans_kog", value_name = "PATH", help = "KOG annotation file")]
    trans_kog: Option<Utf8PathBuf>,

    #[arg(long = "trans_pfam", value_name = "PATH", help = "Pfam annotation file")]
    trans_pfam: Option<Utf8PathBuf>,

    #[arg(short = 'o', long, value_name = "PATH", help = "Output TSV path")]
    output: Option<Utf8PathBuf>,

    #[arg(long = "one_row_per_qseqid", help = "Aggregate to one row per qseqid")]
    one_row_per_qseqid: bool,

    #[arg(
        long,
        help = "Keep NA/NaN/NULL cells as literal text instead of reading them as empty"
    )]
    keep_na_strings: bool,

    #[arg(
        long,
        value_name = "PATH",
        help = "JSON run file (defaults to ./kira-am.json when present)"
    )]
    config: Option<String>,

    #[arg(long, help = "Print the run report as JSON instead of a summary")]
    non_interactive: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<MergeError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MergeError) -> u8 {
    match error {
        MergeError::MissingArgument(_)
        | MergeError::ConfigRead(_)
        | MergeError::ConfigParse(_) => 2,
        MergeError::MalformedRow { .. }
        | MergeError::MissingColumn { .. }
        | MergeError::ColumnCollision(_) => 3,
        MergeError::Io { .. } => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    let file = ConfigLoader::load(cli.config.as_deref())?;
    let overrides = Config {
        anno_uniprot_besthit: cli.anno_uniprot_besthit,
        trans_uniprot: cli.trans_uniprot,
        trans_go: cli.trans_go,
        trans_kegg: cli.trans_kegg,
        trans_kog: cli.trans_kog,
        trans_pfam: cli.trans_pfam,
        output: cli.output,
        one_row_per_qseqid: cli.one_row_per_qseqid,
        keep_na_strings: cli.keep_na_strings,
    };
    let resolved = ConfigLoader::resolve(file, overrides)?;

    let merger = Merger::new(TsvReader::new(resolved.read));
    match output_mode {
        OutputMode::Interactive => {
            let report = merger.run(
                &resolved.inputs,
                &resolved.output,
                resolved.options,
                &TracingSink,
            )?;
            print_summary(&report);
        }
        OutputMode::NonInteractive => {
            let report = merger.run(
                &resolved.inputs,
                &resolved.output,
                resolved.options,
                &JsonOutput,
            )?;
            JsonOutput::print_report(&report).into_diagnostic()?;
        }
    }
    Ok(())
}

fn print_summary(report: &MergeReport) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}KIRA-AM summary ({} mode){reset}", report.cardinality);
    println!(
        "{green}rows written: {} ({} best hits, {} unresolved){reset}",
        report.output_rows,
        report
            .inputs
            .first()
            .map(|input| input.rows)
            .unwrap_or_default(),
        report.unresolved_rows
    );
    for source in &report.sources {
        if source.degraded {
            println!(
                "{yellow}{}: skipped (required columns missing){reset}",
                source.source
            );
        } else {
            println!(
                "{green}{}: {} annotated transcripts{reset}",
                source.source, source.transcripts
            );
        }
    }
    if let Some(path) = &report.output {
        println!("{cyan}output: {path}{reset}");
    }
}
