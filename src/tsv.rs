use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use camino::Utf8Path;
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::table::Table;

pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
    pub keep_na_strings: bool,
}

pub fn read_table(path: &Utf8Path, options: &ReadOptions) -> Result<Table, MergeError> {
    let file = File::open(path.as_std_path()).map_err(|err| MergeError::io(path, err))?;
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    parse_table(BufReader::new(reader), path, options)
}

pub fn parse_table<R: BufRead>(
    reader: R,
    path: &Utf8Path,
    options: &ReadOptions,
) -> Result<Table, MergeError> {
    let mut table: Option<Table> = None;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| MergeError::io(path, err))?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        // tabs delimit empty cells, so only space-only lines are blank
        if line.chars().all(|ch| ch == ' ') {
            continue;
        }
        match table.as_mut() {
            None => {
                let header = line.strip_prefix('\u{feff}').unwrap_or(line);
                table = Some(Table::new(header.split('\t').map(unquote)));
            }
            Some(table) => {
                let cells: Vec<String> = line
                    .split('\t')
                    .map(unquote)
                    .map(|cell| normalize_missing(cell, options))
                    .collect();
                let expected = table.columns().len();
                if cells.len() > expected {
                    return Err(MergeError::MalformedRow {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        expected,
                        found: cells.len(),
                    });
                }
                table.push_row(cells);
            }
        }
    }
    Ok(table.unwrap_or_default())
}

pub fn write_table(path: &Utf8Path, table: &Table) -> Result<(), MergeError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path()).map_err(|err| MergeError::io(parent, err))?;
    let temp = tempfile::Builder::new()
        .prefix(".kira-am")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| MergeError::io(parent, err))?;

    {
        let file = temp.as_file().try_clone().map_err(|err| MergeError::io(path, err))?;
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            write_rows(&mut encoder, table).map_err(|err| MergeError::io(path, err))?;
            let mut inner = encoder.finish().map_err(|err| MergeError::io(path, err))?;
            inner.flush().map_err(|err| MergeError::io(path, err))?;
        } else {
            let mut writer = BufWriter::new(file);
            write_rows(&mut writer, table).map_err(|err| MergeError::io(path, err))?;
            writer.flush().map_err(|err| MergeError::io(path, err))?;
        }
    }

    temp.persist(path.as_std_path())
        .map_err(|err| MergeError::io(path, err.error))?;
    Ok(())
}

pub fn write_rows<W: Write>(writer: &mut W, table: &Table) -> std::io::Result<()> {
    write_line(writer, table.columns())?;
    for row in table.rows() {
        write_line(writer, row)?;
    }
    Ok(())
}

fn write_line<W: Write>(writer: &mut W, cells: &[String]) -> std::io::Result<()> {
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b"\t")?;
        }
        if needs_quoting(cell) {
            write!(writer, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            writer.write_all(cell.as_bytes())?;
        }
    }
    writer.write_all(b"\n")
}

fn needs_quoting(cell: &str) -> bool {
    cell.contains(['\t', '"', '\n', '\r'])
}

fn unquote(field: &str) -> String {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        field[1..field.len() - 1].replace("\"\"", "\"")
    } else {
        field.to_string()
    }
}

fn normalize_missing(cell: String, options: &ReadOptions) -> String {
    if !options.keep_na_strings && NA_TOKENS.contains(&cell.as_str()) {
        String::new()
    } else {
        cell
    }
}

fn is_gzip(path: &Utf8Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}
