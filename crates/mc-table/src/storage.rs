//! Reading and writing tables.
//!
//! Two text formats are supported besides JSON:
//!
//! `.sto`: a `key=value` header closed by `endheader`, then a tab-separated
//! column header starting with `time` and one row per sample.
//!
//! ```text
//! walk
//! version=1
//! nRows=2
//! nColumns=2
//! inDegrees=no
//! endheader
//! time	/jointset/hip/flexion/value
//! 0	0.1
//! 0.5	0.2
//! ```
//!
//! CSV: a `time,<labels...>` header record and one record per sample, read
//! and written with the `csv` crate so labels may be quoted. Lines starting
//! with `#` are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use mc_core::Real;

use crate::table::IN_DEGREES_KEY;
use crate::{TableError, TableResult, TimeSeriesTable};

const STO_VERSION: &str = "1";
const END_HEADER: &str = "endheader";
const TIME_LABEL: &str = "time";

/// Metadata key holding the table name from a `.sto` header.
pub const NAME_KEY: &str = "name";

fn parse_value(line: usize, token: &str) -> TableResult<Real> {
    token.trim().parse::<Real>().map_err(|_| TableError::Parse {
        line,
        what: format!("not a number: '{}'", token.trim()),
    })
}

fn parse_rows<'a>(
    lines: impl Iterator<Item = (usize, &'a str)>,
    split: impl Fn(&'a str) -> Vec<&'a str>,
    ncols: usize,
) -> TableResult<(Vec<Real>, Vec<Vec<Real>>)> {
    let mut times = Vec::new();
    let mut rows = Vec::new();
    for (line_no, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let tokens = split(line);
        if tokens.len() != ncols + 1 {
            return Err(TableError::Parse {
                line: line_no,
                what: format!("expected {} values, found {}", ncols + 1, tokens.len()),
            });
        }
        times.push(parse_value(line_no, tokens[0])?);
        let row = tokens[1..]
            .iter()
            .map(|t| parse_value(line_no, t))
            .collect::<TableResult<Vec<_>>>()?;
        rows.push(row);
    }
    Ok((times, rows))
}

fn split_sto(line: &str) -> Vec<&str> {
    if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split_whitespace().collect()
    }
}

pub fn from_sto_str(content: &str) -> TableResult<TimeSeriesTable> {
    let mut lines = content.lines().enumerate().map(|(i, l)| (i + 1, l));
    let mut metadata = BTreeMap::new();
    let mut declared_rows = None;
    let mut found_end = false;

    for (line_no, line) in lines.by_ref() {
        let line = line.trim();
        if line == END_HEADER {
            found_end = true;
            break;
        }
        if line.is_empty() {
            continue;
        }
        match line.split_once('=') {
            Some(("nRows", v)) => {
                declared_rows = Some(v.trim().parse::<usize>().map_err(|_| TableError::Parse {
                    line: line_no,
                    what: format!("invalid nRows '{v}'"),
                })?);
            }
            Some(("nColumns", _)) | Some(("version", _)) => {}
            Some((k, v)) => {
                metadata.insert(k.trim().to_string(), v.trim().to_string());
            }
            None => {
                metadata.insert(NAME_KEY.to_string(), line.to_string());
            }
        }
    }
    if !found_end {
        return Err(TableError::Parse {
            line: content.lines().count(),
            what: format!("missing '{END_HEADER}'"),
        });
    }

    let (header_no, header) = lines
        .by_ref()
        .find(|(_, l)| !l.trim().is_empty())
        .ok_or_else(|| TableError::Parse {
            line: content.lines().count(),
            what: "missing column labels".into(),
        })?;
    let mut tokens = split_sto(header.trim_end());
    if tokens.first().map(|t| t.trim()) != Some(TIME_LABEL) {
        return Err(TableError::Parse {
            line: header_no,
            what: format!("first column must be '{TIME_LABEL}'"),
        });
    }
    let labels: Vec<String> = tokens.drain(1..).map(|t| t.trim().to_string()).collect();

    let (times, rows) = parse_rows(lines, split_sto, labels.len())?;
    if let Some(n) = declared_rows
        && n != rows.len()
    {
        return Err(TableError::Shape {
            what: format!("header declares {n} rows, file has {}", rows.len()),
        });
    }

    let table = TimeSeriesTable::from_rows(times, labels, &rows)?;
    Ok(table.with_metadata(metadata))
}

pub fn to_sto_string(table: &TimeSeriesTable) -> String {
    let mut out = String::new();
    out.push_str(table.metadata(NAME_KEY).unwrap_or("table"));
    out.push('\n');
    out.push_str(&format!("version={STO_VERSION}\n"));
    out.push_str(&format!("nRows={}\n", table.num_rows()));
    out.push_str(&format!("nColumns={}\n", table.num_columns() + 1));
    out.push_str(&format!(
        "{IN_DEGREES_KEY}={}\n",
        table.metadata(IN_DEGREES_KEY).unwrap_or("no")
    ));
    for (k, v) in table.metadata_entries() {
        if k != NAME_KEY && k != IN_DEGREES_KEY {
            out.push_str(&format!("{k}={v}\n"));
        }
    }
    out.push_str(END_HEADER);
    out.push('\n');

    out.push_str(TIME_LABEL);
    for label in table.labels() {
        out.push('\t');
        out.push_str(label);
    }
    out.push('\n');
    write_rows(table, &mut out);
    out
}

pub fn from_csv_str(content: &str) -> TableResult<TimeSeriesTable> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let header = reader.headers()?.clone();
    if header.get(0) != Some(TIME_LABEL) {
        return Err(TableError::Parse {
            line: header.position().map_or(1, |p| p.line() as usize),
            what: format!("first column must be '{TIME_LABEL}'"),
        });
    }
    let labels: Vec<String> = header.iter().skip(1).map(str::to_string).collect();

    let mut times = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let mut values = record.iter().map(|token| parse_value(line, token));
        if let Some(time) = values.next() {
            times.push(time?);
        }
        rows.push(values.collect::<TableResult<Vec<_>>>()?);
    }
    TimeSeriesTable::from_rows(times, labels, &rows)
}

/// Row-length mismatches carry the offending line.
fn csv_error(err: csv::Error) -> TableError {
    if let csv::ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return TableError::Parse {
            line: pos.as_ref().map_or(0, |p| p.line() as usize),
            what: format!("expected {expected_len} values, found {len}"),
        };
    }
    TableError::Csv(err)
}

pub fn to_csv_string(table: &TimeSeriesTable) -> TableResult<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    let header = std::iter::once(TIME_LABEL).chain(table.labels().iter().map(String::as_str));
    writer.write_record(header)?;
    for (r, t) in table.times().iter().enumerate() {
        let record = std::iter::once(t.to_string())
            .chain((0..table.num_columns()).map(|c| table.data()[(r, c)].to_string()));
        writer.write_record(record)?;
    }
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    String::from_utf8(bytes).map_err(|err| TableError::InvalidArg {
        what: format!("CSV output is not UTF-8: {err}"),
    })
}

fn write_rows(table: &TimeSeriesTable, out: &mut String) {
    for (r, t) in table.times().iter().enumerate() {
        out.push_str(&t.to_string());
        for c in 0..table.num_columns() {
            out.push('\t');
            out.push_str(&table.data()[(r, c)].to_string());
        }
        out.push('\n');
    }
}

pub fn read_sto(path: &Path) -> TableResult<TimeSeriesTable> {
    let content = fs::read_to_string(path)?;
    let table = from_sto_str(&content)?;
    tracing::debug!(path = %path.display(), rows = table.num_rows(), "read .sto table");
    Ok(table)
}

pub fn write_sto(path: &Path, table: &TimeSeriesTable) -> TableResult<()> {
    fs::write(path, to_sto_string(table))?;
    Ok(())
}

pub fn read_csv(path: &Path) -> TableResult<TimeSeriesTable> {
    let content = fs::read_to_string(path)?;
    let table = from_csv_str(&content)?;
    tracing::debug!(path = %path.display(), rows = table.num_rows(), "read CSV table");
    Ok(table)
}

pub fn write_csv(path: &Path, table: &TimeSeriesTable) -> TableResult<()> {
    fs::write(path, to_csv_string(table)?)?;
    Ok(())
}

pub fn read_json(path: &Path) -> TableResult<TimeSeriesTable> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json(path: &Path, table: &TimeSeriesTable) -> TableResult<()> {
    let json = serde_json::to_string_pretty(table)?;
    fs::write(path, json)?;
    Ok(())
}
