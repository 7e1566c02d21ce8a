//! Sheet discovery and CSV/TSV parsing.
//!
//! A source is either one `.csv`/`.tsv` file (a single sheet named after the
//! file stem) or a directory whose `.csv`/`.tsv` files are the sheets, in
//! file-name order.

use super::record::{FeatureRecord, Plan};
use crate::error::{Result, TbgenError};
use std::path::{Path, PathBuf};

/// Row and column counts for one sheet, as shown by `tbgen sheets`.
#[derive(Debug, Clone)]
pub struct SheetSummary {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
struct Sheet {
    name: String,
    path: PathBuf,
}

/// Load the plan from a source.
///
/// With `sheet = None` every sheet is read and rows are concatenated in sheet
/// order. With a sheet name only that sheet is read; an unknown name is a
/// data source error.
pub fn load_plan<P: AsRef<Path>>(source: P, sheet: Option<&str>) -> Result<Plan> {
    let source = source.as_ref();
    let sheets = discover_sheets(source)?;

    let selected: Vec<Sheet> = match sheet {
        Some(wanted) => {
            let found = sheets.iter().find(|s| s.name == wanted).cloned();
            match found {
                Some(s) => vec![s],
                None => {
                    return Err(TbgenError::DataSource(format!(
                        "sheet '{}' not found in '{}'. Available sheets: {}",
                        wanted,
                        source.display(),
                        sheets
                            .iter()
                            .map(|s| s.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                }
            }
        }
        None => sheets,
    };

    let mut records = Vec::new();
    for sheet in &selected {
        let (_, rows) = read_sheet(&sheet.path)?;
        tracing::debug!(sheet = %sheet.name, rows = rows.len(), "loaded sheet");
        for fields in rows {
            let position = records.len() + 1;
            records.push(FeatureRecord::new(sheet.name.clone(), position, fields));
        }
    }

    let plan = Plan::from_records(records);
    tracing::info!(
        source = %source.display(),
        sheets = selected.len(),
        rows = plan.len(),
        "verification plan loaded"
    );
    tracing::debug!(columns = %plan.columns().join(", "), "plan columns");
    Ok(plan)
}

/// Describe every sheet of a source.
pub fn summarize_sheets<P: AsRef<Path>>(source: P) -> Result<Vec<SheetSummary>> {
    discover_sheets(source.as_ref())?
        .into_iter()
        .map(|sheet| {
            let (columns, rows) = read_sheet(&sheet.path)?;
            Ok(SheetSummary {
                name: sheet.name,
                path: sheet.path,
                rows: rows.len(),
                columns,
            })
        })
        .collect()
}

fn discover_sheets(source: &Path) -> Result<Vec<Sheet>> {
    if !source.exists() {
        return Err(TbgenError::DataSource(format!(
            "verification plan '{}' does not exist",
            source.display()
        )));
    }

    if source.is_file() {
        if delimiter_for(source).is_none() {
            return Err(TbgenError::DataSource(format!(
                "unsupported plan file '{}': expected a .csv or .tsv sheet, or a directory of them",
                source.display()
            )));
        }
        return Ok(vec![Sheet {
            name: sheet_name_of(source),
            path: source.to_path_buf(),
        }]);
    }

    let entries = std::fs::read_dir(source).map_err(|e| {
        TbgenError::DataSource(format!(
            "failed to read plan directory '{}': {}",
            source.display(),
            e
        ))
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && delimiter_for(path).is_some())
        .collect();
    paths.sort();

    let mut sheets: Vec<Sheet> = Vec::with_capacity(paths.len());
    for path in paths {
        let name = sheet_name_of(&path);
        if sheets.iter().any(|s| s.name == name) {
            return Err(TbgenError::DataSource(format!(
                "duplicate sheet '{}' in '{}'",
                name,
                source.display()
            )));
        }
        sheets.push(Sheet { name, path });
    }

    if sheets.is_empty() {
        return Err(TbgenError::DataSource(format!(
            "no .csv or .tsv sheets found in '{}'",
            source.display()
        )));
    }

    Ok(sheets)
}

fn sheet_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn delimiter_for(path: &Path) -> Option<u8> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(b','),
        "tsv" => Some(b'\t'),
        _ => None,
    }
}

type Row = Vec<(String, String)>;

/// Read one sheet into its headers and non-blank rows.
fn read_sheet(path: &Path) -> Result<(Vec<String>, Vec<Row>)> {
    let delimiter = delimiter_for(path).unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| {
            TbgenError::DataSource(format!("failed to open sheet '{}': {}", path.display(), e))
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| {
            TbgenError::DataSource(format!(
                "failed to read header row of '{}': {}",
                path.display(),
                e
            ))
        })?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim_start_matches('\u{feff}').trim();
            if h.is_empty() {
                format!("Column {}", i + 1)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            TbgenError::DataSource(format!(
                "failed to parse row {} of '{}': {}",
                line + 2,
                path.display(),
                e
            ))
        })?;

        let mut fields: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();

        // Cells past the header row get positional names.
        for (i, value) in record.iter().enumerate().skip(headers.len()) {
            if value.trim().is_empty() {
                continue;
            }
            tracing::warn!(
                sheet = %path.display(),
                row = line + 2,
                column = i + 1,
                "row is longer than the header row, keeping cell as 'Column {}'",
                i + 1
            );
            fields.push((format!("Column {}", i + 1), value.to_string()));
        }

        if fields.iter().all(|(_, v)| v.trim().is_empty()) {
            continue;
        }
        rows.push(fields);
    }

    Ok((headers, rows))
}
