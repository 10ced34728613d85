//! Reads uploaded CSV and Excel files into header-keyed [`Row`]s.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error::ImportError;
use crate::row::Row;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
}

impl FileFormat {
    /// Chooses the format from the file extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedFormat`] for any other extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Header row and data rows of the first sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Parses `bytes` according to the extension of `file_name`.
///
/// The first row is the header row. Columns with a blank header and rows
/// with no non-blank cell are skipped.
///
/// # Errors
///
/// Returns [`ImportError::UnsupportedFormat`] for unknown extensions,
/// [`ImportError::MissingHeaderRow`] when there is no usable header,
/// [`ImportError::EmptyFile`] when there are no data rows, and a read error
/// when the content is not valid for its format.
pub fn read_file(file_name: &str, bytes: &[u8]) -> Result<ParsedSheet, ImportError> {
    let grid = match FileFormat::from_file_name(file_name)? {
        FileFormat::Csv => read_csv(bytes)?,
        FileFormat::Xlsx | FileFormat::Xls => read_workbook(bytes)?,
    };
    into_sheet(grid)
}

/// Raw cells, first row being the header. `None` marks a cell the source
/// did not have at all.
type Grid = Vec<Vec<Option<String>>>;

fn read_csv(bytes: &[u8]) -> Result<Grid, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|cell| Some(cell.to_string())).collect());
    }
    Ok(grid)
}

fn read_workbook(bytes: &[u8]) -> Result<Grid, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Err(ImportError::MissingHeaderRow);
    };
    let range = range?;

    Ok(range
        .rows()
        .map(|cells| cells.iter().map(cell_text).collect())
        .collect())
}

/// Renders a cell from its stored value, not its display format. A cell
/// shown as `5.2%` holds `0.052` and is read as such.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => Some(String::new()),
        Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn into_sheet(grid: Grid) -> Result<ParsedSheet, ImportError> {
    let mut lines = grid.into_iter();
    let header_line = lines.next().ok_or(ImportError::MissingHeaderRow)?;

    let columns: Vec<(usize, String)> = header_line
        .into_iter()
        .enumerate()
        .filter_map(|(i, h)| h.filter(|h| !h.trim().is_empty()).map(|h| (i, h)))
        .collect();
    if columns.is_empty() {
        return Err(ImportError::MissingHeaderRow);
    }

    let rows: Vec<Row> = lines
        .map(|mut cells| {
            let mut row = Row::new();
            for (i, header) in &columns {
                let value = cells.get_mut(*i).and_then(Option::take);
                row.push(header.clone(), value);
            }
            row
        })
        .filter(|row| !row.is_blank())
        .collect();

    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    Ok(ParsedSheet {
        headers: columns.into_iter().map(|(_, h)| h).collect(),
        rows,
    })
}
