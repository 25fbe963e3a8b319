//! Reads the tracking sheet into temperature and period entries.
//!
//! Layout: row 1 is a header, column B holds the date, column C the basal
//! temperature and column D the period flag ("Ja"/"Nein"). Column A carries a
//! cycle-day counter that is deliberately ignored; period days come from the
//! explicit flag only.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};

use crate::error::ImportError;
use crate::models::{ExtractedEntries, FlowIntensity, PeriodEntry, TemperatureEntry};

const DATE_COLUMN: usize = 1;
const TEMPERATURE_COLUMN: usize = 2;
const FLAG_COLUMN: usize = 3;

/// A cell reduced to what the import cares about, independent of file format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Error(String),
}

impl Cell {
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => Cell::Date(value.date()),
                None => Cell::Error(dt.to_string()),
            },
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }

    fn describe(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) | Cell::Error(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.to_string(),
        }
    }
}

/// The three columns of one data row. `row` is the 1-based sheet row number.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row: usize,
    pub date: Cell,
    pub temperature: Cell,
    pub flag: Cell,
}

/// Opens `path` and extracts entries from the first worksheet, or from `sheet`
/// when given. `.csv` files are read as plain text with the same layout.
pub fn read_entries(path: &Path, sheet: Option<&str>) -> Result<ExtractedEntries, ImportError> {
    info!("reading {}", path.display());

    let rows = if is_csv(path) {
        read_csv_rows(path)?
    } else {
        read_workbook_rows(path, sheet)?
    };
    debug!("{} data rows in sheet", rows.len());

    extract(rows)
}

/// Applies the row rules in order. A row without a date yields nothing; a
/// present temperature yields one temperature entry; a yes flag yields one
/// period entry. Unparseable dates or temperatures abort the whole extraction.
pub fn extract<I>(rows: I) -> Result<ExtractedEntries, ImportError>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut entries = ExtractedEntries::default();

    for raw in rows {
        let Some(date) = parse_date(raw.row, &raw.date)? else {
            continue;
        };

        if let Some(temperature) = parse_temperature(raw.row, &raw.temperature)? {
            entries.temperatures.push(TemperatureEntry { date, temperature });
        }

        if matches!(&raw.flag, Cell::Text(text) if is_period_flag(text)) {
            entries.periods.push(PeriodEntry {
                date,
                flow_intensity: FlowIntensity::Medium,
            });
        }
    }

    Ok(entries)
}

pub fn is_period_flag(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "ja" | "yes")
}

fn parse_date(row: usize, cell: &Cell) -> Result<Option<NaiveDate>, ImportError> {
    let invalid = || ImportError::InvalidDate {
        row,
        value: cell.describe(),
    };

    match cell {
        Cell::Empty => Ok(None),
        Cell::Text(text) if text.trim().is_empty() => Ok(None),
        Cell::Date(date) => Ok(Some(*date)),
        Cell::Text(text) => parse_date_text(text.trim()).map(Some).ok_or_else(invalid),
        Cell::Number(_) | Cell::Error(_) => Err(invalid()),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|value| value.date())
        })
}

fn parse_temperature(row: usize, cell: &Cell) -> Result<Option<f64>, ImportError> {
    let value = match cell {
        Cell::Empty => return Ok(None),
        Cell::Text(text) if text.trim().is_empty() => return Ok(None),
        Cell::Number(n) => Some(*n),
        Cell::Text(text) => text.trim().replace(',', ".").parse::<f64>().ok(),
        Cell::Date(_) | Cell::Error(_) => None,
    };

    match value {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(ImportError::InvalidTemperature {
            row,
            value: cell.describe(),
        }),
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn read_workbook_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(ImportError::SheetNotFound(name.to_string()));
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::SheetNotFound("<first sheet>".to_string()))??,
    };

    Ok(rows_from_range(&range))
}

/// Walks the used area by absolute position so a blank column A or leading
/// blank rows do not shift the fixed column layout.
fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let (Some((start_row, _)), Some((end_row, _))) = (range.start(), range.end()) else {
        return Vec::new();
    };

    let cell = |row: u32, col: usize| {
        range
            .get_value((row, col as u32))
            .map(Cell::from_data)
            .unwrap_or(Cell::Empty)
    };

    (start_row.max(1)..=end_row)
        .map(|row| RawRow {
            row: row as usize + 1,
            date: cell(row, DATE_COLUMN),
            temperature: cell(row, TEMPERATURE_COLUMN),
            flag: cell(row, FLAG_COLUMN),
        })
        .collect()
}

fn read_csv_rows(path: &Path) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |col: usize| record.get(col).map(Cell::from_text).unwrap_or(Cell::Empty);
        rows.push(RawRow {
            row: index + 2,
            date: cell(DATE_COLUMN),
            temperature: cell(TEMPERATURE_COLUMN),
            flag: cell(FLAG_COLUMN),
        });
    }

    Ok(rows)
}
