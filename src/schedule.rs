//! Plot schedule ingestion.
//!
//! The schedule is a spreadsheet with a title row on the first physical row
//! and the column headers on the second, one row per plot. Excel workbooks
//! are read with calamine and plain `.csv` schedules with the csv crate;
//! both feed the same grid-to-row conversion so the column contract is
//! identical across formats.

use crate::core::normalize::Handedness;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const COLUMN_XML_FILENAME: &str = "XML Filename";
pub const COLUMN_DWELLING_ORIENTATION: &str = "Dwelling Orientation";
pub const COLUMN_AES_REFERENCE: &str = "AES Reference";
pub const COLUMN_CONNOTATION: &str = "Connotation";
pub const COLUMN_SHELTERED_SIDES: &str = "Sheltered Sides";
pub const COLUMN_PLOT_NUMBER: &str = "Plot Number";
pub const COLUMN_ROOF_ORIENTATION: &str = "Roof Orientation (PV orientation)";
pub const COLUMN_ROOF_PITCH: &str = "Roof Pitch (PV pitch)";
pub const COLUMN_HANDEDNESS: &str = "AS/OP";

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to open schedule workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to read csv schedule: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error reading schedule: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported schedule format `{0}` (expected .xlsx/.xlsm/.xltx/.xltm/.xls/.csv)")]
    UnsupportedFormat(String),
    #[error("worksheet `{0}` was not found in the schedule workbook")]
    MissingWorksheet(String),
    #[error("the schedule has no header row")]
    MissingHeaderRow,
    #[error("the schedule is missing required column `{0}`")]
    MissingColumn(&'static str),
}

/// One schedule record, as read: cells are kept raw and normalized at the
/// point of use, except the handedness flag which has a well-defined default.
#[derive(Clone, Debug, PartialEq)]
pub struct PlotRow {
    pub plot_reference: String,
    pub xml_filename: String,
    pub dwelling_orientation: String,
    pub connotation: Option<String>,
    pub sheltered_sides: Option<String>,
    pub plot_number: Option<String>,
    pub roof_orientation: Option<String>,
    pub roof_pitch: Option<String>,
    pub handedness: Handedness,
}

/// Reads every data row from the schedule at `path`. For workbooks, `sheet`
/// selects the worksheet; `None` reads the first one.
pub fn read_schedule(path: &Path, sheet: Option<&str>) -> Result<Vec<PlotRow>, ScheduleError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let grid = match extension.as_str() {
        "xlsx" | "xlsm" | "xltx" | "xltm" | "xls" => read_workbook_grid(path, sheet)?,
        "csv" => read_csv_grid(path)?,
        other => return Err(ScheduleError::UnsupportedFormat(other.to_string())),
    };

    let rows = rows_from_grid(grid)?;
    debug!(count = rows.len(), "read schedule rows");
    Ok(rows)
}

type Grid = Vec<Vec<Option<String>>>;

fn read_workbook_grid(path: &Path, sheet: Option<&str>) -> Result<Grid, ScheduleError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ScheduleError::MissingWorksheet("<first>".to_string()))?,
    };
    if !workbook.sheet_names().iter().any(|name| name == &sheet_name) {
        return Err(ScheduleError::MissingWorksheet(sheet_name));
    }
    let range = workbook.worksheet_range(&sheet_name)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        // Excel hands numeric cells over as floats; Display renders whole
        // numbers without a trailing ".0".
        other => Some(other.to_string()).filter(|text| !text.is_empty()),
    }
}

fn read_csv_grid(path: &Path) -> Result<Grid, ScheduleError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(
            record
                .iter()
                .map(|cell| Some(cell.to_string()).filter(|text| !text.trim().is_empty()))
                .collect(),
        );
    }
    Ok(grid)
}

// The first physical row is a title banner; headers live on the second row
// and have their surrounding whitespace ignored.
fn rows_from_grid(grid: Grid) -> Result<Vec<PlotRow>, ScheduleError> {
    let mut rows_iter = grid.into_iter();
    let _title = rows_iter.next();
    let header = rows_iter.next().ok_or(ScheduleError::MissingHeaderRow)?;

    let column = |name: &'static str| -> Result<usize, ScheduleError> {
        header
            .iter()
            .position(|cell| cell.as_deref().map(str::trim) == Some(name))
            .ok_or(ScheduleError::MissingColumn(name))
    };

    let filename_column = column(COLUMN_XML_FILENAME)?;
    let orientation_column = column(COLUMN_DWELLING_ORIENTATION)?;
    let reference_column = column(COLUMN_AES_REFERENCE)?;
    let connotation_column = column(COLUMN_CONNOTATION)?;
    let sheltered_column = column(COLUMN_SHELTERED_SIDES)?;
    let plot_number_column = column(COLUMN_PLOT_NUMBER)?;
    let roof_orientation_column = column(COLUMN_ROOF_ORIENTATION)?;
    let roof_pitch_column = column(COLUMN_ROOF_PITCH)?;
    let handedness_column = column(COLUMN_HANDEDNESS)?;

    Ok(rows_iter
        .map(|cells| {
            let cell = |index: usize| -> Option<String> {
                cells
                    .get(index)
                    .and_then(Clone::clone)
                    .filter(|text| !text.trim().is_empty())
            };
            PlotRow {
                plot_reference: cell(reference_column)
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default(),
                xml_filename: cell(filename_column)
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default(),
                dwelling_orientation: cell(orientation_column)
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default(),
                connotation: cell(connotation_column),
                sheltered_sides: cell(sheltered_column),
                plot_number: cell(plot_number_column),
                roof_orientation: cell(roof_orientation_column),
                roof_pitch: cell(roof_pitch_column),
                handedness: Handedness::from_raw(cell(handedness_column).as_deref()),
            }
        })
        .collect())
}
