use crate::types::{
    ParseStatusError, ParseWorkTypeError, ProjectRecord, ProjectStatus, RawRow, WorkType,
};
use crate::util::{parse_bool_safe, parse_count_safe, parse_date_safe, parse_f64_safe};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unable to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported file type for {0} (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("project {id}: {source}")]
    InvalidRecord {
        id: String,
        #[source]
        source: RowError,
    },
}

/// Why a single CSV row was skipped.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid number in {field}: '{value}'")]
    Number { field: &'static str, value: String },
    #[error("negative value in {field}: {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("invalid date in {field}: '{value}'")]
    Date { field: &'static str, value: String },
    #[error("invalid {field}: '{value}'")]
    Flag { field: &'static str, value: String },
    #[error(transparent)]
    WorkType(#[from] ParseWorkTypeError),
    #[error(transparent)]
    Status(#[from] ParseStatusError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

fn text(value: Option<String>, field: &'static str) -> Result<String, RowError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(RowError::Missing(field))
}

fn number(value: Option<&str>, field: &'static str) -> Result<f64, RowError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Err(RowError::Missing(field)),
        Some(raw) => parse_f64_safe(Some(raw)).ok_or_else(|| RowError::Number {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Blank means nothing paid yet; anything else must be a number.
fn optional_number(value: Option<&str>, field: &'static str) -> Result<f64, RowError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(0.0),
        Some(raw) => number(Some(raw), field),
    }
}

fn count(value: Option<&str>, field: &'static str) -> Result<u32, RowError> {
    parse_count_safe(value).ok_or_else(|| RowError::Number {
        field,
        value: value.unwrap_or_default().to_string(),
    })
}

fn date(value: Option<&str>, field: &'static str) -> Result<chrono::NaiveDate, RowError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Err(RowError::Missing(field)),
        Some(raw) => parse_date_safe(Some(raw)).ok_or_else(|| RowError::Date {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Area and monetary fields must not be negative.
pub fn validate(record: &ProjectRecord) -> Result<(), RowError> {
    for (field, value) in [
        ("BuiltAreaM2", record.built_area_m2),
        ("ContractedValue", record.contracted_value),
        ("PaidAmount", record.paid_amount),
    ] {
        if value < 0.0 {
            return Err(RowError::Negative { field, value });
        }
    }
    Ok(())
}

/// Validate one raw row. Work type and status are resolved here so that an
/// unknown category never reaches the scoring code.
pub fn clean_row(row: RawRow) -> Result<ProjectRecord, RowError> {
    let work_type: WorkType = text(row.work_type, "WorkType")?.parse()?;
    let status: ProjectStatus = text(row.status, "Status")?.parse()?;

    let actual_end = match row.actual_end.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(date(Some(raw), "ActualEnd")?),
    };
    let recurrence =
        parse_bool_safe(row.recurrence.as_deref()).ok_or_else(|| RowError::Flag {
            field: "Recurrence",
            value: row.recurrence.clone().unwrap_or_default(),
        })?;

    let record = ProjectRecord {
        id: text(row.id, "Id")?,
        name: text(row.name, "Name")?,
        municipality: row
            .municipality
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        work_type,
        agency: row
            .agency
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        status,
        built_area_m2: number(row.built_area_m2.as_deref(), "BuiltAreaM2")?,
        contracted_value: number(row.contracted_value.as_deref(), "ContractedValue")?,
        paid_amount: optional_number(row.paid_amount.as_deref(), "PaidAmount")?,
        planned_start: date(row.planned_start.as_deref(), "PlannedStart")?,
        planned_end: date(row.planned_end.as_deref(), "PlannedEnd")?,
        actual_start: date(row.actual_start.as_deref(), "ActualStart")?,
        actual_end,
        physical_pct: number(row.physical_pct.as_deref(), "PhysicalPct")?,
        financial_pct: number(row.financial_pct.as_deref(), "FinancialPct")?,
        amendments: count(row.amendments.as_deref(), "Amendments")?,
        stoppages: count(row.stoppages.as_deref(), "Stoppages")?,
        recurrence,
    };
    validate(&record)?;
    Ok(record)
}

/// Read project rows from CSV. Rows that fail to deserialize or validate
/// are skipped and counted in the report; only a broken header or an
/// unreadable stream fails the whole load.
pub fn load_csv<R: Read>(reader: R) -> Result<(Vec<ProjectRecord>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.headers()?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for (line, result) in rdr.deserialize::<RawRow>().enumerate() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(err) => {
                debug!(row = line + 1, %err, "skipping undecodable row");
                report.parse_errors += 1;
                continue;
            }
        };
        match clean_row(row) {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!(row = line + 1, %err, "skipping invalid row");
                report.parse_errors += 1;
            }
        }
    }
    report.loaded_rows = records.len();
    Ok((records, report))
}

/// Read a JSON array of project records. Unlike CSV this is all-or-nothing:
/// one bad element rejects the document.
pub fn load_json<R: Read>(reader: R) -> Result<Vec<ProjectRecord>, LoadError> {
    let records: Vec<ProjectRecord> = serde_json::from_reader(reader)?;
    for record in &records {
        validate(record).map_err(|source| LoadError::InvalidRecord {
            id: record.id.clone(),
            source,
        })?;
    }
    Ok(records)
}

/// Load a `.csv` or `.json` file, picking the format from the extension.
pub fn load_path(path: &Path) -> Result<(Vec<ProjectRecord>, LoadReport), LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let open = || {
        File::open(path)
            .map(BufReader::new)
            .map_err(|source| LoadError::Open {
                path: path.to_path_buf(),
                source,
            })
    };

    let (records, report) = match extension.as_deref() {
        Some("csv") => load_csv(open()?)?,
        Some("json") => {
            let records = load_json(open()?)?;
            let report = LoadReport {
                total_rows: records.len(),
                loaded_rows: records.len(),
                parse_errors: 0,
            };
            (records, report)
        }
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };

    info!(
        path = %path.display(),
        total = report.total_rows,
        loaded = report.loaded_rows,
        skipped = report.parse_errors,
        "loaded project records"
    );
    Ok((records, report))
}
