use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Fold a label for lenient matching: trimmed, lowercase, common Portuguese
/// accents stripped, `_`/`-`/`/` treated as spaces.
fn fold_label(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'Ú' => 'u',
            'ç' | 'Ç' => 'c',
            '_' | '-' | '/' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Category of public work. Each category has its own reference cost per m².
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WorkType {
    Building,
    Sanitation,
    Paving,
    Drainage,
    BridgeViaduct,
    Renovation,
    SlopeContainment,
    PublicFacility,
}

impl WorkType {
    pub const ALL: [WorkType; 8] = [
        WorkType::Building,
        WorkType::Sanitation,
        WorkType::Paving,
        WorkType::Drainage,
        WorkType::BridgeViaduct,
        WorkType::Renovation,
        WorkType::SlopeContainment,
        WorkType::PublicFacility,
    ];

    /// Label as it appears in the source datasets.
    pub fn label(self) -> &'static str {
        match self {
            WorkType::Building => "Edificação",
            WorkType::Sanitation => "Saneamento",
            WorkType::Paving => "Pavimentação",
            WorkType::Drainage => "Drenagem",
            WorkType::BridgeViaduct => "Ponte/Viaduto",
            WorkType::Renovation => "Reforma",
            WorkType::SlopeContainment => "Contenção de Encostas",
            WorkType::PublicFacility => "Equipamento Público",
        }
    }

    fn english(self) -> &'static str {
        match self {
            WorkType::Building => "building",
            WorkType::Sanitation => "sanitation",
            WorkType::Paving => "paving",
            WorkType::Drainage => "drainage",
            WorkType::BridgeViaduct => "bridge viaduct",
            WorkType::Renovation => "renovation",
            WorkType::SlopeContainment => "slope containment",
            WorkType::PublicFacility => "public facility",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized work type '{0}'")]
pub struct ParseWorkTypeError(pub String);

impl FromStr for WorkType {
    type Err = ParseWorkTypeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let folded = fold_label(raw);
        WorkType::ALL
            .into_iter()
            .find(|kind| fold_label(kind.label()) == folded || kind.english() == folded)
            .ok_or_else(|| ParseWorkTypeError(raw.trim().to_string()))
    }
}

impl TryFrom<String> for WorkType {
    type Error = ParseWorkTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WorkType> for String {
    fn from(value: WorkType) -> Self {
        value.label().to_string()
    }
}

/// Lifecycle state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProjectStatus {
    Completed,
    InProgress,
    Stalled,
    NotStarted,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Completed,
        ProjectStatus::InProgress,
        ProjectStatus::Stalled,
        ProjectStatus::NotStarted,
        ProjectStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Completed => "Concluída",
            ProjectStatus::InProgress => "Em Andamento",
            ProjectStatus::Stalled => "Paralisada",
            ProjectStatus::NotStarted => "Não Iniciada",
            ProjectStatus::Cancelled => "Cancelada",
        }
    }

    fn english(self) -> &'static str {
        match self {
            ProjectStatus::Completed => "completed",
            ProjectStatus::InProgress => "in progress",
            ProjectStatus::Stalled => "stalled",
            ProjectStatus::NotStarted => "not started",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized project status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for ProjectStatus {
    type Err = ParseStatusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let folded = fold_label(raw);
        ProjectStatus::ALL
            .into_iter()
            .find(|status| fold_label(status.label()) == folded || status.english() == folded)
            .ok_or_else(|| ParseStatusError(raw.trim().to_string()))
    }
}

impl TryFrom<String> for ProjectStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProjectStatus> for String {
    fn from(value: ProjectStatus) -> Self {
        value.label().to_string()
    }
}

/// Quality tier derived from the final index. Declared best to worst so the
/// derived ordering matches the band order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum Classification {
    Excellent,
    Good,
    Regular,
    Poor,
    Critical,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Classification::Excellent,
        Classification::Good,
        Classification::Regular,
        Classification::Poor,
        Classification::Critical,
    ];

    /// Map an index to its band. Lower bounds are inclusive.
    pub fn from_index(index: u8) -> Self {
        match index {
            80.. => Classification::Excellent,
            60..=79 => Classification::Good,
            40..=59 => Classification::Regular,
            20..=39 => Classification::Poor,
            _ => Classification::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Classification::Excellent => "Excellent",
            Classification::Good => "Good",
            Classification::Regular => "Regular",
            Classification::Poor => "Poor",
            Classification::Critical => "Critical",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<Classification> for String {
    fn from(value: Classification) -> Self {
        value.label().to_string()
    }
}

/// One public-works project as supplied by a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub municipality: String,
    pub work_type: WorkType,
    pub agency: String,
    pub status: ProjectStatus,
    pub built_area_m2: f64,
    pub contracted_value: f64,
    pub paid_amount: f64,
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub actual_start: NaiveDate,
    /// `None` while the project is still running.
    #[serde(default)]
    pub actual_end: Option<NaiveDate>,
    pub physical_pct: f64,
    pub financial_pct: f64,
    #[serde(default)]
    pub amendments: u32,
    #[serde(default)]
    pub stoppages: u32,
    #[serde(default)]
    pub recurrence: bool,
}

/// CSV row before validation. Every column is optional so a malformed row
/// can be counted instead of aborting the whole load.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Id")]
    pub id: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Municipality")]
    pub municipality: Option<String>,
    #[serde(rename = "WorkType")]
    pub work_type: Option<String>,
    #[serde(rename = "Agency")]
    pub agency: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "BuiltAreaM2")]
    pub built_area_m2: Option<String>,
    #[serde(rename = "ContractedValue")]
    pub contracted_value: Option<String>,
    #[serde(rename = "PaidAmount")]
    pub paid_amount: Option<String>,
    #[serde(rename = "PlannedStart")]
    pub planned_start: Option<String>,
    #[serde(rename = "PlannedEnd")]
    pub planned_end: Option<String>,
    #[serde(rename = "ActualStart")]
    pub actual_start: Option<String>,
    #[serde(rename = "ActualEnd")]
    pub actual_end: Option<String>,
    #[serde(rename = "PhysicalPct")]
    pub physical_pct: Option<String>,
    #[serde(rename = "FinancialPct")]
    pub financial_pct: Option<String>,
    #[serde(rename = "Amendments")]
    pub amendments: Option<String>,
    #[serde(rename = "Stoppages")]
    pub stoppages: Option<String>,
    #[serde(rename = "Recurrence")]
    pub recurrence: Option<String>,
}

/// The four 0–100 sub-scores behind an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentScores {
    pub cost: u8,
    pub schedule: u8,
    pub recurrence: u8,
    pub execution: u8,
}

/// Raw measurements the component scores were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawMetrics {
    /// Rounded to a whole currency unit.
    pub cost_per_m2: f64,
    /// Rounded to a whole percent, never negative.
    pub delay_pct: f64,
    /// Signed, rounded to two decimals. Negative means underspend.
    pub budget_deviation_pct: f64,
    pub recurrence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub project_id: String,
    pub project_name: String,
    pub municipality: String,
    pub work_type: WorkType,
    pub status: ProjectStatus,
    pub index: u8,
    pub classification: Classification,
    pub components: ComponentScores,
    pub metrics: RawMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioStatistics {
    pub total: usize,
    pub mean_index: u8,
    pub mean_cost_per_m2: i64,
    pub mean_delay_pct: i64,
    /// Percent of projects carrying the recurrence flag.
    pub recurrence_rate: u8,
    pub by_classification: BTreeMap<Classification, usize>,
    pub by_status: BTreeMap<ProjectStatus, usize>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Id")]
    #[tabled(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Municipality")]
    #[tabled(rename = "Municipality")]
    pub municipality: String,
    #[serde(rename = "WorkType")]
    #[tabled(rename = "WorkType")]
    pub work_type: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Index")]
    #[tabled(rename = "Index")]
    pub index: u8,
    #[serde(rename = "Classification")]
    #[tabled(rename = "Classification")]
    pub classification: String,
    #[serde(rename = "CostScore")]
    #[tabled(rename = "Cost")]
    pub cost_score: u8,
    #[serde(rename = "ScheduleScore")]
    #[tabled(rename = "Schedule")]
    pub schedule_score: u8,
    #[serde(rename = "RecurrenceScore")]
    #[tabled(rename = "Recurrence")]
    pub recurrence_score: u8,
    #[serde(rename = "ExecutionScore")]
    #[tabled(rename = "Execution")]
    pub execution_score: u8,
    #[serde(rename = "CostPerM2")]
    #[tabled(rename = "CostPerM2")]
    pub cost_per_m2: String,
    #[serde(rename = "DelayPct")]
    #[tabled(rename = "DelayPct")]
    pub delay_pct: String,
    #[serde(rename = "BudgetDeviationPct")]
    #[tabled(rename = "BudgetDevPct")]
    pub budget_deviation_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct BreakdownRow {
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Share")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ReferenceRow {
    #[tabled(rename = "WorkType")]
    pub work_type: String,
    #[tabled(rename = "ReferenceCostPerM2")]
    pub reference_cost: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_type_accepts_labels_and_ascii_variants() {
        assert_eq!("Edificação".parse::<WorkType>(), Ok(WorkType::Building));
        assert_eq!("edificacao".parse::<WorkType>(), Ok(WorkType::Building));
        assert_eq!(" Ponte/Viaduto ".parse::<WorkType>(), Ok(WorkType::BridgeViaduct));
        assert_eq!("slope_containment".parse::<WorkType>(), Ok(WorkType::SlopeContainment));
        assert_eq!(
            "Contencao de  Encostas".parse::<WorkType>(),
            Ok(WorkType::SlopeContainment)
        );
    }

    #[test]
    fn unknown_enumerations_are_rejected() {
        let err = "Aeroporto".parse::<WorkType>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized work type 'Aeroporto'");
        assert!("Suspensa".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn status_round_trips_through_label() {
        for status in ProjectStatus::ALL {
            assert_eq!(status.label().parse::<ProjectStatus>(), Ok(status));
        }
        assert_eq!("não iniciada".parse::<ProjectStatus>(), Ok(ProjectStatus::NotStarted));
        assert_eq!("in_progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
    }

    #[test]
    fn classification_bands_are_inclusive_on_lower_bound() {
        assert_eq!(Classification::from_index(100), Classification::Excellent);
        assert_eq!(Classification::from_index(80), Classification::Excellent);
        assert_eq!(Classification::from_index(79), Classification::Good);
        assert_eq!(Classification::from_index(60), Classification::Good);
        assert_eq!(Classification::from_index(59), Classification::Regular);
        assert_eq!(Classification::from_index(40), Classification::Regular);
        assert_eq!(Classification::from_index(39), Classification::Poor);
        assert_eq!(Classification::from_index(20), Classification::Poor);
        assert_eq!(Classification::from_index(19), Classification::Critical);
        assert_eq!(Classification::from_index(0), Classification::Critical);
    }

    #[test]
    fn record_deserializes_from_json_with_defaults() {
        let json = r#"{
            "id": "RJ-1", "name": "Escola", "municipality": "Niterói",
            "work_type": "Edificação", "agency": "SEEDUC", "status": "Em Andamento",
            "built_area_m2": 1200.0, "contracted_value": 4000000.0, "paid_amount": 0.0,
            "planned_start": "2023-01-10", "planned_end": "2023-12-10",
            "actual_start": "2023-02-01", "actual_end": null,
            "physical_pct": 40.0, "financial_pct": 45.0
        }"#;
        let record: ProjectRecord = serde_json::from_str(json).expect("valid record");
        assert_eq!(record.work_type, WorkType::Building);
        assert_eq!(record.status, ProjectStatus::InProgress);
        assert_eq!(record.actual_end, None);
        assert_eq!(record.amendments, 0);
        assert!(!record.recurrence);
    }

    #[test]
    fn json_rejects_unknown_work_type() {
        let json = r#"{
            "id": "RJ-1", "name": "x", "municipality": "y", "work_type": "Aeroporto",
            "agency": "z", "status": "Concluída", "built_area_m2": 1.0,
            "contracted_value": 1.0, "paid_amount": 1.0,
            "planned_start": "2023-01-10", "planned_end": "2023-12-10",
            "actual_start": "2023-02-01", "physical_pct": 1.0, "financial_pct": 1.0
        }"#;
        let err = serde_json::from_str::<ProjectRecord>(json).unwrap_err();
        assert!(err.to_string().contains("unrecognized work type"));
    }
}
