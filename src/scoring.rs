//! Per-project efficiency index (IEOP).
//!
//! Four component scores are computed independently, each mapped onto
//! `0..=100` by the same contract: raw real value, then rounded (halves up),
//! then clamped. The final index is their weighted sum.
//!
//! Projects without an actual end date are still running and are measured
//! against the evaluation date passed to [`ScoringEngine::new`]. Scoring an
//! ongoing project on two different days can therefore yield two different
//! schedule scores; the date is a parameter so that any single evaluation
//! is reproducible.
use crate::reference::ReferenceCostTable;
use crate::types::{
    Classification, ComponentScores, ProjectRecord, RawMetrics, ScoredResult,
};
use crate::util::{days_between, round_half_up, round_to};
use chrono::NaiveDate;

/// Component weights in percent. They sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weights {
    pub cost: u32,
    pub schedule: u32,
    pub recurrence: u32,
    pub execution: u32,
}

pub const WEIGHTS: Weights = Weights {
    cost: 30,
    schedule: 30,
    recurrence: 15,
    execution: 25,
};

const COST_FULL_MARKS_RATIO: f64 = 0.8;
const COST_ZERO_MARKS_RATIO: f64 = 2.0;

const RECURRENCE_PENALTY: i64 = 40;
const STOPPAGE_PENALTY: i64 = 10;
const AMENDMENT_PENALTY: i64 = 5;

const MISALIGNMENT_WEIGHT: f64 = 1.5;
const OVERSPEND_WEIGHT: f64 = 0.8;

/// Round then clamp onto `0..=100`.
pub fn to_score(raw: f64) -> u8 {
    let rounded = round_half_up(raw);
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(0.0, 100.0) as u8
}

/// Piecewise-linear: full marks at or under 0.8× the reference cost, zero
/// at 2× or more.
pub fn cost_score_from_ratio(ratio: f64) -> u8 {
    if ratio <= COST_FULL_MARKS_RATIO {
        100
    } else if ratio >= COST_ZERO_MARKS_RATIO {
        0
    } else {
        let span = COST_ZERO_MARKS_RATIO - COST_FULL_MARKS_RATIO;
        to_score(100.0 * (1.0 - (ratio - COST_FULL_MARKS_RATIO) / span))
    }
}

pub fn schedule_score_from_delay(delay_pct: f64) -> u8 {
    if delay_pct <= 0.0 {
        100
    } else if delay_pct >= 100.0 {
        0
    } else {
        to_score(100.0 * (1.0 - delay_pct / 100.0))
    }
}

/// Cost per m² actually incurred: the paid amount once payments exist,
/// otherwise the contracted value.
pub fn unit_cost(record: &ProjectRecord) -> f64 {
    let spent = if record.paid_amount > 0.0 {
        record.paid_amount
    } else {
        record.contracted_value
    };
    spent / record.built_area_m2.max(1.0)
}

/// Delay in percent of the planned duration, never negative.
pub fn delay_pct(record: &ProjectRecord, today: NaiveDate) -> f64 {
    let planned = days_between(record.planned_start, record.planned_end) as f64;
    let end = record.actual_end.unwrap_or(today);
    let actual = days_between(record.actual_start, end) as f64;
    ((actual - planned) / planned * 100.0).max(0.0)
}

pub fn recurrence_score(record: &ProjectRecord) -> u8 {
    let mut score: i64 = 100;
    if record.recurrence {
        score -= RECURRENCE_PENALTY;
    }
    score -= i64::from(record.stoppages) * STOPPAGE_PENALTY;
    score -= i64::from(record.amendments) * AMENDMENT_PENALTY;
    score.clamp(0, 100) as u8
}

/// Signed overspend in percent of the contracted value.
pub fn budget_deviation_pct(record: &ProjectRecord) -> f64 {
    (record.paid_amount - record.contracted_value) / record.contracted_value.max(1.0) * 100.0
}

pub fn execution_score(record: &ProjectRecord) -> u8 {
    let misalignment = (record.physical_pct - record.financial_pct).abs();
    let overspend = budget_deviation_pct(record).max(0.0);
    to_score(100.0 - misalignment * MISALIGNMENT_WEIGHT - overspend * OVERSPEND_WEIGHT)
}

/// Weighted combination, computed in integer percent so the result does not
/// depend on how the weights happen to round in binary floating point.
pub fn combine(components: &ComponentScores) -> u8 {
    let weighted = u32::from(components.cost) * WEIGHTS.cost
        + u32::from(components.schedule) * WEIGHTS.schedule
        + u32::from(components.recurrence) * WEIGHTS.recurrence
        + u32::from(components.execution) * WEIGHTS.execution;
    ((weighted + 50) / 100).min(100) as u8
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringEngine<'a> {
    table: &'a ReferenceCostTable,
    today: NaiveDate,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(table: &'a ReferenceCostTable, today: NaiveDate) -> Self {
        Self { table, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn score(&self, record: &ProjectRecord) -> ScoredResult {
        let cost_per_m2 = unit_cost(record);
        let ratio = cost_per_m2 / self.table.cost_for(record.work_type);
        let delay = delay_pct(record, self.today);
        let deviation = budget_deviation_pct(record);

        let components = ComponentScores {
            cost: cost_score_from_ratio(ratio),
            schedule: schedule_score_from_delay(delay),
            recurrence: recurrence_score(record),
            execution: execution_score(record),
        };
        let index = combine(&components);

        ScoredResult {
            project_id: record.id.clone(),
            project_name: record.name.clone(),
            municipality: record.municipality.clone(),
            work_type: record.work_type,
            status: record.status,
            index,
            classification: Classification::from_index(index),
            components,
            metrics: RawMetrics {
                cost_per_m2: round_half_up(cost_per_m2),
                delay_pct: round_half_up(delay),
                budget_deviation_pct: round_to(deviation, 2),
                recurrence: record.recurrence,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{ProjectStatus, WorkType};

    pub(crate) fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    /// A finished building with every component at full marks except cost
    /// (3000/m² against a 3500 reference).
    pub(crate) fn sample_record() -> ProjectRecord {
        ProjectRecord {
            id: "RJ-001".to_string(),
            name: "Escola Estadual".to_string(),
            municipality: "Niterói".to_string(),
            work_type: WorkType::Building,
            agency: "SEEDUC".to_string(),
            status: ProjectStatus::Completed,
            built_area_m2: 1_000.0,
            contracted_value: 3_000_000.0,
            paid_amount: 3_000_000.0,
            planned_start: ymd(2024, 1, 1),
            planned_end: ymd(2024, 4, 10),
            actual_start: ymd(2024, 2, 1),
            actual_end: Some(ymd(2024, 5, 11)),
            physical_pct: 50.0,
            financial_pct: 50.0,
            amendments: 0,
            stoppages: 0,
            recurrence: false,
        }
    }

    fn engine() -> ScoringEngine<'static> {
        ScoringEngine::new(ReferenceCostTable::standard(), ymd(2025, 1, 1))
    }

    #[test]
    fn weights_sum_to_one_hundred() {
        let total = WEIGHTS.cost + WEIGHTS.schedule + WEIGHTS.recurrence + WEIGHTS.execution;
        assert_eq!(total, 100);
    }

    #[test]
    fn cost_score_breakpoints() {
        assert_eq!(cost_score_from_ratio(0.5), 100);
        assert_eq!(cost_score_from_ratio(0.8), 100);
        assert_eq!(cost_score_from_ratio(1.4), 50);
        assert_eq!(cost_score_from_ratio(2.0), 0);
        assert_eq!(cost_score_from_ratio(7.5), 0);
    }

    #[test]
    fn cost_ratio_computed_against_reference_table() {
        let mut record = sample_record();
        record.paid_amount = 2_800_000.0;
        assert_eq!(engine().score(&record).components.cost, 100);
        record.paid_amount = 4_900_000.0;
        assert_eq!(engine().score(&record).components.cost, 50);
        record.paid_amount = 7_000_000.0;
        assert_eq!(engine().score(&record).components.cost, 0);
    }

    #[test]
    fn unpaid_projects_use_contracted_value() {
        let mut record = sample_record();
        record.paid_amount = 0.0;
        record.contracted_value = 4_900_000.0;
        assert_eq!(unit_cost(&record), 4_900.0);
    }

    #[test]
    fn zero_area_is_floored_to_one_square_meter() {
        let mut record = sample_record();
        record.built_area_m2 = 0.0;
        let result = engine().score(&record);
        assert_eq!(result.metrics.cost_per_m2, 3_000_000.0);
        assert_eq!(result.components.cost, 0);

        record.built_area_m2 = -50.0;
        assert!(engine().score(&record).metrics.cost_per_m2.is_finite());
    }

    #[test]
    fn schedule_score_breakpoints() {
        assert_eq!(schedule_score_from_delay(0.0), 100);
        assert_eq!(schedule_score_from_delay(50.0), 50);
        assert_eq!(schedule_score_from_delay(100.0), 0);
        assert_eq!(schedule_score_from_delay(250.0), 0);
    }

    #[test]
    fn schedule_delay_from_dates() {
        let mut record = sample_record();
        // planned 100 days, actual 150 days
        record.actual_end = Some(ymd(2024, 6, 30));
        assert_eq!(delay_pct(&record, ymd(2025, 1, 1)), 50.0);
        assert_eq!(engine().score(&record).components.schedule, 50);

        // actual 200 days
        record.actual_end = Some(ymd(2024, 8, 19));
        assert_eq!(engine().score(&record).components.schedule, 0);
    }

    #[test]
    fn early_finish_never_produces_negative_delay() {
        let mut record = sample_record();
        record.actual_end = Some(ymd(2024, 3, 1));
        let result = engine().score(&record);
        assert_eq!(result.metrics.delay_pct, 0.0);
        assert_eq!(result.components.schedule, 100);
    }

    #[test]
    fn zero_planned_duration_is_floored_to_one_day() {
        let mut record = sample_record();
        record.planned_end = record.planned_start;
        let delay = delay_pct(&record, ymd(2025, 1, 1));
        assert!(delay.is_finite());
        assert_eq!(engine().score(&record).components.schedule, 0);
    }

    #[test]
    fn ongoing_projects_are_measured_against_evaluation_date() {
        let mut record = sample_record();
        record.actual_end = None;
        // 2024-02-01 + 100 days = 2024-05-11: on time
        let on_time = ScoringEngine::new(ReferenceCostTable::standard(), ymd(2024, 5, 11));
        assert_eq!(on_time.score(&record).components.schedule, 100);
        // 150 days later than start: 50% late
        let later = ScoringEngine::new(ReferenceCostTable::standard(), ymd(2024, 6, 30));
        assert_eq!(later.score(&record).components.schedule, 50);
    }

    #[test]
    fn recurrence_penalties_accumulate() {
        let mut record = sample_record();
        record.recurrence = true;
        record.stoppages = 2;
        record.amendments = 1;
        assert_eq!(recurrence_score(&record), 35);
    }

    #[test]
    fn recurrence_clamps_once_at_the_end() {
        let mut record = sample_record();
        record.recurrence = true;
        record.stoppages = 1_000;
        record.amendments = u32::MAX;
        assert_eq!(recurrence_score(&record), 0);
    }

    #[test]
    fn execution_penalizes_misalignment_and_overspend() {
        let mut record = sample_record();
        record.physical_pct = 60.0;
        record.financial_pct = 70.0;
        record.contracted_value = 1_000_000.0;
        record.paid_amount = 1_100_000.0;
        assert_eq!(execution_score(&record), 77);
    }

    #[test]
    fn underspend_does_not_add_execution_score() {
        let mut record = sample_record();
        record.paid_amount = 1_500_000.0;
        let result = engine().score(&record);
        assert_eq!(result.components.execution, 100);
        assert_eq!(result.metrics.budget_deviation_pct, -50.0);
    }

    #[test]
    fn execution_bottoms_out_at_zero() {
        let mut record = sample_record();
        record.physical_pct = 0.0;
        record.financial_pct = 250.0;
        assert_eq!(execution_score(&record), 0);
    }

    #[test]
    fn combine_rounds_halves_up() {
        let components = ComponentScores {
            cost: 95,
            schedule: 100,
            recurrence: 100,
            execution: 100,
        };
        assert_eq!(combine(&components), 99);
        let zero = ComponentScores {
            cost: 0,
            schedule: 0,
            recurrence: 0,
            execution: 0,
        };
        assert_eq!(combine(&zero), 0);
    }

    #[test]
    fn end_to_end_building_scores_excellent() {
        let result = engine().score(&sample_record());
        assert_eq!(result.metrics.cost_per_m2, 3_000.0);
        // ratio 0.857 -> 100 * (1 - 0.0571 / 1.2) = 95.24
        assert_eq!(result.components.cost, 95);
        assert_eq!(result.components.schedule, 100);
        assert_eq!(result.components.recurrence, 100);
        assert_eq!(result.components.execution, 100);
        assert_eq!(result.index, 99);
        assert_eq!(result.classification, Classification::Excellent);
        assert_eq!(result.project_id, "RJ-001");
    }

    #[test]
    fn classification_always_follows_index() {
        let mut record = sample_record();
        for stoppages in 0..12 {
            record.stoppages = stoppages;
            record.paid_amount = 3_000_000.0 + f64::from(stoppages) * 400_000.0;
            let result = engine().score(&record);
            assert_eq!(result.classification, Classification::from_index(result.index));
            assert!(result.index <= 100);
            for component in [
                result.components.cost,
                result.components.schedule,
                result.components.recurrence,
                result.components.execution,
            ] {
                assert!(component <= 100);
            }
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let record = sample_record();
        assert_eq!(engine().score(&record), engine().score(&record));
    }
}
