use crate::scoring::ScoringEngine;
use crate::types::{
    BreakdownRow, Classification, PortfolioStatistics, ProjectRecord, ProjectStatus,
    RankingRow, ScoredResult,
};
use crate::util::{format_number, mean_rounded, round_half_up};
use std::collections::BTreeMap;

/// Score every record and order by index, best first. The sort is stable,
/// so projects with equal indices keep their input order.
pub fn score_all(records: &[ProjectRecord], engine: &ScoringEngine<'_>) -> Vec<ScoredResult> {
    let mut results: Vec<ScoredResult> = records.iter().map(|r| engine.score(r)).collect();
    results.sort_by(|a, b| b.index.cmp(&a.index));
    results
}

/// Portfolio-wide statistics in a single pass. An empty slice yields all
/// zeros and zero-filled breakdowns.
pub fn summarize(results: &[ScoredResult]) -> PortfolioStatistics {
    #[derive(Default)]
    struct Acc {
        index_sum: f64,
        cost_sum: f64,
        delay_sum: f64,
        recurring: usize,
    }

    let mut by_classification: BTreeMap<Classification, usize> =
        Classification::ALL.into_iter().map(|c| (c, 0)).collect();
    let mut by_status: BTreeMap<ProjectStatus, usize> =
        ProjectStatus::ALL.into_iter().map(|s| (s, 0)).collect();

    let mut acc = Acc::default();
    for r in results {
        acc.index_sum += f64::from(r.index);
        acc.cost_sum += r.metrics.cost_per_m2;
        acc.delay_sum += r.metrics.delay_pct;
        if r.metrics.recurrence {
            acc.recurring += 1;
        }
        *by_classification.entry(r.classification).or_insert(0) += 1;
        *by_status.entry(r.status).or_insert(0) += 1;
    }

    let total = results.len();
    let recurrence_rate = if total == 0 {
        0.0
    } else {
        round_half_up(acc.recurring as f64 / total as f64 * 100.0)
    };

    PortfolioStatistics {
        total,
        mean_index: mean_rounded(acc.index_sum, total).clamp(0.0, 100.0) as u8,
        mean_cost_per_m2: mean_rounded(acc.cost_sum, total) as i64,
        mean_delay_pct: mean_rounded(acc.delay_sum, total) as i64,
        recurrence_rate: recurrence_rate as u8,
        by_classification,
        by_status,
    }
}

/// Flatten scored results into ranked, display-ready rows.
pub fn ranking_rows(results: &[ScoredResult]) -> Vec<RankingRow> {
    results
        .iter()
        .enumerate()
        .map(|(idx, r)| RankingRow {
            rank: idx + 1,
            id: r.project_id.clone(),
            name: r.project_name.clone(),
            municipality: r.municipality.clone(),
            work_type: r.work_type.label().to_string(),
            status: r.status.label().to_string(),
            index: r.index,
            classification: r.classification.label().to_string(),
            cost_score: r.components.cost,
            schedule_score: r.components.schedule,
            recurrence_score: r.components.recurrence,
            execution_score: r.components.execution,
            cost_per_m2: format_number(r.metrics.cost_per_m2, 0),
            delay_pct: format_number(r.metrics.delay_pct, 0),
            budget_deviation_pct: format_number(r.metrics.budget_deviation_pct, 2),
        })
        .collect()
}

fn breakdown<K: Copy>(
    counts: &BTreeMap<K, usize>,
    total: usize,
    label: impl Fn(K) -> &'static str,
) -> Vec<BreakdownRow> {
    counts
        .iter()
        .map(|(key, count)| {
            let share = if total == 0 {
                0.0
            } else {
                *count as f64 / total as f64 * 100.0
            };
            BreakdownRow {
                group: label(*key).to_string(),
                count: *count,
                share: format!("{}%", format_number(share, 1)),
            }
        })
        .collect()
}

pub fn classification_breakdown(stats: &PortfolioStatistics) -> Vec<BreakdownRow> {
    breakdown(&stats.by_classification, stats.total, Classification::label)
}

pub fn status_breakdown(stats: &PortfolioStatistics) -> Vec<BreakdownRow> {
    breakdown(&stats.by_status, stats.total, ProjectStatus::label)
}
