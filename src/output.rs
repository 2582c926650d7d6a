use crate::portfolio::{classification_breakdown, status_breakdown};
use crate::reference::ReferenceCostTable;
use crate::scoring::WEIGHTS;
use crate::types::PortfolioStatistics;
use crate::util::{format_brl, format_int};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("unable to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to write CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unable to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let csv_err = |source: csv::Error| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for r in rows {
        wtr.serialize(r).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn render_table_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table_rows(rows, max_rows));
}

pub fn print_statistics(stats: &PortfolioStatistics) {
    println!("Portfolio summary ({} projects)", format_int(stats.total));
    println!("  Mean IEOP:          {}", stats.mean_index);
    println!(
        "  Mean cost per m²:   {}",
        format_brl(stats.mean_cost_per_m2 as f64)
    );
    println!("  Mean delay:         {}%", stats.mean_delay_pct);
    println!("  Recurrence rate:    {}%\n", stats.recurrence_rate);

    println!("By classification\n");
    preview_table_rows(&classification_breakdown(stats), usize::MAX);
    println!("By status\n");
    preview_table_rows(&status_breakdown(stats), usize::MAX);
}

/// How the index is built, generated from the constants the engine uses.
pub fn methodology_text(table: &ReferenceCostTable) -> String {
    let mut out = String::new();
    out.push_str("IEOP: public works efficiency index (0-100)\n\n");
    out.push_str("Components and weights\n");
    out.push_str(&format!(
        "  Cost per m²        {:>3}%  ratio to reference: <=0.8 -> 100, >=2.0 -> 0, linear between\n",
        WEIGHTS.cost
    ));
    out.push_str(&format!(
        "  Schedule           {:>3}%  delay over planned duration: 0% -> 100, >=100% -> 0\n",
        WEIGHTS.schedule
    ));
    out.push_str(&format!(
        "  Recurrence         {:>3}%  100 - 40 if recurring - 10 per stoppage - 5 per amendment\n",
        WEIGHTS.recurrence
    ));
    out.push_str(&format!(
        "  Execution          {:>3}%  100 - 1.5 x |physical - financial| - 0.8 x overspend %\n\n",
        WEIGHTS.execution
    ));
    out.push_str("Classification: >=80 Excellent, 60-79 Good, 40-59 Regular, 20-39 Poor, 0-19 Critical\n\n");
    out.push_str("Reference cost per m²\n\n");
    out.push_str(&render_table_rows(&table.rows(), usize::MAX));
    out.push('\n');
    out
}
