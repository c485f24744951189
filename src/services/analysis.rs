use bytes::Bytes;

use super::insights::generate_insights;
use super::stats::compute_column_statistics;
use super::tabular;
use super::visualization::build_visualizations;
use crate::error::AppError;
use crate::models::{AnalysisReport, RawTable};

/// Runs the full local pipeline for one uploaded file. CPU-bound; async
/// callers should run it on the blocking pool.
pub fn analyze_upload(
    file_name: &str,
    file_data: Bytes,
    accepted: &[String],
) -> Result<AnalysisReport, AppError> {
    let start = std::time::Instant::now();
    let format = tabular::check_accepted(file_name, accepted)?;
    tracing::info!(
        "Analyzing {} as {}, size: {}KB",
        file_name,
        format.extension(),
        file_data.len() / 1024
    );

    let parse_start = std::time::Instant::now();
    let table = tabular::parse_table(format, file_data)?;
    tracing::info!(
        "Parsed {} rows x {} columns in {:?}",
        table.row_count(),
        table.column_count(),
        parse_start.elapsed()
    );

    let report = analyze_table(&table);
    tracing::info!("Analysis of {} completed in {:?}", file_name, start.elapsed());

    Ok(report)
}

pub fn analyze_table(table: &RawTable) -> AnalysisReport {
    let column_stats = compute_column_statistics(table);
    let visualizations = build_visualizations(table, &column_stats);
    let insights = generate_insights(table, &column_stats, &visualizations);

    AnalysisReport {
        row_count: table.row_count(),
        column_count: table.column_count(),
        column_stats,
        visualizations,
        insights,
    }
}
