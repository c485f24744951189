use crate::models::{
    ChartPoint, ColumnMap, ColumnStatistics, ColumnType, RawTable, VisualizationSpec,
};

/// Plain-language observations about an analyzed table, in a stable order:
/// shape first, then one group of findings per column.
pub fn generate_insights(
    table: &RawTable,
    stats: &ColumnMap<ColumnStatistics>,
    visualizations: &ColumnMap<VisualizationSpec>,
) -> Vec<String> {
    let rows = table.row_count();
    let numeric = stats
        .values()
        .filter(|s| s.column_type == ColumnType::Numeric)
        .count();

    let mut insights = vec![format!(
        "Dataset has {} rows and {} columns ({} numeric, {} categorical).",
        rows,
        table.column_count(),
        numeric,
        stats.len() - numeric
    )];

    if rows == 0 {
        return insights;
    }

    for (name, column) in stats {
        let present = rows - column.null_count;

        if column.null_count > 0 {
            insights.push(format!(
                "Column '{}' is missing {} of {} values ({:.1}%).",
                name,
                column.null_count,
                rows,
                column.null_count as f64 * 100.0 / rows as f64
            ));
        }

        if present > 1 && column.unique_count == 1 {
            insights.push(format!("Column '{}' holds a single constant value.", name));
            continue;
        }

        match column.column_type {
            ColumnType::Numeric => {
                if let (Some(min), Some(max), Some(mean), Some(median)) =
                    (column.min, column.max, column.mean, column.median)
                {
                    insights.push(format!(
                        "Column '{}' ranges from {} to {} (mean {}, median {}).",
                        name,
                        format_number(min),
                        format_number(max),
                        format_number(mean),
                        format_number(median)
                    ));
                }
            }
            ColumnType::Categorical if present > 1 && column.unique_count == present => {
                insights.push(format!(
                    "Column '{}' has a distinct value in every row and looks like an identifier.",
                    name
                ));
            }
            ColumnType::Categorical => {
                if let Some((value, count)) = visualizations.get(name).and_then(most_frequent) {
                    insights.push(format!(
                        "Most frequent value in '{}' is '{}' ({} of {} rows).",
                        name, value, count, rows
                    ));
                }
            }
        }
    }

    insights
}

fn most_frequent(spec: &VisualizationSpec) -> Option<(&str, usize)> {
    spec.data
        .iter()
        .filter_map(|point| match point {
            ChartPoint::Category { name, value } => Some((name.as_str(), *value)),
            ChartPoint::Value { .. } => None,
        })
        // first-seen value wins ties
        .fold(None::<(&str, usize)>, |best, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        })
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}
