use indexmap::IndexMap;

use super::stats::parse_number;
use crate::models::{
    ChartKind, ChartPoint, ColumnMap, ColumnStatistics, ColumnType, RawTable, VisualizationSpec,
};

/// Builds chart-ready data for every column: a pie of value frequencies for
/// categorical columns, one bar per row for numeric ones.
pub fn build_visualizations(
    table: &RawTable,
    stats: &ColumnMap<ColumnStatistics>,
) -> ColumnMap<VisualizationSpec> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let column_type = stats
                .get(name)
                .map(|s| s.column_type)
                .unwrap_or(ColumnType::Categorical);

            let spec = match column_type {
                ColumnType::Categorical => VisualizationSpec {
                    kind: ChartKind::Pie,
                    data: frequency_points(table.column_values(idx)),
                },
                ColumnType::Numeric => VisualizationSpec {
                    kind: ChartKind::Bar,
                    data: table
                        .column_values(idx)
                        .map(|v| ChartPoint::Value {
                            value: parse_number(v),
                        })
                        .collect(),
                },
            };

            (name.clone(), spec)
        })
        .collect()
}

fn frequency_points<'a>(values: impl Iterator<Item = &'a str>) -> Vec<ChartPoint> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values.filter(|v| !v.is_empty()) {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(name, value)| ChartPoint::Category {
            name: name.to_string(),
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stats::compute_column_statistics;
    use crate::services::tabular::parse_csv;

    fn visualize(csv: &str) -> ColumnMap<VisualizationSpec> {
        let table = parse_csv(csv).unwrap();
        let stats = compute_column_statistics(&table);
        build_visualizations(&table, &stats)
    }

    #[test]
    fn categorical_column_becomes_frequency_pie() {
        let viz = visualize("letter\na\nb\na\nc\n");
        let letter = &viz["letter"];

        assert_eq!(letter.kind, ChartKind::Pie);
        assert_eq!(letter.data.len(), 3);
        for (name, count) in [("a", 2), ("b", 1), ("c", 1)] {
            assert!(letter.data.contains(&ChartPoint::Category {
                name: name.to_string(),
                value: count,
            }));
        }
    }

    #[test]
    fn empty_cells_are_left_out_of_the_pie() {
        let viz = visualize("letter,n\na,1\n,2\nx1,3\n");
        let total: usize = viz["letter"]
            .data
            .iter()
            .map(|p| match p {
                ChartPoint::Category { value, .. } => *value,
                ChartPoint::Value { .. } => 0,
            })
            .sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn numeric_column_gets_one_bar_per_row() {
        let viz = visualize("a,n\nx,5\ny,\nz,2.5\n");
        let n = &viz["n"];

        assert_eq!(n.kind, ChartKind::Bar);
        assert_eq!(
            n.data,
            vec![
                ChartPoint::Value { value: Some(5.0) },
                ChartPoint::Value { value: None },
                ChartPoint::Value { value: Some(2.5) },
            ]
        );
    }

    #[test]
    fn every_column_gets_exactly_one_chart() {
        let viz = visualize("a,b,c,b\n1,x,,2\n");
        let names: Vec<&String> = viz.keys().collect();
        assert_eq!(names, ["a", "b", "c", "b_1"]);
    }
}
