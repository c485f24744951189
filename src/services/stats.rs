use std::collections::HashSet;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::models::{ColumnMap, ColumnStatistics, ColumnType, RawTable};

static DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("decimal pattern is valid")
});
static RADIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0([xX][0-9a-fA-F]+|[oO][0-7]+|[bB][01]+)$").expect("radix pattern is valid")
});

/// Converts a trimmed cell to a number using the same string rules as a
/// browser's `Number()`: signed decimals and exponents, unsigned `0x`/`0o`/`0b`
/// literals and `Infinity`. Anything else, `NaN` included, is not a number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let value = raw.trim();

    if DECIMAL.is_match(value) {
        return value.parse::<f64>().ok();
    }

    if RADIX.is_match(value) {
        let radix = match value.as_bytes()[1] {
            b'x' | b'X' => 16,
            b'o' | b'O' => 8,
            _ => 2,
        };
        let parsed = value[2..]
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0f64, |acc, digit| acc * radix as f64 + digit as f64);
        return Some(parsed);
    }

    match value {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Computes one statistics record per column, in header order.
pub fn compute_column_statistics(table: &RawTable) -> ColumnMap<ColumnStatistics> {
    let start = std::time::Instant::now();

    let stats: Vec<ColumnStatistics> = (0..table.column_count())
        .into_par_iter()
        .map(|idx| {
            let values: Vec<&str> = table.column_values(idx).collect();
            analyze_column(&values)
        })
        .collect();

    tracing::debug!(
        "Computed statistics for {} columns in {:?}",
        stats.len(),
        start.elapsed()
    );

    table.columns().iter().cloned().zip(stats).collect()
}

fn analyze_column(values: &[&str]) -> ColumnStatistics {
    let present: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    let null_count = values.len() - present.len();
    let unique_count = present.iter().collect::<HashSet<_>>().len();

    let numbers: Option<Vec<f64>> = present.iter().map(|v| parse_number(v)).collect();

    match numbers {
        Some(numbers) => {
            let summary = NumericSummary::compute(numbers);
            ColumnStatistics {
                column_type: ColumnType::Numeric,
                null_count,
                unique_count,
                mean: summary.as_ref().map(|s| s.mean),
                median: summary.as_ref().map(|s| s.median),
                min: summary.as_ref().map(|s| s.min),
                max: summary.as_ref().map(|s| s.max),
            }
        }
        None => ColumnStatistics {
            column_type: ColumnType::Categorical,
            null_count,
            unique_count,
            mean: None,
            median: None,
            min: None,
            max: None,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NumericSummary {
    mean: f64,
    median: f64,
    min: f64,
    max: f64,
}

impl NumericSummary {
    /// `None` when there is nothing to summarize. The median is the element at
    /// `len / 2` of the sorted values, so even-length inputs take the upper
    /// middle rather than averaging.
    fn compute(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        values.sort_by(|a, b| a.total_cmp(b));
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        Some(NumericSummary {
            mean,
            median: values[count / 2],
            min: values[0],
            max: values[count - 1],
        })
    }
}
