use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Parsed tabular upload: unique header names plus string cells.
///
/// Every row holds exactly one cell per column. Short rows are padded with
/// empty cells and fields past the last header are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[idx].as_str())
    }

    #[cfg(test)]
    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        self.rows.get(idx).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    #[cfg(test)]
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }
}

/// Header-keyed view over one table row. The pipeline reads whole columns
/// through [`RawTable::column_values`]; this view backs row-level checks.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

#[cfg(test)]
impl<'a> Row<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|idx| self.cells[idx].as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let columns = self.columns;
        let cells = self.cells;
        columns
            .iter()
            .map(String::as_str)
            .zip(cells.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Descriptive summary of one column.
///
/// `mean`, `median`, `min` and `max` are only populated for numeric columns
/// that have at least one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStatistics {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub null_count: usize,
    pub unique_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "float_text")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "float_text")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "float_text")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "float_text")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartPoint {
    Category { name: String, value: usize },
    Value {
        #[serde(with = "float_text")]
        value: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: Vec<ChartPoint>,
}

pub type ColumnMap<T> = IndexMap<String, T>;

/// JSON has no literal for infinities or NaN. They travel as the strings
/// `"Infinity"`, `"-Infinity"` and `"NaN"` so they stay distinct from `null`.
mod float_text {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            None => serializer.serialize_none(),
            Some(v) if v.is_finite() => serializer.serialize_f64(*v),
            Some(v) if v.is_nan() => serializer.serialize_str("NaN"),
            Some(v) if v.is_sign_positive() => serializer.serialize_str("Infinity"),
            Some(_) => serializer.serialize_str("-Infinity"),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<Wire>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Wire::Number(v)) => Ok(Some(v)),
            Some(Wire::Text(text)) => match text.as_str() {
                "Infinity" => Ok(Some(f64::INFINITY)),
                "-Infinity" => Ok(Some(f64::NEG_INFINITY)),
                "NaN" => Ok(Some(f64::NAN)),
                other => Err(de::Error::custom(format!("invalid number: {}", other))),
            },
        }
    }
}

/// Result of analyzing one upload, shared by the local pipeline and the
/// `/analyze` wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub column_count: usize,
    pub column_stats: ColumnMap<ColumnStatistics>,
    pub visualizations: ColumnMap<VisualizationSpec>,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl AnalysisReport {
    /// True when statistics and charts cover the same set of columns.
    pub fn columns_match(&self) -> bool {
        self.column_stats.len() == self.visualizations.len()
            && self
                .column_stats
                .keys()
                .all(|name| self.visualizations.contains_key(name))
    }
}
