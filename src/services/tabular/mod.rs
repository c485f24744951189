pub mod csv_parser;
pub mod json_parser;
pub mod xlsx_parser;

use std::collections::HashSet;
use std::path::Path;

use bytes::Bytes;

use crate::error::AppError;
use crate::models::RawTable;

pub use csv_parser::parse_csv;
pub use json_parser::parse_json;
pub use xlsx_parser::parse_xlsx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Json,
}

impl FileFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "xlsx" => Some(FileFormat::Xlsx),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        file_extension(file_name).and_then(|ext| Self::from_extension(&ext))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Xlsx => "xlsx",
            FileFormat::Json => "json",
        }
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Rejects a file before any of its content is read.
///
/// `accepted` holds lowercase extensions without the leading dot.
pub fn check_accepted(file_name: &str, accepted: &[String]) -> Result<FileFormat, AppError> {
    let unsupported = || {
        AppError::UnsupportedFileType(format!(
            "{} (accepted: {})",
            file_name,
            accepted.join(", ")
        ))
    };

    let format = FileFormat::from_file_name(file_name).ok_or_else(unsupported)?;
    if !accepted.iter().any(|a| a == format.extension()) {
        return Err(unsupported());
    }

    Ok(format)
}

pub fn parse_table(format: FileFormat, data: Bytes) -> Result<RawTable, AppError> {
    match format {
        FileFormat::Csv => parse_csv(&String::from_utf8_lossy(&data)),
        FileFormat::Xlsx => parse_xlsx(data),
        FileFormat::Json => parse_json(&data),
    }
}

/// Makes a header name unique within the table.
///
/// Blank names become `column_<n>` (1-based position); repeats get a numeric
/// suffix so every column keeps its own statistics entry.
pub(crate) fn unique_column_name(
    name: &str,
    position: usize,
    existing_names: &mut HashSet<String>,
) -> String {
    let base_name = match name.trim() {
        "" => format!("column_{}", position + 1),
        trimmed => trimmed.to_string(),
    };

    let mut candidate = base_name.clone();
    let mut counter = 1;
    while !existing_names.insert(candidate.clone()) {
        candidate = format!("{}_{}", base_name, counter);
        counter += 1;
    }

    candidate
}

pub(crate) fn unique_headers<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut existing_names = HashSet::new();
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| unique_column_name(name.as_ref(), idx, &mut existing_names))
        .collect()
}
