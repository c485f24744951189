use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::analysis::analyze_upload;
use crate::error::AppError;
use crate::models::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-facing notification raised by an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn uploaded(file_name: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "File uploaded".to_string(),
            description: format!("{} has been uploaded successfully.", file_name),
        }
    }

    pub fn for_local_error(file_name: &str, error: &AppError) -> Self {
        match error {
            AppError::UnsupportedFileType(_) => Self {
                level: NoticeLevel::Error,
                title: "Unsupported file".to_string(),
                description: format!("{} is not a supported file type.", file_name),
            },
            _ => Self {
                level: NoticeLevel::Error,
                title: "Could not read file".to_string(),
                description: format!("{} could not be analyzed.", file_name),
            },
        }
    }

    pub fn busy() -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Analysis in progress".to_string(),
            description: "Wait for the current file to finish before uploading another."
                .to_string(),
        }
    }

    /// Remote failures never reveal their cause.
    pub fn remote_failure() -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Analysis failed".to_string(),
            description: "Something went wrong while analyzing your file. Please try again."
                .to_string(),
        }
    }
}

/// A failed upload: the error for the transport layer and the notice for the
/// user.
#[derive(Debug)]
pub struct Rejection {
    pub error: AppError,
    pub notice: Notice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Local,
    Remote,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub source: ReportSource,
    pub report: AnalysisReport,
}

/// Runs the local pipeline for an upload, turning a failure into the notice
/// shown to the user. Touches no session state.
pub fn analyze_local(
    file_name: &str,
    file_data: Bytes,
    accepted: &[String],
) -> Result<AnalysisReport, Rejection> {
    analyze_upload(file_name, file_data, accepted).map_err(|error| {
        tracing::warn!("Rejected upload {}: {}", file_name, error);
        let notice = Notice::for_local_error(file_name, &error);
        Rejection { error, notice }
    })
}

/// State of the single active analysis view.
///
/// A successful upload replaces the snapshot wholesale; a failed one leaves
/// it exactly as it was.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    current: Option<SessionSnapshot>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SessionSnapshot> {
        self.current.as_ref()
    }

    pub fn install_local(&mut self, file_name: &str, report: AnalysisReport) -> Notice {
        self.install(file_name, ReportSource::Local, report);
        Notice::uploaded(file_name)
    }

    pub fn apply_remote_report(&mut self, file_name: &str, report: AnalysisReport) -> Notice {
        self.install(file_name, ReportSource::Remote, report);
        Notice::uploaded(file_name)
    }

    /// Drops the current analysis when the view is torn down.
    pub fn clear(&mut self) -> Option<SessionSnapshot> {
        self.current.take()
    }

    fn install(&mut self, file_name: &str, source: ReportSource, report: AnalysisReport) {
        tracing::info!(
            "Session now shows {} ({} columns, {:?})",
            file_name,
            report.column_stats.len(),
            source
        );
        self.current = Some(SessionSnapshot {
            file_name: file_name.to_string(),
            uploaded_at: Utc::now(),
            source,
            report,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn upload(
        session: &mut AnalysisSession,
        file_name: &str,
        data: &'static [u8],
        accepted: &[String],
    ) -> Result<Notice, Rejection> {
        let report = analyze_local(file_name, Bytes::from_static(data), accepted)?;
        Ok(session.install_local(file_name, report))
    }

    #[test]
    fn reupload_replaces_every_column() {
        let mut session = AnalysisSession::new();
        let formats = accept(&["csv"]);

        upload(&mut session, "first.csv", b"old_a,old_b\n1,2\n", &formats).unwrap();
        let notice = upload(&mut session, "second.csv", b"fresh\nx\n", &formats).unwrap();

        assert_eq!(notice.level, NoticeLevel::Success);
        let snapshot = session.current().unwrap();
        assert_eq!(snapshot.file_name, "second.csv");
        assert_eq!(snapshot.source, ReportSource::Local);
        let stats: Vec<&String> = snapshot.report.column_stats.keys().collect();
        let viz: Vec<&String> = snapshot.report.visualizations.keys().collect();
        assert_eq!(stats, ["fresh"]);
        assert_eq!(viz, ["fresh"]);
    }

    #[test]
    fn wrong_type_is_rejected_without_touching_state() {
        let mut session = AnalysisSession::new();
        let only_csv = accept(&["csv"]);
        upload(&mut session, "keep.csv", b"a\n1\n", &only_csv).unwrap();
        let before = session.current().unwrap().clone();

        let rejection = upload(&mut session, "book.xlsx", b"PK", &only_csv).unwrap_err();

        assert!(matches!(rejection.error, AppError::UnsupportedFileType(_)));
        assert_eq!(rejection.notice.title, "Unsupported file");
        let after = session.current().unwrap();
        assert_eq!(after.file_name, before.file_name);
        assert_eq!(after.uploaded_at, before.uploaded_at);
        assert_eq!(after.report, before.report);
    }

    #[test]
    fn unreadable_file_keeps_empty_session_empty() {
        let mut session = AnalysisSession::new();
        let rejection = upload(&mut session, "empty.csv", b"", &accept(&["csv"])).unwrap_err();

        assert_eq!(rejection.notice.title, "Could not read file");
        assert!(session.current().is_none());
    }

    #[test]
    fn remote_report_is_installed_and_clear_tears_down() {
        let mut session = AnalysisSession::new();
        let report = crate::services::analysis::analyze_table(
            &crate::services::tabular::parse_csv("a\n1\n").unwrap(),
        );

        session.apply_remote_report("remote.csv", report);
        assert_eq!(session.current().unwrap().source, ReportSource::Remote);

        assert!(session.clear().is_some());
        assert!(session.current().is_none());
    }

    #[test]
    fn analysis_runs_apart_from_installation() {
        let mut session = AnalysisSession::new();
        let report = analyze_local("a.csv", Bytes::from_static(b"n\n1\n2\n"), &accept(&["csv"]))
            .unwrap();
        assert!(session.current().is_none());

        let notice = session.install_local("a.csv", report);
        assert_eq!(notice.title, "File uploaded");
        let snapshot = session.current().unwrap();
        assert_eq!(snapshot.source, ReportSource::Local);
        assert_eq!(snapshot.report.row_count, 2);

        let rejection = analyze_local("a.txt", Bytes::new(), &accept(&["csv"])).unwrap_err();
        assert_eq!(rejection.notice.title, "Unsupported file");
    }

    #[test]
    fn remote_failure_notice_hides_the_cause() {
        let notice = Notice::remote_failure();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Analysis failed");
    }
}
