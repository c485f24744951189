use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::error::AppError;
use crate::models::AnalysisReport;

/// Forwards uploads to an external analysis service.
///
/// Only one request may be outstanding; a second upload while one is in
/// flight fails with [`AppError::Busy`].
#[derive(Debug)]
pub struct RemoteAnalysisClient {
    client: Client,
    endpoint: String,
    in_flight: AtomicBool,
}

impl RemoteAnalysisClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn analyze(&self, file_name: &str, file_data: Bytes) -> Result<AnalysisReport, AppError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let start = std::time::Instant::now();
        tracing::info!(
            "Sending {} ({}KB) to {}",
            file_name,
            file_data.len() / 1024,
            self.endpoint
        );

        let part = Part::bytes(file_data.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::RemoteAnalysis(format!("Failed to reach analysis service: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::RemoteAnalysis(format!(
                "Analysis service returned status {}",
                response.status()
            )));
        }

        let report = response
            .json::<AnalysisReport>()
            .await
            .map_err(|e| AppError::RemoteAnalysis(format!("Invalid analysis response: {}", e)))?;

        if !report.columns_match() {
            return Err(AppError::RemoteAnalysis(
                "Analysis response has statistics and charts for different columns".to_string(),
            ));
        }

        tracing::info!(
            "Remote analysis of {} returned {} columns in {:?}",
            file_name,
            report.column_stats.len(),
            start.elapsed()
        );
        Ok(report)
    }
}

/// Holds the in-flight flag for the lifetime of one request.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AppError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
