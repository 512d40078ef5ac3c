use std::fmt::Display;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tracing::info;

pub const TIMING_TARGET: &str = "studio.timing";

#[derive(Debug)]
pub struct OperationTimer {
    operation: String,
    view: Option<String>,
    detail: Option<String>,
    started_at: DateTime<Utc>,
    started_perf: Instant,
    status: String,
    completed: bool,
}

impl OperationTimer {
    pub fn new(operation: &str, view: Option<&str>) -> Self {
        OperationTimer {
            operation: operation.to_string(),
            view: view.map(str::to_string),
            detail: None,
            started_at: Utc::now(),
            started_perf: Instant::now(),
            status: "success".to_string(),
            completed: false,
        }
    }

    pub fn log_started(&self) {
        info!(
            target: TIMING_TARGET,
            "event=operation_started operation={} view={:?} started_at={}",
            self.operation,
            self.view,
            self.started_at.to_rfc3339()
        );
    }

    pub fn mark_status(&mut self, status: &str, detail: Option<String>) {
        self.status = status.to_string();
        self.detail = detail;
    }

    pub fn log_completed(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        let completed_at = Utc::now();
        let duration = self.started_perf.elapsed().as_secs_f64();
        info!(
            target: TIMING_TARGET,
            "event=operation_completed operation={} view={:?} started_at={} completed_at={} duration_s={:.3} status={} detail={}",
            self.operation,
            self.view,
            self.started_at.to_rfc3339(),
            completed_at.to_rfc3339(),
            duration,
            self.status,
            self.detail.clone().unwrap_or_default()
        );
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.log_completed();
    }
}

pub fn start_operation_timer(operation: &str, view: Option<&str>) -> OperationTimer {
    let timer = OperationTimer::new(operation, view);
    timer.log_started();
    timer
}

pub fn complete_operation_timer(timer: &mut OperationTimer, status: &str, detail: Option<String>) {
    timer.mark_status(status, detail);
    timer.log_completed();
}

pub async fn log_llm_timing<T, E, F, Fut>(
    provider: &str,
    model: &str,
    operation: &str,
    metadata: Option<JsonValue>,
    call: F,
) -> Result<T, E>
where
    E: Display,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let started_at = Utc::now();
    let started_perf = Instant::now();
    let metadata_text = metadata
        .as_ref()
        .map(|value| value.to_string())
        .unwrap_or_else(|| "{}".to_string());
    info!(
        target: TIMING_TARGET,
        "event=llm_request provider={} model={} operation={} started_at={} metadata={}",
        provider,
        model,
        operation,
        started_at.to_rfc3339(),
        metadata_text
    );

    let result = call().await;
    let (status, error) = match &result {
        Ok(_) => ("success", String::new()),
        Err(err) => ("error", err.to_string()),
    };

    let completed_at = Utc::now();
    let duration = started_perf.elapsed().as_secs_f64();
    info!(
        target: TIMING_TARGET,
        "event=llm_response provider={} model={} operation={} completed_at={} duration_s={:.3} status={} error={:?} metadata={}",
        provider,
        model,
        operation,
        completed_at.to_rfc3339(),
        duration,
        status,
        error,
        metadata_text
    );

    result
}
