//! Process metrics.
//!
//! Counters and timings for the three things worth watching: HTTP requests
//! served, upstream fetches and sync passes. Every observation is also
//! emitted as a `tracing` event on the `metrics` target, so a log pipeline
//! sees the same numbers `/metrics` reports.

use axum::body::HttpBody;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use charger_engine::SyncReport;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Count, total and worst case of a timed operation.
#[derive(Debug, Default)]
struct Timing {
    count: AtomicU64,
    total_micros: AtomicU64,
    max_micros: AtomicU64,
}

impl Timing {
    fn observe(&self, took: Duration) {
        let micros = u64::try_from(took.as_micros()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_micros.fetch_add(micros, Ordering::Relaxed);
        self.max_micros.fetch_max(micros, Ordering::Relaxed);
    }

    fn snapshot(&self) -> TimingSnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let total = self.total_micros.load(Ordering::Relaxed);
        TimingSnapshot {
            count,
            average_ms: if count == 0 {
                0.0
            } else {
                total as f64 / count as f64 / 1000.0
            },
            max_ms: self.max_micros.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

#[derive(Debug, Default)]
struct HttpMetrics {
    requests_total: AtomicU64,
    client_errors_total: AtomicU64,
    server_errors_total: AtomicU64,
    bytes_in_total: AtomicU64,
    bytes_out_total: AtomicU64,
    latency: Timing,
}

#[derive(Debug, Default)]
struct FetchMetrics {
    fetches_total: AtomicU64,
    failures_total: AtomicU64,
    bytes_total: AtomicU64,
    /// 0 until the first response arrives
    last_status: AtomicU64,
    latency: Timing,
}

#[derive(Debug, Default)]
struct SyncMetrics {
    passes_total: AtomicU64,
    failures_total: AtomicU64,
    added_total: AtomicU64,
    updated_total: AtomicU64,
    unchanged_total: AtomicU64,
    duration: Timing,
}

#[derive(Debug)]
struct Registry {
    started: Instant,
    http: HttpMetrics,
    fetch: FetchMetrics,
    sync: SyncMetrics,
}

/// Shared metrics handle. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                started: Instant::now(),
                http: HttpMetrics::default(),
                fetch: FetchMetrics::default(),
                sync: SyncMetrics::default(),
            }),
        }
    }

    /// Record one served HTTP request.
    pub fn record_request(
        &self,
        method: &str,
        path: &str,
        status: u16,
        took: Duration,
        bytes_in: u64,
        bytes_out: u64,
    ) {
        let http = &self.registry.http;
        http.requests_total.fetch_add(1, Ordering::Relaxed);
        match status {
            400..=499 => {
                http.client_errors_total.fetch_add(1, Ordering::Relaxed);
            }
            500..=u16::MAX => {
                http.server_errors_total.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        http.bytes_in_total.fetch_add(bytes_in, Ordering::Relaxed);
        http.bytes_out_total.fetch_add(bytes_out, Ordering::Relaxed);
        http.latency.observe(took);

        tracing::info!(
            target: "metrics",
            measurement = "http_request",
            method,
            path,
            status,
            took_ms = took.as_secs_f64() * 1000.0,
            bytes_in,
            bytes_out,
        );
    }

    /// Record one upstream fetch. `status` is `None` when no response came back.
    pub fn record_fetch(
        &self,
        url: &str,
        status: Option<u16>,
        took: Duration,
        length: Option<u64>,
    ) {
        let fetch = &self.registry.fetch;
        fetch.fetches_total.fetch_add(1, Ordering::Relaxed);
        if status != Some(200) {
            fetch.failures_total.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(status) = status {
            fetch.last_status.store(u64::from(status), Ordering::Relaxed);
        }
        fetch
            .bytes_total
            .fetch_add(length.unwrap_or(0), Ordering::Relaxed);
        fetch.latency.observe(took);

        tracing::info!(
            target: "metrics",
            measurement = "upstream_fetch",
            url,
            status,
            took_ms = took.as_secs_f64() * 1000.0,
            length,
        );
    }

    /// Record one sync pass. `None` marks a failed pass.
    pub fn record_sync(&self, report: Option<&SyncReport>, took: Duration) {
        let sync = &self.registry.sync;
        sync.passes_total.fetch_add(1, Ordering::Relaxed);
        sync.duration.observe(took);
        match report {
            Some(report) => {
                sync.added_total
                    .fetch_add(report.added as u64, Ordering::Relaxed);
                sync.updated_total
                    .fetch_add(report.updated as u64, Ordering::Relaxed);
                sync.unchanged_total
                    .fetch_add(report.unchanged as u64, Ordering::Relaxed);
            }
            None => {
                sync.failures_total.fetch_add(1, Ordering::Relaxed);
            }
        }

        tracing::info!(
            target: "metrics",
            measurement = "sync_pass",
            ok = report.is_some(),
            added = report.map(|r| r.added),
            updated = report.map(|r| r.updated),
            took_ms = took.as_secs_f64() * 1000.0,
        );
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let r = &self.registry;
        let last_status = r.fetch.last_status.load(Ordering::Relaxed);

        MetricsSnapshot {
            process: ProcessSnapshot {
                pid: std::process::id(),
                uptime_secs: r.started.elapsed().as_secs(),
            },
            http: HttpSnapshot {
                requests_total: r.http.requests_total.load(Ordering::Relaxed),
                client_errors_total: r.http.client_errors_total.load(Ordering::Relaxed),
                server_errors_total: r.http.server_errors_total.load(Ordering::Relaxed),
                bytes_in_total: r.http.bytes_in_total.load(Ordering::Relaxed),
                bytes_out_total: r.http.bytes_out_total.load(Ordering::Relaxed),
                latency: r.http.latency.snapshot(),
            },
            upstream: FetchSnapshot {
                fetches_total: r.fetch.fetches_total.load(Ordering::Relaxed),
                failures_total: r.fetch.failures_total.load(Ordering::Relaxed),
                bytes_total: r.fetch.bytes_total.load(Ordering::Relaxed),
                last_status: (last_status != 0).then_some(last_status as u16),
                latency: r.fetch.latency.snapshot(),
            },
            sync: SyncSnapshot {
                passes_total: r.sync.passes_total.load(Ordering::Relaxed),
                failures_total: r.sync.failures_total.load(Ordering::Relaxed),
                added_total: r.sync.added_total.load(Ordering::Relaxed),
                updated_total: r.sync.updated_total.load(Ordering::Relaxed),
                unchanged_total: r.sync.unchanged_total.load(Ordering::Relaxed),
                duration: r.sync.duration.snapshot(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSnapshot {
    pub count: u64,
    pub average_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpSnapshot {
    pub requests_total: u64,
    pub client_errors_total: u64,
    pub server_errors_total: u64,
    pub bytes_in_total: u64,
    pub bytes_out_total: u64,
    pub latency: TimingSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSnapshot {
    pub fetches_total: u64,
    pub failures_total: u64,
    pub bytes_total: u64,
    pub last_status: Option<u16>,
    pub latency: TimingSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub passes_total: u64,
    pub failures_total: u64,
    pub added_total: u64,
    pub updated_total: u64,
    pub unchanged_total: u64,
    pub duration: TimingSnapshot,
}

/// Everything `/metrics` reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub process: ProcessSnapshot,
    pub http: HttpSnapshot,
    pub upstream: FetchSnapshot,
    pub sync: SyncSnapshot,
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Middleware recording method, path, status, latency and sizes of every request.
pub async fn track_requests(
    State(metrics): State<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let bytes_in = content_length(request.headers()).unwrap_or(0);
    let start = Instant::now();

    let response = next.run(request).await;

    let bytes_out = content_length(response.headers())
        .or_else(|| response.body().size_hint().exact())
        .unwrap_or(0);
    metrics.record_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
        bytes_in,
        bytes_out,
    );

    response
}
