//! Request counters for the `/api/v1/metrics` endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Which bucket a JSON-RPC method falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Lifecycle,
    List,
    ToolCall,
    ResourceRead,
    PromptGet,
    Other,
}

impl MethodClass {
    pub fn of(method: &str) -> Self {
        match method {
            "initialize" | "ping" | "initialized" | "notifications/initialized" => {
                MethodClass::Lifecycle
            }
            "tools/list" | "resources/list" | "resources/templates/list" | "prompts/list" => {
                MethodClass::List
            }
            "tools/call" => MethodClass::ToolCall,
            "resources/read" => MethodClass::ResourceRead,
            "prompts/get" => MethodClass::PromptGet,
            _ => MethodClass::Other,
        }
    }
}

/// Lock-free counters shared by every transport.
#[derive(Debug)]
pub struct Metrics {
    started: Instant,
    requests_total: AtomicU64,
    requests_failed: AtomicU64,
    lifecycle: AtomicU64,
    lists: AtomicU64,
    tool_calls: AtomicU64,
    tool_errors: AtomicU64,
    resource_reads: AtomicU64,
    prompt_gets: AtomicU64,
    other: AtomicU64,
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_failed: u64,
    pub lifecycle_requests: u64,
    pub list_requests: u64,
    pub tool_calls: u64,
    pub tool_errors: u64,
    pub resource_reads: u64,
    pub prompt_gets: u64,
    pub other_requests: u64,
    pub uptime_seconds: f64,
    pub requests_per_second: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            requests_total: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            lifecycle: AtomicU64::new(0),
            lists: AtomicU64::new(0),
            tool_calls: AtomicU64::new(0),
            tool_errors: AtomicU64::new(0),
            resource_reads: AtomicU64::new(0),
            prompt_gets: AtomicU64::new(0),
            other: AtomicU64::new(0),
        }
    }

    /// Count one handled request. `failed` covers JSON-RPC errors only.
    pub fn record(&self, method: &str, failed: bool) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }
        let counter = match MethodClass::of(method) {
            MethodClass::Lifecycle => &self.lifecycle,
            MethodClass::List => &self.lists,
            MethodClass::ToolCall => &self.tool_calls,
            MethodClass::ResourceRead => &self.resource_reads,
            MethodClass::PromptGet => &self.prompt_gets,
            MethodClass::Other => &self.other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a tool call that returned an `isError` result.
    pub fn record_tool_error(&self) {
        self.tool_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let uptime = self.uptime().as_secs_f64();
        let total = self.requests_total.load(Ordering::Relaxed);
        MetricsSnapshot {
            requests_total: total,
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            lifecycle_requests: self.lifecycle.load(Ordering::Relaxed),
            list_requests: self.lists.load(Ordering::Relaxed),
            tool_calls: self.tool_calls.load(Ordering::Relaxed),
            tool_errors: self.tool_errors.load(Ordering::Relaxed),
            resource_reads: self.resource_reads.load(Ordering::Relaxed),
            prompt_gets: self.prompt_gets.load(Ordering::Relaxed),
            other_requests: self.other.load(Ordering::Relaxed),
            uptime_seconds: uptime,
            requests_per_second: if uptime > 0.0 { total as f64 / uptime } else { 0.0 },
        }
    }
}
