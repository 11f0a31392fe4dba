//! Route Statistics
//!
//! In-process counters for served route requests, exposed at `/v1/stats`.
//! Nothing is persisted; counters reset with the process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::errors::AppError;
use crate::models::types::{RoutePlan, TransportKind};

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouteStatsSnapshot {
    /// Route requests handled (success or failure)
    pub total_requests: u64,
    /// Plans returned
    pub routes_served: u64,
    /// Plans served with a detour around a heavy endpoint
    pub congested_trips: u64,
    /// Rejected ids or transport names
    pub validation_errors: u64,
    /// Primary route failures
    pub upstream_errors: u64,
    /// Served plans by transport
    pub by_transport: HashMap<String, u64>,
    pub avg_latency_ms: f64,
    pub period_start: u64,
    pub period_end: u64,
}

/// Lock-free counters plus one small map
#[derive(Debug)]
pub struct RouteStats {
    total_requests: AtomicU64,
    routes_served: AtomicU64,
    congested_trips: AtomicU64,
    validation_errors: AtomicU64,
    upstream_errors: AtomicU64,
    total_latency_ms: AtomicU64,
    by_transport: RwLock<HashMap<TransportKind, u64>>,
    session_start: u64,
}

impl RouteStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            routes_served: AtomicU64::new(0),
            congested_trips: AtomicU64::new(0),
            validation_errors: AtomicU64::new(0),
            upstream_errors: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            by_transport: RwLock::new(HashMap::new()),
            session_start: current_timestamp(),
        }
    }

    /// Record a successful plan
    pub fn record_plan(&self, plan: &RoutePlan, latency_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.routes_served.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if plan.has_congestion {
            self.congested_trips.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut counts) = self.by_transport.write() {
            *counts.entry(plan.primary.transport).or_insert(0) += 1;
        }
    }

    /// Record a failed request
    pub fn record_error(&self, err: &AppError, latency_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if err.code.is_validation() {
            self.validation_errors.fetch_add(1, Ordering::Relaxed);
        } else if err.code.is_upstream() {
            self.upstream_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> RouteStatsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if total_requests > 0 {
            total_latency as f64 / total_requests as f64
        } else {
            0.0
        };

        let by_transport = self
            .by_transport
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        RouteStatsSnapshot {
            total_requests,
            routes_served: self.routes_served.load(Ordering::Relaxed),
            congested_trips: self.congested_trips.load(Ordering::Relaxed),
            validation_errors: self.validation_errors.load(Ordering::Relaxed),
            upstream_errors: self.upstream_errors.load(Ordering::Relaxed),
            by_transport,
            avg_latency_ms,
            period_start: self.session_start,
            period_end: current_timestamp(),
        }
    }
}

impl Default for RouteStats {
    fn default() -> Self {
        Self::new()
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
