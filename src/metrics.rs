// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for gate decisions.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Decision counters registered on a private registry.
#[derive(Clone)]
pub struct GateMetrics {
    registry: Registry,
    rate_limited: IntCounterVec,
    comment_decisions: IntCounterVec,
    like_decisions: IntCounterVec,
}

impl GateMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("comment_gate".to_string()), None)?;

        let rate_limited = IntCounterVec::new(
            Opts::new("rate_limited_total", "Requests refused by a rate limiter"),
            &["limiter"],
        )?;
        let comment_decisions = IntCounterVec::new(
            Opts::new("comment_decisions_total", "Comment submissions by outcome"),
            &["outcome"],
        )?;
        let like_decisions = IntCounterVec::new(
            Opts::new("like_decisions_total", "Like and unlike requests by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(rate_limited.clone()))?;
        registry.register(Box::new(comment_decisions.clone()))?;
        registry.register(Box::new(like_decisions.clone()))?;

        Ok(Self {
            registry,
            rate_limited,
            comment_decisions,
            like_decisions,
        })
    }

    pub fn record_rate_limited(&self, limiter: &str) {
        self.rate_limited.with_label_values(&[limiter]).inc();
    }

    pub fn record_comment(&self, outcome: &str) {
        self.comment_decisions.with_label_values(&[outcome]).inc();
    }

    pub fn record_like(&self, outcome: &str) {
        self.like_decisions.with_label_values(&[outcome]).inc();
    }

    pub fn comment_count(&self, outcome: &str) -> u64 {
        self.comment_decisions.with_label_values(&[outcome]).get()
    }

    pub fn rate_limited_count(&self, limiter: &str) -> u64 {
        self.rate_limited.with_label_values(&[limiter]).get()
    }

    /// Prometheus text exposition of all counters.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for GateMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateMetrics").finish_non_exhaustive()
    }
}
