// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for simulation tests.

use std::time::Duration;

/// Flood pattern configuration.
#[derive(Debug, Clone)]
pub struct FloodConfig {
    /// Total number of submissions
    pub total_requests: usize,
    /// Number of distinct client tokens, used round-robin
    pub unique_tokens: usize,
    /// Simulated time between submissions
    pub spacing: Duration,
    /// Prior comment count of every author
    pub author_prior_comments: u64,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_tokens: 1,
            spacing: Duration::ZERO,
            author_prior_comments: 10,
        }
    }
}

impl FloodConfig {
    /// One client hammering the comment endpoint.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            ..Default::default()
        }
    }

    /// Many clients, a few requests each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 500,
            unique_tokens: 100,
            ..Default::default()
        }
    }

    /// One client posting every 7 seconds, under 10 per minute.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 50,
            spacing: Duration::from_secs(7),
            ..Default::default()
        }
    }

    /// Fresh accounts flooding from many clients.
    pub fn sockpuppet_flood() -> Self {
        Self {
            total_requests: 100,
            unique_tokens: 50,
            author_prior_comments: 0,
            ..Default::default()
        }
    }
}
