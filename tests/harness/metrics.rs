// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for abuse simulation results.

use comment_gate::CommentDecision;
use std::collections::HashMap;

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Approved,
    Held,
    Rejected,
    RateLimited,
}

impl From<&CommentDecision> for Outcome {
    fn from(decision: &CommentDecision) -> Self {
        match decision {
            CommentDecision::RateLimited(_) => Outcome::RateLimited,
            CommentDecision::Rejected(_) => Outcome::Rejected,
            CommentDecision::Accepted { disposition, .. } if disposition.is_approved => {
                Outcome::Approved
            }
            CommentDecision::Accepted { .. } => Outcome::Held,
        }
    }
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct OutcomeTally {
    outcomes: HashMap<Outcome, usize>,
    per_token: HashMap<String, usize>,
}

impl OutcomeTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request outcome.
    pub fn record(&mut self, token: &str, outcome: Outcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        if outcome != Outcome::RateLimited {
            *self.per_token.entry(token.to_string()).or_insert(0) += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Most requests any single token got past the limiter.
    pub fn max_admitted_per_token(&self) -> usize {
        self.per_token.values().copied().max().unwrap_or(0)
    }

    /// Ratio of rate limited to total.
    pub fn block_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(Outcome::RateLimited) as f64 / total as f64
    }
}

impl std::fmt::Display for OutcomeTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Comment Gate Simulation ===")?;
        writeln!(f, "Total:        {}", self.total())?;
        writeln!(f, "Approved:     {}", self.count(Outcome::Approved))?;
        writeln!(f, "Held:         {}", self.count(Outcome::Held))?;
        writeln!(f, "Rejected:     {}", self.count(Outcome::Rejected))?;
        writeln!(f, "Rate Limited: {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "Block Rate:   {:.1}%", self.block_rate() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut tally = OutcomeTally::new();
        for _ in 0..3 {
            tally.record("10.0.0.1", Outcome::Approved);
        }
        for _ in 0..7 {
            tally.record("10.0.0.1", Outcome::RateLimited);
        }

        assert!((tally.block_rate() - 0.7).abs() < 0.01);
        assert_eq!(tally.max_admitted_per_token(), 3);
    }
}
