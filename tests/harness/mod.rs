// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for comment gate abuse simulation.
//!
//! Utilities for replaying flood and spam patterns against the gate and
//! tallying what got through.

pub mod attacks;
pub mod generators;
pub mod metrics;
