// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment Gate
//!
//! Admission control for the comment and like endpoints of an article
//! platform:
//!
//! - Per-client fixed-window rate limiting (10 comments, 60 likes per minute)
//! - Comment preconditions (length, bans, article state, one reply level)
//! - Moderation: new authors and spammy content are held, never dropped
//! - Like and unlike admission against public comments only

pub mod clock;
pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod model;
pub mod moderation;
pub mod validator;

pub use config::Config;
pub use gate::{CommentDecision, CommentGate, LikeDecision};
pub use limiter::{RateLimitResult, RateLimiter};
pub use moderation::{Disposition, ModerationPolicy};
pub use validator::{CommentValidator, ValidationResult};
