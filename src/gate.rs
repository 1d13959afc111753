// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment and like admission pipeline.
//!
//! Comment submissions run through the comment limiter, then the
//! precondition validator, then the moderation policy. Likes use their own
//! limiter and only check that the target is public and not already liked.
//! Accepted requests come back with the write the caller should perform.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::GateMetrics;
use crate::model::{ArticleContext, AuthorContext, ParentContext};
use crate::moderation::{
    CommentCandidate, Disposition, KeywordHeuristic, ModerationPolicy, SpamHeuristic,
};
use crate::validator::{CommentValidator, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Everything the caller knows about a new comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentSubmission {
    pub author: AuthorContext,
    /// `None` when the article could not be found
    #[serde(default)]
    pub article: Option<ArticleContext>,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Looked up by the caller when `parent_id` is set
    #[serde(default)]
    pub parent: Option<ParentContext>,
    pub author_prior_comment_count: u64,
    /// Client `User-Agent`, stored for moderators
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl CommentSubmission {
    /// Parent id of a reply. Blank ids mean a top-level comment.
    pub fn reply_target(&self) -> Option<&str> {
        non_blank(self.parent_id.as_deref())
    }
}

pub(crate) fn non_blank(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.trim().is_empty())
}

/// Row the caller should insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub content: String,
    pub author_id: String,
    pub article_id: String,
    pub parent_id: Option<String>,
    pub is_approved: bool,
    pub is_spam: bool,
    /// Client token the comment was admitted under
    pub ip_address: String,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentDecision {
    RateLimited(RateLimitResult),
    Rejected(ValidationError),
    Accepted {
        comment: NewComment,
        disposition: Disposition,
        rate_limit: RateLimitResult,
    },
}

/// Comment being liked, as found by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeTarget {
    pub id: String,
    pub is_approved: bool,
    pub is_spam: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeSubmission {
    pub user_id: String,
    #[serde(default)]
    pub comment: Option<LikeTarget>,
    #[serde(default)]
    pub already_liked: bool,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlikeSubmission {
    pub user_id: String,
    pub comment_id: String,
    pub has_liked: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LikeError {
    #[error("Comment not found or not approved")]
    CommentNotFound,

    #[error("You have already liked this comment")]
    AlreadyLiked,

    #[error("Like not found")]
    LikeNotFound,
}

impl LikeError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::AlreadyLiked => "ALREADY_LIKED",
            Self::LikeNotFound => "LIKE_NOT_FOUND",
        }
    }
}

/// Like counter change for the caller to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeIntent {
    pub comment_id: String,
    pub user_id: String,
    /// +1 for a like, -1 for an unlike
    pub delta: i64,
    /// Request metadata for the new like row; `None` on unlike
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeDecision {
    RateLimited(RateLimitResult),
    Rejected(LikeError),
    Accepted(LikeIntent),
}

/// Comment and like admission pipeline.
#[derive(Debug)]
pub struct CommentGate<H = KeywordHeuristic> {
    comment_limiter: RateLimiter,
    comment_limit: u32,
    like_limiter: RateLimiter,
    like_limit: u32,
    validator: CommentValidator,
    policy: ModerationPolicy<H>,
    metrics: GateMetrics,
}

impl CommentGate<KeywordHeuristic> {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::with_parts(config, clock, ModerationPolicy::new(&config.moderation))
    }
}

impl<H: SpamHeuristic> CommentGate<H> {
    /// Build a gate around a custom moderation policy.
    pub fn with_parts(
        config: &Config,
        clock: Arc<dyn Clock>,
        policy: ModerationPolicy<H>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            comment_limiter: RateLimiter::with_clock(&config.comment_limiter, clock.clone()),
            comment_limit: config.comment_limiter.limit,
            like_limiter: RateLimiter::with_clock(&config.like_limiter, clock),
            like_limit: config.like_limiter.limit,
            validator: CommentValidator::new(&config.moderation),
            policy,
            metrics: GateMetrics::new()?,
        })
    }

    pub fn metrics(&self) -> &GateMetrics {
        &self.metrics
    }

    pub fn comment_limiter(&self) -> &RateLimiter {
        &self.comment_limiter
    }

    pub fn like_limiter(&self) -> &RateLimiter {
        &self.like_limiter
    }

    /// Decide whether a comment may be created and with which flags.
    pub fn submit_comment(&self, token: &str, submission: &CommentSubmission) -> CommentDecision {
        let rate_limit = self.comment_limiter.check(self.comment_limit, token);
        if !rate_limit.is_allowed() {
            info!(
                token = %token,
                user_id = %submission.author.user_id,
                retry_after_secs = rate_limit.retry_after_secs(),
                "Comment submission rate limited"
            );
            self.metrics.record_rate_limited(self.comment_limiter.name());
            self.metrics.record_comment("rate_limited");
            return CommentDecision::RateLimited(rate_limit);
        }

        let article = match (self.validator.validate(submission), submission.article.as_ref()) {
            (ValidationResult::Valid, Some(article)) => article,
            (ValidationResult::Invalid(err), _) => {
                info!(
                    user_id = %submission.author.user_id,
                    code = err.code(),
                    error = %err,
                    "Comment refused"
                );
                self.metrics.record_comment("rejected");
                return CommentDecision::Rejected(err);
            }
            (ValidationResult::Valid, None) => {
                self.metrics.record_comment("rejected");
                return CommentDecision::Rejected(ValidationError::ArticleUnavailable);
            }
        };

        let disposition = self.policy.evaluate(&CommentCandidate {
            content: submission.content.clone(),
            author_prior_comment_count: submission.author_prior_comment_count,
        });

        debug!(
            user_id = %submission.author.user_id,
            article_id = %article.id,
            is_approved = disposition.is_approved,
            is_spam = disposition.is_spam,
            reasons = ?disposition.reasons,
            "Comment classified"
        );
        self.metrics.record_comment(if disposition.is_approved {
            "approved"
        } else {
            "held"
        });

        CommentDecision::Accepted {
            comment: NewComment {
                content: submission.content.clone(),
                author_id: submission.author.user_id.clone(),
                article_id: article.id.clone(),
                parent_id: submission.reply_target().map(str::to_string),
                is_approved: disposition.is_approved,
                is_spam: disposition.is_spam,
                ip_address: token.to_string(),
                user_agent: submission.user_agent.clone(),
            },
            disposition,
            rate_limit,
        }
    }

    /// Decide whether a like may be recorded.
    pub fn submit_like(&self, token: &str, submission: &LikeSubmission) -> LikeDecision {
        let rate_limit = self.like_limiter.check(self.like_limit, token);
        if !rate_limit.is_allowed() {
            info!(
                token = %token,
                user_id = %submission.user_id,
                retry_after_secs = rate_limit.retry_after_secs(),
                "Like rate limited"
            );
            self.metrics.record_rate_limited(self.like_limiter.name());
            self.metrics.record_like("rate_limited");
            return LikeDecision::RateLimited(rate_limit);
        }

        let target = match &submission.comment {
            Some(c) if c.is_approved && !c.is_spam => c,
            _ => return self.reject_like(&submission.user_id, LikeError::CommentNotFound),
        };

        if submission.already_liked {
            return self.reject_like(&submission.user_id, LikeError::AlreadyLiked);
        }

        self.metrics.record_like("accepted");
        LikeDecision::Accepted(LikeIntent {
            comment_id: target.id.clone(),
            user_id: submission.user_id.clone(),
            delta: 1,
            ip_address: Some(token.to_string()),
            user_agent: submission.user_agent.clone(),
        })
    }

    /// Removing a like is not rate limited.
    pub fn submit_unlike(&self, submission: &UnlikeSubmission) -> LikeDecision {
        if !submission.has_liked {
            return self.reject_like(&submission.user_id, LikeError::LikeNotFound);
        }

        self.metrics.record_like("removed");
        LikeDecision::Accepted(LikeIntent {
            comment_id: submission.comment_id.clone(),
            user_id: submission.user_id.clone(),
            delta: -1,
            ip_address: None,
            user_agent: None,
        })
    }

    fn reject_like(&self, user_id: &str, err: LikeError) -> LikeDecision {
        debug!(%user_id, code = err.code(), "Like refused");
        self.metrics.record_like("rejected");
        LikeDecision::Rejected(err)
    }
}
