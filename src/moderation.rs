// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Initial visibility classification for new comments.
//!
//! The policy never refuses a comment. It only decides whether the comment
//! is shown straight away or held for a moderator:
//! - content that trips the spam heuristic is flagged as spam
//! - authors with fewer than `new_user_threshold` prior comments are held
//!
//! `is_approved = !new_author && !spam`.

use crate::config::ModerationConfig;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Decides whether comment content looks like spam.
pub trait SpamHeuristic: Send + Sync + Debug {
    fn looks_like_spam(&self, content: &str) -> bool;
}

/// Case-insensitive substring match against a fixed keyword list.
///
/// Trivially bypassed and prone to false positives (any link is flagged).
#[derive(Debug, Clone)]
pub struct KeywordHeuristic {
    keywords: Vec<String>,
}

impl KeywordHeuristic {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

impl Default for KeywordHeuristic {
    fn default() -> Self {
        Self::new(ModerationConfig::default().spam_keywords)
    }
}

impl SpamHeuristic for KeywordHeuristic {
    fn looks_like_spam(&self, content: &str) -> bool {
        let lowered = content.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Comment awaiting classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCandidate {
    pub content: String,
    pub author_prior_comment_count: u64,
}

/// Why a comment was not auto-approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldReason {
    NewAuthor,
    SpamContent,
}

impl std::fmt::Display for HoldReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewAuthor => write!(f, "author has too few prior comments"),
            Self::SpamContent => write!(f, "content matched spam heuristic"),
        }
    }
}

/// Flags to store on the new comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposition {
    pub is_approved: bool,
    pub is_spam: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<HoldReason>,
}

impl Disposition {
    /// Shown to every reader.
    pub fn is_public(&self) -> bool {
        self.is_approved && !self.is_spam
    }
}

/// Comment moderation policy.
#[derive(Debug, Clone)]
pub struct ModerationPolicy<H = KeywordHeuristic> {
    new_user_threshold: u64,
    heuristic: H,
}

impl ModerationPolicy<KeywordHeuristic> {
    pub fn new(config: &ModerationConfig) -> Self {
        Self::with_heuristic(
            config.new_user_threshold,
            KeywordHeuristic::new(&config.spam_keywords),
        )
    }
}

impl Default for ModerationPolicy<KeywordHeuristic> {
    fn default() -> Self {
        Self::new(&ModerationConfig::default())
    }
}

impl<H: SpamHeuristic> ModerationPolicy<H> {
    pub fn with_heuristic(new_user_threshold: u64, heuristic: H) -> Self {
        Self {
            new_user_threshold,
            heuristic,
        }
    }

    pub fn is_new_author(&self, prior_comment_count: u64) -> bool {
        prior_comment_count < self.new_user_threshold
    }

    /// Classify a candidate comment.
    pub fn evaluate(&self, candidate: &CommentCandidate) -> Disposition {
        let is_spam = self.heuristic.looks_like_spam(&candidate.content);
        let new_author = self.is_new_author(candidate.author_prior_comment_count);

        let mut reasons = Vec::new();
        if new_author {
            reasons.push(HoldReason::NewAuthor);
        }
        if is_spam {
            reasons.push(HoldReason::SpamContent);
        }

        Disposition {
            is_approved: !new_author && !is_spam,
            is_spam,
            reasons,
        }
    }
}
