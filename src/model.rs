// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Platform records as seen by the comment gate.
//!
//! These are the facts the calling handler has already loaded from its
//! session and database layers. Only the fields the gate reads are modelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

impl Role {
    /// May see held and spam comments.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }
}

/// Authenticated author of a write request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorContext {
    pub user_id: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_banned: bool,
}

/// Target article, as found by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleContext {
    pub id: String,
    pub status: ArticleStatus,
    pub allow_comments: bool,
}

/// Comment a reply points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentContext {
    pub id: String,
    pub article_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub article_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub is_approved: bool,
    pub is_spam: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes_count: u64,
}

/// Who is reading a comment listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer<'a> {
    pub user_id: Option<&'a str>,
    pub role: Role,
}

impl Viewer<'static> {
    pub const ANONYMOUS: Self = Viewer {
        user_id: None,
        role: Role::User,
    };
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Approved and not flagged as spam.
    pub fn is_public(&self) -> bool {
        self.is_approved && !self.is_spam
    }

    /// Held comments stay visible to their author and to moderators.
    pub fn is_visible_to(&self, viewer: &Viewer<'_>) -> bool {
        self.is_public()
            || viewer.role.can_moderate()
            || viewer.user_id == Some(self.author_id.as_str())
    }

    /// Apply a like (+1) or unlike (-1) without going below zero.
    pub fn apply_like_delta(&mut self, delta: i64) {
        self.likes_count = self.likes_count.saturating_add_signed(delta);
    }
}

/// Comments from `comments` that `viewer` may see, in order.
pub fn filter_visible<'c>(comments: &'c [Comment], viewer: &Viewer<'_>) -> Vec<&'c Comment> {
    comments.iter().filter(|c| c.is_visible_to(viewer)).collect()
}
