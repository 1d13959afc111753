// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Comment acceptance preconditions.
//!
//! Checked before the moderation policy runs, in this order:
//! - content present and within the length limit
//! - author not banned
//! - article exists, is published and accepts comments
//! - reply target exists on the same article and is not itself a reply
//!
//! A failure here refuses creation outright. Anything that passes is
//! persisted, possibly held.

use crate::config::ModerationConfig;
use crate::gate::{non_blank, CommentSubmission};
use crate::model::{ArticleContext, ArticleStatus, AuthorContext, ParentContext};
use thiserror::Error;
use tracing::debug;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Comment content is required")]
    EmptyContent,

    #[error("Comment is too long (max {max} characters, got {actual})")]
    ContentTooLong { max: usize, actual: usize },

    #[error("Your account has been banned from posting comments")]
    AuthorBanned,

    #[error("Article not found or not published")]
    ArticleUnavailable,

    #[error("Comments are disabled for this article")]
    CommentsDisabled,

    #[error("Parent comment not found")]
    ParentNotFound,

    #[error("Cannot reply to a reply")]
    ReplyToReply,
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::AuthorBanned => "AUTHOR_BANNED",
            Self::ArticleUnavailable => "ARTICLE_UNAVAILABLE",
            Self::CommentsDisabled => "COMMENTS_DISABLED",
            Self::ParentNotFound => "PARENT_NOT_FOUND",
            Self::ReplyToReply => "REPLY_TO_REPLY",
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Request is valid
    Valid,
    /// Request is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Comment precondition validator.
#[derive(Debug, Clone)]
pub struct CommentValidator {
    max_content_chars: usize,
}

impl CommentValidator {
    pub fn new(config: &ModerationConfig) -> Self {
        Self {
            max_content_chars: config.max_content_chars,
        }
    }

    /// Content must be non-blank and at most `max_content_chars` characters.
    ///
    /// Length is counted in Unicode scalar values, not UTF-16 code units, so
    /// text outside the Basic Multilingual Plane (emoji) counts once per
    /// character rather than twice as a JavaScript `length` check would.
    pub fn validate_content(&self, content: &str) -> ValidationResult {
        if content.trim().is_empty() {
            debug!("Empty comment content");
            return ValidationResult::Invalid(ValidationError::EmptyContent);
        }

        let actual = content.chars().count();
        if actual > self.max_content_chars {
            debug!(actual, max = self.max_content_chars, "Comment too long");
            return ValidationResult::Invalid(ValidationError::ContentTooLong {
                max: self.max_content_chars,
                actual,
            });
        }

        ValidationResult::Valid
    }

    pub fn validate_author(&self, author: &AuthorContext) -> ValidationResult {
        if author.is_banned {
            debug!(user_id = %author.user_id, "Banned author attempted to comment");
            return ValidationResult::Invalid(ValidationError::AuthorBanned);
        }
        ValidationResult::Valid
    }

    pub fn validate_article(&self, article: Option<&ArticleContext>) -> ValidationResult {
        match article {
            Some(a) if a.status == ArticleStatus::Published => {
                if a.allow_comments {
                    ValidationResult::Valid
                } else {
                    debug!(article_id = %a.id, "Comments disabled");
                    ValidationResult::Invalid(ValidationError::CommentsDisabled)
                }
            }
            Some(a) => {
                debug!(article_id = %a.id, status = ?a.status, "Article not published");
                ValidationResult::Invalid(ValidationError::ArticleUnavailable)
            }
            None => {
                debug!("Article not found");
                ValidationResult::Invalid(ValidationError::ArticleUnavailable)
            }
        }
    }

    /// Replies may only target top-level comments on the same article.
    ///
    /// A blank `parent_id` is treated as no parent.
    pub fn validate_parent(
        &self,
        article_id: &str,
        parent_id: Option<&str>,
        parent: Option<&ParentContext>,
    ) -> ValidationResult {
        let Some(parent_id) = non_blank(parent_id) else {
            return ValidationResult::Valid;
        };

        let parent = match parent {
            Some(p) if p.id == parent_id && p.article_id == article_id => p,
            _ => {
                debug!(%parent_id, %article_id, "Parent comment not found on article");
                return ValidationResult::Invalid(ValidationError::ParentNotFound);
            }
        };

        if parent.parent_id.is_some() {
            debug!(%parent_id, "Reply to a reply rejected");
            return ValidationResult::Invalid(ValidationError::ReplyToReply);
        }

        ValidationResult::Valid
    }

    /// Validate a complete comment submission.
    pub fn validate(&self, submission: &CommentSubmission) -> ValidationResult {
        let content = self.validate_content(&submission.content);
        if !content.is_valid() {
            return content;
        }

        let author = self.validate_author(&submission.author);
        if !author.is_valid() {
            return author;
        }

        let article = self.validate_article(submission.article.as_ref());
        let Some(article_ctx) = submission.article.as_ref().filter(|_| article.is_valid()) else {
            return article;
        };

        self.validate_parent(
            &article_ctx.id,
            submission.reply_target(),
            submission.parent.as_ref(),
        )
    }
}

impl Default for CommentValidator {
    fn default() -> Self {
        Self::new(&ModerationConfig::default())
    }
}
