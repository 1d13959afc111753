// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use comment_gate::gate::CommentSubmission;
use comment_gate::model::{ArticleContext, ArticleStatus, AuthorContext, Role};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client tokens (IP addresses) for testing.
pub fn generate_tokens(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c)).to_string()
        })
        .collect()
}

/// Content the keyword heuristic must flag.
pub fn generate_spam_contents() -> Vec<&'static str> {
    vec![
        "BUY NOW while stocks last",
        "Huge discount on watches",
        "check out http://cheap.example",
        "More at https://promo.example/deal",
        "visit www.example.com",
        "Limited Discount!!!",
        "buy now buy now",
    ]
}

/// Content the keyword heuristic must let through.
pub fn generate_clean_contents() -> Vec<&'static str> {
    vec![
        "Great write-up, thanks!",
        "I disagree with the second point.",
        "Could you expand on the benchmarks?",
        "Typo in the third paragraph: 'teh'.",
        "Bought the book after reading this.",
        "Nice.",
    ]
}

/// A valid top-level comment on a published article.
pub fn submission(author: &str, content: &str, prior: u64) -> CommentSubmission {
    CommentSubmission {
        author: AuthorContext {
            user_id: author.to_string(),
            role: Role::User,
            is_banned: false,
        },
        article: Some(ArticleContext {
            id: "article-1".to_string(),
            status: ArticleStatus::Published,
            allow_comments: true,
        }),
        content: content.to_string(),
        parent_id: None,
        parent: None,
        author_prior_comment_count: prior,
        user_agent: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_tokens() {
        let tokens = generate_tokens(256);
        assert_eq!(tokens.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = tokens.iter().collect();
        assert_eq!(unique.len(), 256);
    }
}
