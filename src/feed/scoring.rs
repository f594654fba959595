//! Feed ranking.
//!
//! `score = max(0, 1000 - 10 * age_hours) + 50 * likes + (500 if followed)`

use crate::feed::types::{HiddenContent, Post};

const RECENCY_CEILING: f64 = 1000.0;
const RECENCY_DECAY_PER_HOUR: f64 = 10.0;
const LIKE_WEIGHT: f64 = 50.0;
const FOLLOWING_BONUS: f64 = 500.0;
const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

pub fn neural_score(post: &Post, following_ids: &[String], now_ms: u64) -> f64 {
    // Missing creation time counts as brand new.
    let created = post.created_at.unwrap_or(now_ms);
    let age_hours = now_ms.saturating_sub(created) as f64 / MS_PER_HOUR;
    let recency = (RECENCY_CEILING - age_hours * RECENCY_DECAY_PER_HOUR).max(0.0);
    let likes = post.likes_count as f64 * LIKE_WEIGHT;
    let following = if following_ids.iter().any(|id| *id == post.user_id) {
        FOLLOWING_BONUS
    } else {
        0.0
    };
    recency + likes + following
}

/// Drop hidden posts, score the rest and sort best first.
pub fn rank_feed(
    posts: Vec<Post>,
    following_ids: &[String],
    hidden: &HiddenContent,
    now_ms: u64,
) -> Vec<Post> {
    let mut ranked: Vec<Post> = posts
        .into_iter()
        .filter(|p| !hidden.hides(p))
        .map(|mut p| {
            p.neural_score = Some(neural_score(&p, following_ids, now_ms));
            p
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.neural_score
            .unwrap_or(0.0)
            .total_cmp(&a.neural_score.unwrap_or(0.0))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;
    const HOUR: u64 = 3_600_000;

    fn post(id: &str, user: &str, age_hours: u64, likes: u64) -> Post {
        Post {
            id: id.into(),
            user_id: user.into(),
            author_name: user.into(),
            author_avatar: String::new(),
            content: String::new(),
            image_url: None,
            created_at: Some(NOW - age_hours * HOUR),
            likes_count: likes,
            comments: 0,
            shares: 0,
            timestamp: None,
            neural_score: None,
        }
    }

    #[test]
    fn test_score_components() {
        let following = vec!["u1".to_string()];
        assert_eq!(neural_score(&post("a", "u2", 0, 0), &following, NOW), 1000.0);
        assert_eq!(neural_score(&post("a", "u2", 10, 0), &following, NOW), 900.0);
        assert_eq!(neural_score(&post("a", "u2", 200, 2), &following, NOW), 100.0);
        assert_eq!(neural_score(&post("a", "u1", 0, 1), &following, NOW), 1550.0);
    }

    #[test]
    fn test_missing_created_at_counts_as_now() {
        let mut p = post("a", "u", 5, 0);
        p.created_at = None;
        assert_eq!(neural_score(&p, &[], NOW), 1000.0);
    }

    #[test]
    fn test_rank_order_and_filtering() {
        let posts = vec![
            post("old", "u2", 50, 0),        // 500
            post("liked", "u3", 0, 4),       // 1200
            post("friend", "u1", 20, 0),     // 1300
            post("reported", "u4", 0, 100),
        ];
        let hidden = HiddenContent {
            reported_post_ids: vec!["reported".into()],
            ..HiddenContent::default()
        };

        let ranked = rank_feed(posts, &["u1".to_string()], &hidden, NOW);
        let ids: Vec<_> = ranked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["friend", "liked", "old"]);
        assert_eq!(ranked[0].neural_score, Some(1300.0));
    }
}
