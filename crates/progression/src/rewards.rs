//! Static per-action XP reward table and the loop penalty ladder.
//!
//! Rewards are intentionally skewed toward content creation and away
//! from passive reads: listing actions earn nothing, publishing earns
//! the most. Custom values can be layered on at runtime via config.

use std::collections::HashMap;

/// Per-action-type XP rewards with built-in defaults.
pub struct RewardTable {
    rewards: HashMap<String, u64>,
}

impl RewardTable {
    /// Create a reward table with the built-in values.
    pub fn with_defaults() -> Self {
        let mut rewards = HashMap::new();

        // ── Navigation & system ────────────────────────────────────
        rewards.insert("navigate_to_mode".into(), 0);
        rewards.insert("visit_shop".into(), 0);
        rewards.insert("pin_to_workspace".into(), 1);
        rewards.insert("unpin_from_workspace".into(), 1);

        // ── Social ─────────────────────────────────────────────────
        rewards.insert("social_refresh_feed".into(), 0);
        rewards.insert("read_post".into(), 1);
        rewards.insert("select_post_to_comment".into(), 2);
        rewards.insert("comment_post".into(), 10);
        rewards.insert("reply_to_comment".into(), 10);
        rewards.insert("create_post".into(), 15);
        rewards.insert("vote_post".into(), 3);
        rewards.insert("follow_agent".into(), 3);
        rewards.insert("share_link".into(), 12);
        rewards.insert("social_search".into(), 2);
        rewards.insert("social_update_profile".into(), 5);

        // ── Blog ───────────────────────────────────────────────────
        rewards.insert("blog_latest_articles".into(), 0);
        rewards.insert("write_blog_article".into(), 25);
        rewards.insert("review_pending_comments".into(), 5);
        rewards.insert("approve_comment".into(), 4);
        rewards.insert("reject_comment".into(), 3);
        rewards.insert("share_blog_article".into(), 12);

        // ── Email ──────────────────────────────────────────────────
        rewards.insert("email_get_messages".into(), 0);
        rewards.insert("email_read".into(), 1);
        rewards.insert("email_send".into(), 10);
        rewards.insert("email_archive".into(), 1);
        rewards.insert("email_delete".into(), 1);
        rewards.insert("email_search".into(), 2);
        rewards.insert("email_mark_as_read".into(), 1);

        // ── Research ───────────────────────────────────────────────
        rewards.insert("wiki_search".into(), 10);
        rewards.insert("wiki_read".into(), 5);
        rewards.insert("research_query_cache".into(), 10);
        rewards.insert("research_complete".into(), 40);

        // ── Plan ───────────────────────────────────────────────────
        rewards.insert("plan_initialize".into(), 50);
        rewards.insert("plan_update".into(), 35);
        rewards.insert("plan_view".into(), 0);

        // ── Memory ─────────────────────────────────────────────────
        rewards.insert("memory_store".into(), 7);
        rewards.insert("memory_retrieve".into(), 2);

        Self { rewards }
    }

    /// The XP reward for an action type. Unknown actions earn nothing.
    pub fn reward(&self, action_type: &str) -> u64 {
        self.rewards.get(action_type).copied().unwrap_or(0)
    }

    /// Override or add a reward value.
    pub fn set(&mut self, action_type: impl Into<String>, xp: u64) {
        self.rewards.insert(action_type.into(), xp);
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The loop penalty ladder. Indexed by consecutive-repeat count;
/// counts beyond the ladder keep growing 25 XP per extra repeat.
pub fn loop_penalty(loop_count: u32) -> u64 {
    match loop_count {
        0 | 1 => 0,
        2 => 10,
        3 => 20,
        4 => 30,
        5 => 50,
        6 => 75,
        7 => 100,
        n => 100 + u64::from(n - 7) * 25,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishing_outranks_reading() {
        let table = RewardTable::with_defaults();
        assert!(table.reward("write_blog_article") > table.reward("blog_latest_articles"));
        assert!(table.reward("comment_post") > table.reward("read_post"));
    }

    #[test]
    fn unknown_action_earns_nothing() {
        let table = RewardTable::with_defaults();
        assert_eq!(table.reward("summon_kraken"), 0);
    }

    #[test]
    fn navigation_earns_nothing() {
        let table = RewardTable::with_defaults();
        assert_eq!(table.reward("navigate_to_mode"), 0);
    }

    #[test]
    fn overrides_apply() {
        let mut table = RewardTable::with_defaults();
        table.set("email_send", 42);
        assert_eq!(table.reward("email_send"), 42);
    }

    #[test]
    fn penalty_ladder_matches_contract() {
        assert_eq!(loop_penalty(1), 0);
        assert_eq!(loop_penalty(2), 10);
        assert_eq!(loop_penalty(3), 20);
        assert_eq!(loop_penalty(4), 30);
        assert_eq!(loop_penalty(5), 50);
        assert_eq!(loop_penalty(6), 75);
        assert_eq!(loop_penalty(7), 100);
        assert_eq!(loop_penalty(8), 125);
        assert_eq!(loop_penalty(10), 175);
    }
}
