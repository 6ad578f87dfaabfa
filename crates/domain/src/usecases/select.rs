//! Drip-feed selection - decides what a single run posts and how far the cursor moves

use std::collections::BTreeMap;

use time::{Duration, OffsetDateTime};

use crate::model::{Cursor, Item, Selection};

/// Freshness policy applied by the selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Oldest a story may be and still get posted (inclusive)
    pub max_age: Duration,
}

impl SelectionPolicy {
    pub fn from_hours(hours: u32) -> Self {
        Self {
            max_age: Duration::hours(i64::from(hours)),
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from_hours(48)
    }
}

/// Pick at most one story to post.
///
/// Only stories above the cursor are considered. Among those, the fresh story
/// with the smallest ID wins. If every new story is stale the cursor jumps to
/// the largest new ID without posting, so a backlog built up during downtime
/// is never revisited.
pub fn select(
    candidates: Vec<Item>,
    cursor: Cursor,
    now: OffsetDateTime,
    policy: &SelectionPolicy,
) -> Selection {
    // Keyed by ID: collapses duplicates and keeps ascending order.
    let mut novel: BTreeMap<u64, Item> = BTreeMap::new();
    for item in candidates {
        if item.id > cursor.last_id {
            novel.entry(item.id).or_insert(item);
        }
    }

    let Some(&max_id) = novel.keys().next_back() else {
        return Selection::NoOp;
    };

    match novel
        .into_values()
        .find(|item| now - item.published_at <= policy.max_age)
    {
        Some(item) => {
            let new_last_id = item.id;
            Selection::PostAndAdvance { item, new_last_id }
        }
        None => Selection::AdvanceOnly {
            new_last_id: max_id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn item(id: u64, age: Duration) -> Item {
        Item {
            id,
            title: format!("Story {}", id),
            target_url: format!("https://example.com/{}", id),
            discussion_url: format!("https://news.ycombinator.com/item?id={}", id),
            published_at: now() - age,
            score: Some(150),
        }
    }

    fn fresh(id: u64) -> Item {
        item(id, Duration::hours(1))
    }

    fn stale(id: u64) -> Item {
        item(id, Duration::hours(72))
    }

    fn policy() -> SelectionPolicy {
        SelectionPolicy::from_hours(48)
    }

    fn posted_id(selection: &Selection) -> Option<u64> {
        match selection {
            Selection::PostAndAdvance { item, .. } => Some(item.id),
            _ => None,
        }
    }

    #[test]
    fn test_picks_oldest_fresh_item() {
        let selection = select(
            vec![fresh(105), fresh(102), fresh(108)],
            Cursor::new(100),
            now(),
            &policy(),
        );

        assert_eq!(posted_id(&selection), Some(102));
        assert_eq!(selection.new_last_id(), Some(102));
    }

    #[test]
    fn test_stale_backlog_advances_without_posting() {
        let selection = select(
            vec![stale(101), stale(102)],
            Cursor::new(100),
            now(),
            &policy(),
        );

        assert_eq!(selection, Selection::AdvanceOnly { new_last_id: 102 });
    }

    #[test]
    fn test_nothing_new_is_noop() {
        let candidates = vec![fresh(499), fresh(500), stale(320)];

        let first = select(candidates.clone(), Cursor::new(500), now(), &policy());
        let second = select(candidates, Cursor::new(500), now(), &policy());

        assert_eq!(first, Selection::NoOp);
        assert_eq!(second, Selection::NoOp);
    }

    #[test]
    fn test_empty_candidates_is_noop() {
        let selection = select(vec![], Cursor::default(), now(), &policy());
        assert_eq!(selection, Selection::NoOp);
    }

    #[test]
    fn test_id_equal_to_cursor_is_excluded() {
        let selection = select(vec![fresh(100)], Cursor::new(100), now(), &policy());
        assert_eq!(selection, Selection::NoOp);
    }

    #[test]
    fn test_item_exactly_at_max_age_is_fresh() {
        let selection = select(
            vec![item(101, Duration::hours(48))],
            Cursor::new(100),
            now(),
            &policy(),
        );

        assert_eq!(posted_id(&selection), Some(101));
    }

    #[test]
    fn test_item_just_past_max_age_is_stale() {
        let selection = select(
            vec![item(101, Duration::hours(48) + Duration::seconds(1))],
            Cursor::new(100),
            now(),
            &policy(),
        );

        assert_eq!(selection, Selection::AdvanceOnly { new_last_id: 101 });
    }

    #[test]
    fn test_zero_max_age_only_admits_items_published_now() {
        let policy = SelectionPolicy::from_hours(0);

        let selection = select(
            vec![item(101, Duration::ZERO), item(102, Duration::seconds(1))],
            Cursor::new(100),
            now(),
            &policy,
        );
        assert_eq!(posted_id(&selection), Some(101));

        let selection = select(
            vec![item(102, Duration::seconds(1))],
            Cursor::new(101),
            now(),
            &policy,
        );
        assert_eq!(selection, Selection::AdvanceOnly { new_last_id: 102 });
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let selection = select(
            vec![item(101, Duration::minutes(-5))],
            Cursor::new(100),
            now(),
            &policy(),
        );

        assert_eq!(posted_id(&selection), Some(101));
    }

    #[test]
    fn test_duplicate_ids_collapse() {
        let mut copy = fresh(101);
        copy.title = "Same story, different title".to_string();

        let selection = select(
            vec![fresh(101), copy, fresh(101)],
            Cursor::new(100),
            now(),
            &policy(),
        );

        assert_eq!(posted_id(&selection), Some(101));
        assert_eq!(selection.new_last_id(), Some(101));
    }

    #[test]
    fn test_fresh_item_wins_over_older_stale_ones() {
        let selection = select(
            vec![stale(101), stale(102), fresh(103), fresh(104)],
            Cursor::new(100),
            now(),
            &policy(),
        );

        // The stale items fall below the new cursor and are never posted.
        assert_eq!(posted_id(&selection), Some(103));
        assert_eq!(selection.new_last_id(), Some(103));
    }

    #[test]
    fn test_stale_skip_uses_max_of_all_novel_ids() {
        let selection = select(
            vec![stale(90), stale(101), stale(250), stale(180)],
            Cursor::new(100),
            now(),
            &policy(),
        );

        assert_eq!(selection, Selection::AdvanceOnly { new_last_id: 250 });
    }

    #[test]
    fn test_cursor_never_moves_backwards_across_runs() {
        let feed = vec![
            fresh(110),
            stale(104),
            fresh(107),
            fresh(103),
            stale(120),
            fresh(115),
        ];

        let mut cursor = Cursor::default();
        let mut posts = 0;
        for _ in 0..10 {
            let selection = select(feed.clone(), cursor, now(), &policy());
            if posted_id(&selection).is_some() {
                posts += 1;
            }
            if let Some(new_last_id) = selection.new_last_id() {
                assert!(new_last_id > cursor.last_id);
                cursor = Cursor::new(new_last_id);
            }
        }

        // 103, 107, 110, 115 get posted one per run; 120 is skipped as stale.
        assert_eq!(posts, 4);
        assert_eq!(cursor, Cursor::new(120));
    }
}
