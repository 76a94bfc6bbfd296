//! # Grouping
//!
//! Decides bubble shape and avatar placement from a message's neighbours.
//! Reactions are invisible to both passes: they get no entry and the
//! neighbour scan looks straight past them.
//!
//! ```text
//! sameAsPrev  sameAsNext   position
//!   false       false      Single
//!   false       true       First
//!   true        true       Middle
//!   true        false      Last
//! ```

use std::collections::HashMap;

use crate::core::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupPosition {
    Single,
    First,
    Middle,
    Last,
}

impl GroupPosition {
    fn from_neighbours(same_as_prev: bool, same_as_next: bool) -> Self {
        match (same_as_prev, same_as_next) {
            (false, false) => GroupPosition::Single,
            (false, true) => GroupPosition::First,
            (true, true) => GroupPosition::Middle,
            (true, false) => GroupPosition::Last,
        }
    }

    /// Whether the top corner on the sender's side should be flattened.
    pub fn joins_previous(self) -> bool {
        matches!(self, GroupPosition::Middle | GroupPosition::Last)
    }

    /// Whether the bottom corner on the sender's side should be flattened.
    pub fn joins_next(self) -> bool {
        matches!(self, GroupPosition::First | GroupPosition::Middle)
    }
}

/// Indices of non-reaction messages, in list order.
fn visible_indices(messages: &[Message]) -> Vec<usize> {
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.is_reaction)
        .map(|(i, _)| i)
        .collect()
}

pub fn resolve_group_positions(messages: &[Message]) -> HashMap<usize, GroupPosition> {
    let visible = visible_indices(messages);
    let mut positions = HashMap::with_capacity(visible.len());

    for (slot, &index) in visible.iter().enumerate() {
        let current = &messages[index];
        let same_as_prev = slot
            .checked_sub(1)
            .map(|p| messages[visible[p]].same_sender_as(current))
            .unwrap_or(false);
        let same_as_next = visible
            .get(slot + 1)
            .map(|&n| messages[n].same_sender_as(current))
            .unwrap_or(false);
        positions.insert(index, GroupPosition::from_neighbours(same_as_prev, same_as_next));
    }

    positions
}

/// Every visible message gets an entry. Only the last inbound message of
/// a same-sender run shows an avatar, and only in group chats.
pub fn resolve_avatar_visibility(
    messages: &[Message],
    is_group_chat: bool,
) -> HashMap<usize, bool> {
    let visible = visible_indices(messages);
    let mut avatars = HashMap::with_capacity(visible.len());

    for (slot, &index) in visible.iter().enumerate() {
        let current = &messages[index];
        let show = is_group_chat
            && !current.is_from_me
            && match visible.get(slot + 1).map(|&n| &messages[n]) {
                None => true,
                Some(next) => next.is_from_me || next.sender_address != current.sender_address,
            };
        avatars.insert(index, show);
    }

    avatars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inbound, outbound, reaction};

    fn positions_in_order(messages: &[Message]) -> Vec<Option<GroupPosition>> {
        let map = resolve_group_positions(messages);
        (0..messages.len()).map(|i| map.get(&i).copied()).collect()
    }

    #[test]
    fn test_empty_list() {
        assert!(resolve_group_positions(&[]).is_empty());
        assert!(resolve_avatar_visibility(&[], true).is_empty());
    }

    #[test]
    fn test_only_reactions() {
        let messages = vec![reaction("r1", "alice"), reaction("r2", "bob")];
        assert!(resolve_group_positions(&messages).is_empty());
        assert!(resolve_avatar_visibility(&messages, true).is_empty());
    }

    #[test]
    fn test_alternating_runs() {
        use GroupPosition::*;
        let messages = vec![
            inbound("1", "a", "one"),
            inbound("2", "a", "two"),
            inbound("3", "b", "three"),
            inbound("4", "a", "four"),
            inbound("5", "a", "five"),
        ];
        assert_eq!(
            positions_in_order(&messages),
            vec![Some(First), Some(Last), Some(Single), Some(First), Some(Last)]
        );
    }

    #[test]
    fn test_middle_of_run() {
        use GroupPosition::*;
        let messages = vec![
            outbound("1", "one"),
            outbound("2", "two"),
            outbound("3", "three"),
        ];
        assert_eq!(
            positions_in_order(&messages),
            vec![Some(First), Some(Middle), Some(Last)]
        );
    }

    #[test]
    fn test_direction_breaks_run() {
        use GroupPosition::*;
        // Same address but flipped direction is a different run.
        let mut mine = outbound("2", "mine");
        mine.sender_address = Some("a".into());
        let messages = vec![inbound("1", "a", "theirs"), mine];
        assert_eq!(positions_in_order(&messages), vec![Some(Single), Some(Single)]);
    }

    #[test]
    fn test_reactions_are_skipped() {
        use GroupPosition::*;
        let messages = vec![
            inbound("1", "a", "one"),
            reaction("r1", "b"),
            inbound("2", "a", "two"),
            reaction("r2", "a"),
            inbound("3", "a", "three"),
        ];
        assert_eq!(
            positions_in_order(&messages),
            vec![Some(First), None, Some(Middle), None, Some(Last)]
        );
    }

    #[test]
    fn test_avatar_last_of_run() {
        let messages = vec![
            inbound("1", "a", "one"),
            inbound("2", "a", "two"),
            inbound("3", "a", "three"),
            outbound("4", "mine"),
        ];
        let avatars = resolve_avatar_visibility(&messages, true);
        assert_eq!(avatars[&0], false);
        assert_eq!(avatars[&1], false);
        assert_eq!(avatars[&2], true);
        assert_eq!(avatars[&3], false);
    }

    #[test]
    fn test_avatar_sender_change_and_end_of_list() {
        let messages = vec![
            inbound("1", "a", "one"),
            inbound("2", "b", "two"),
            reaction("r", "c"),
        ];
        let avatars = resolve_avatar_visibility(&messages, true);
        assert_eq!(avatars[&0], true);
        assert_eq!(avatars[&1], true);
        assert!(!avatars.contains_key(&2));
    }

    #[test]
    fn test_avatar_looks_past_reactions() {
        let messages = vec![
            inbound("1", "a", "one"),
            reaction("r", "a"),
            inbound("2", "a", "two"),
        ];
        let avatars = resolve_avatar_visibility(&messages, true);
        assert_eq!(avatars[&0], false);
        assert_eq!(avatars[&2], true);
    }

    #[test]
    fn test_one_to_one_chat_never_shows_avatars() {
        let messages = vec![inbound("1", "a", "one"), inbound("2", "b", "two")];
        let avatars = resolve_avatar_visibility(&messages, false);
        assert_eq!(avatars.len(), 2);
        assert!(avatars.values().all(|&show| !show));
    }

    #[test]
    fn test_corner_helpers() {
        assert!(!GroupPosition::Single.joins_previous());
        assert!(!GroupPosition::Single.joins_next());
        assert!(GroupPosition::First.joins_next());
        assert!(GroupPosition::Middle.joins_previous() && GroupPosition::Middle.joins_next());
        assert!(GroupPosition::Last.joins_previous());
    }
}
