//! Waitlist queue ordering.

use crate::{WaitlistEntry, WaitlistEntryId};

/// Entries holding a queue place, oldest first. Entries without a creation
/// time go to the back.
pub fn active_queue(entries: &[WaitlistEntry]) -> Vec<&WaitlistEntry> {
    let mut queue: Vec<&WaitlistEntry> = entries
        .iter()
        .filter(|e| e.holds_queue_place())
        .collect();
    queue.sort_by_key(|e| (e.created_at.is_none(), e.created_at));
    queue
}

/// 1-based queue position, or `None` when the entry holds no place.
pub fn queue_position(entries: &[WaitlistEntry], id: &WaitlistEntryId) -> Option<usize> {
    active_queue(entries)
        .iter()
        .position(|e| e.id.as_ref() == Some(id))
        .map(|index| index + 1)
}
