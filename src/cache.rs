//! In-process cache for the kanban board payload.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::dto::kanban::KanbanBoard;

/// How long a cached board stays fresh.
const BOARD_TTL: Duration = Duration::from_secs(30);

/// Per-branch cache of the assembled board. Entries expire after
/// [`BOARD_TTL`] and are dropped eagerly whenever a card moves, so a PATCH
/// is visible on the next read.
pub struct KanbanCache {
    ttl: Duration,
    boards: RwLock<HashMap<i32, (Instant, KanbanBoard)>>,
}

impl KanbanCache {
    pub fn new() -> Self {
        Self::with_ttl(BOARD_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            boards: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached board for the branch when still fresh.
    pub fn get(&self, branch_id: i32) -> Option<KanbanBoard> {
        let boards = self.boards.read().ok()?;
        let (stored_at, board) = boards.get(&branch_id)?;
        (stored_at.elapsed() < self.ttl).then(|| board.clone())
    }

    /// Stores a freshly assembled board for the branch.
    pub fn store(&self, branch_id: i32, board: KanbanBoard) {
        if let Ok(mut boards) = self.boards.write() {
            boards.insert(branch_id, (Instant::now(), board));
        }
    }

    /// Drops the cached board so the next read rebuilds it.
    pub fn invalidate(&self, branch_id: i32) {
        if let Ok(mut boards) = self.boards.write() {
            boards.remove(&branch_id);
        }
    }
}

impl Default for KanbanCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(unassigned: usize) -> KanbanBoard {
        KanbanBoard {
            columns: Vec::new(),
            unassigned,
        }
    }

    #[test]
    fn stores_and_returns_per_branch() {
        let cache = KanbanCache::new();
        cache.store(1, board(2));
        cache.store(2, board(5));

        assert_eq!(cache.get(1).map(|b| b.unassigned), Some(2));
        assert_eq!(cache.get(2).map(|b| b.unassigned), Some(5));
        assert!(cache.get(3).is_none());
    }

    #[test]
    fn entries_expire() {
        let cache = KanbanCache::with_ttl(Duration::ZERO);
        cache.store(1, board(0));
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn invalidate_drops_the_branch_entry() {
        let cache = KanbanCache::new();
        cache.store(1, board(1));
        cache.store(2, board(2));
        cache.invalidate(1);

        assert!(cache.get(1).is_none());
        assert_eq!(cache.get(2).map(|b| b.unassigned), Some(2));
    }
}
