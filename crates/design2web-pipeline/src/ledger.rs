//! Version ledger
//!
//! Append-only history of accepted snapshots with a movable cursor and a
//! write-once "final" marker.
//!
//! Unlike an undo stack, appending never truncates: every accepted
//! generation stays reachable. The ledger records the final selection but
//! does not refuse appends or navigation afterwards; the editing session
//! owns that policy.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::types::CodeSnapshot;

/// Cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

/// Ordered snapshot history
#[derive(Debug, Clone, Default)]
pub struct VersionLedger {
    snapshots: Vec<CodeSnapshot>,
    /// `None` iff `snapshots` is empty
    current: Option<usize>,
    final_index: Option<usize>,
}

impl VersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot and move the cursor onto it.
    ///
    /// Returns the new snapshot's index.
    pub fn append(&mut self, snapshot: CodeSnapshot) -> usize {
        self.snapshots.push(snapshot);
        let index = self.snapshots.len() - 1;
        self.current = Some(index);
        index
    }

    /// Move the cursor by one, clamped to the valid range.
    ///
    /// Returns whether the cursor moved.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let target = match direction {
            Direction::Prev => current.checked_sub(1),
            Direction::Next => Some(current + 1).filter(|i| *i < self.snapshots.len()),
        };
        match target {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    /// Record `index` as the final selection.
    ///
    /// Fails without changing anything if a final selection already exists
    /// or `index` is out of range.
    pub fn mark_final(&mut self, index: usize) -> Result<()> {
        if let Some(existing) = self.final_index {
            return Err(PipelineError::AlreadyFinal(existing));
        }
        if index >= self.snapshots.len() {
            return Err(PipelineError::IndexOutOfRange {
                index,
                len: self.snapshots.len(),
            });
        }
        self.final_index = Some(index);
        Ok(())
    }

    /// Snapshot at the cursor
    pub fn current(&self) -> Option<&CodeSnapshot> {
        self.current.map(|i| &self.snapshots[i])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn final_index(&self) -> Option<usize> {
        self.final_index
    }

    /// The snapshot locked as final, if any
    pub fn final_snapshot(&self) -> Option<&CodeSnapshot> {
        self.final_index.map(|i| &self.snapshots[i])
    }

    pub fn get(&self, index: usize) -> Option<&CodeSnapshot> {
        self.snapshots.get(index)
    }

    pub fn can_go_back(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.snapshots.len())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor/final summary for display
    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            len: self.snapshots.len(),
            current_index: self.current.map_or(-1, |i| i as i64),
            final_index: self.final_index,
            can_go_back: self.can_go_back(),
            can_go_forward: self.can_go_forward(),
        }
    }
}

/// Serializable view of the ledger position; `current_index` is `-1` when
/// empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub len: usize,
    pub current_index: i64,
    pub final_index: Option<usize>,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: &str) -> CodeSnapshot {
        CodeSnapshot::new(format!("<p>{}</p>", tag), "", "")
    }

    #[test]
    fn test_append_and_navigate() {
        let mut ledger = VersionLedger::new();
        assert_eq!(ledger.current_index(), None);
        assert!(ledger.current().is_none());
        assert_eq!(ledger.summary().current_index, -1);

        assert_eq!(ledger.append(snap("A")), 0);
        assert_eq!(ledger.current_index(), Some(0));
        assert_eq!(ledger.append(snap("B")), 1);
        assert_eq!(ledger.current_index(), Some(1));

        assert!(ledger.navigate(Direction::Prev));
        assert_eq!(ledger.current_index(), Some(0));
        assert!(!ledger.navigate(Direction::Prev));
        assert_eq!(ledger.current_index(), Some(0));
        assert_eq!(ledger.current().unwrap().html, "<p>A</p>");
    }

    #[test]
    fn test_navigate_next_clamps() {
        let mut ledger = VersionLedger::new();
        assert!(!ledger.navigate(Direction::Next));
        ledger.append(snap("A"));
        ledger.append(snap("B"));
        assert!(!ledger.navigate(Direction::Next));
        ledger.navigate(Direction::Prev);
        assert!(ledger.can_go_forward());
        assert!(ledger.navigate(Direction::Next));
        assert_eq!(ledger.current_index(), Some(1));
    }

    #[test]
    fn test_append_after_navigation_keeps_history() {
        let mut ledger = VersionLedger::new();
        ledger.append(snap("A"));
        ledger.append(snap("B"));
        ledger.navigate(Direction::Prev);
        ledger.append(snap("C"));
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.current_index(), Some(2));
        assert_eq!(ledger.get(1).unwrap().html, "<p>B</p>");
    }

    #[test]
    fn test_mark_final_is_write_once() {
        let mut ledger = VersionLedger::new();
        ledger.append(snap("A"));
        ledger.append(snap("B"));

        ledger.mark_final(0).unwrap();
        let err = ledger.mark_final(1).unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyFinal(0)));
        assert_eq!(ledger.final_index(), Some(0));
        assert_eq!(ledger.final_snapshot().unwrap().html, "<p>A</p>");
    }

    #[test]
    fn test_mark_final_out_of_range() {
        let mut ledger = VersionLedger::new();
        assert!(matches!(
            ledger.mark_final(0),
            Err(PipelineError::IndexOutOfRange { index: 0, len: 0 })
        ));
        assert_eq!(ledger.final_index(), None);
    }
}
