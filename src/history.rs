//! Undo/redo history for annotation operations.
//!
//! The ledger is a single linear log with a cursor. Every action at or before
//! the cursor has been applied; every action after it forms the redo branch,
//! which is discarded as soon as a new action is recorded.
//!
//! The ledger itself never talks to persistence. The session looks up the
//! action to compensate or re-apply, performs the persistence round trip, and
//! only then moves the cursor (or rolls it back on failure).

use crate::model::{Annotation, AnnotationId};

// ============================================================================
// Actions
// ============================================================================

/// Kind of a recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

/// A recorded create/update/delete with the snapshots needed to invert it.
///
/// Snapshots are owned copies; mutating the live annotation set later cannot
/// change what the ledger remembers.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// An annotation was created
    Create {
        /// The annotation as persisted
        annotation: Annotation,
    },
    /// An annotation was updated
    Update {
        /// The annotation before the update
        previous: Annotation,
        /// The annotation after the update
        annotation: Annotation,
    },
    /// An annotation was deleted
    Delete {
        /// The annotation as it was before deletion
        annotation: Annotation,
    },
}

impl HistoryAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            HistoryAction::Create { .. } => ActionKind::Create,
            HistoryAction::Update { .. } => ActionKind::Update,
            HistoryAction::Delete { .. } => ActionKind::Delete,
        }
    }

    /// Snapshot after the action.
    pub fn annotation(&self) -> &Annotation {
        match self {
            HistoryAction::Create { annotation }
            | HistoryAction::Update { annotation, .. }
            | HistoryAction::Delete { annotation } => annotation,
        }
    }

    /// Snapshot before the action; only updates carry one.
    pub fn previous(&self) -> Option<&Annotation> {
        match self {
            HistoryAction::Update { previous, .. } => Some(previous),
            _ => None,
        }
    }

    /// Get a human-readable description of this action.
    pub fn description(&self) -> String {
        let kind = self.annotation().kind();
        match self {
            HistoryAction::Create { .. } => format!("Create {kind} annotation"),
            HistoryAction::Update { .. } => format!("Update {kind} annotation"),
            HistoryAction::Delete { .. } => format!("Delete {kind} annotation"),
        }
    }

    fn rebind_id(&mut self, old: AnnotationId, new: AnnotationId) {
        let snapshots: Vec<&mut Annotation> = match self {
            HistoryAction::Create { annotation } | HistoryAction::Delete { annotation } => {
                vec![annotation]
            }
            HistoryAction::Update {
                previous,
                annotation,
            } => vec![previous, annotation],
        };
        for snapshot in snapshots {
            if snapshot.id == Some(old) {
                snapshot.id = Some(new);
            }
        }
    }
}

// ============================================================================
// Ledger
// ============================================================================

/// Configuration for the history ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of actions to keep; the oldest are dropped first.
    /// Zero keeps everything.
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_history: 100 }
    }
}

/// Linear, cursor-addressed log of applied and undone actions.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    /// All recorded actions, oldest first
    actions: Vec<HistoryAction>,
    /// Number of actions currently applied; the cursor is `applied - 1`
    applied: usize,
    /// Configuration
    config: HistoryConfig,
}

impl HistoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record a newly applied action.
    ///
    /// Drops the redo branch first, so history never forks.
    pub fn record(&mut self, action: HistoryAction) {
        log::debug!("History: recorded '{}'", action.description());
        self.actions.truncate(self.applied);
        self.actions.push(action);

        if self.config.max_history > 0 && self.actions.len() > self.config.max_history {
            let excess = self.actions.len() - self.config.max_history;
            self.actions.drain(..excess);
        }
        self.applied = self.actions.len();
    }

    /// Index of the last applied action, `None` when nothing is applied.
    pub fn history_index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.applied < self.actions.len()
    }

    /// The action an undo would compensate.
    pub fn undo_target(&self) -> Option<&HistoryAction> {
        self.history_index().and_then(|i| self.actions.get(i))
    }

    /// The action a redo would re-apply.
    pub fn redo_target(&self) -> Option<&HistoryAction> {
        self.actions.get(self.applied)
    }

    /// Move the cursor back by one.
    ///
    /// Called after an undo's compensating call succeeded, and to roll back
    /// the speculative advance of a failed redo.
    pub fn step_back(&mut self) {
        if self.applied > 0 {
            self.applied -= 1;
            log::debug!("History: cursor moved back to {:?}", self.history_index());
        }
    }

    /// Advance the cursor and return the action to re-apply.
    pub fn advance(&mut self) -> Option<HistoryAction> {
        let action = self.redo_target()?.clone();
        self.applied += 1;
        log::debug!("History: advancing to '{}'", action.description());
        Some(action)
    }

    /// Point every snapshot of `old` at the identity `new`.
    ///
    /// Re-creating a deleted annotation yields a fresh identity; later undo and
    /// redo steps must address the annotation that actually exists.
    pub fn rebind_id(&mut self, old: AnnotationId, new: AnnotationId) {
        if old == new {
            return;
        }
        log::debug!("History: annotation {old} is now {new}");
        for action in &mut self.actions {
            action.rebind_id(old, new);
        }
    }

    /// All recorded actions, oldest first.
    pub fn actions(&self) -> &[HistoryAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.applied = 0;
        log::debug!("History cleared");
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Geometry, Keypoint, Point};

    fn created(id: AnnotationId) -> HistoryAction {
        HistoryAction::Create {
            annotation: Annotation::new(
                1,
                1,
                Geometry::Keypoint(vec![Keypoint::visible_at(Point::new(id as f32, 0.0))]),
            )
            .with_id(id),
        }
    }

    fn assert_cursor_invariants(ledger: &HistoryLedger) {
        let index = ledger.history_index().map_or(-1, |i| i as i64);
        let len = ledger.len() as i64;
        assert!((-1..len.max(1)).contains(&index));
        assert_eq!(ledger.can_undo(), index >= 0);
        assert_eq!(ledger.can_redo(), index < len - 1);
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = HistoryLedger::new();
        assert!(!ledger.can_undo());
        assert!(!ledger.can_redo());
        assert_eq!(ledger.history_index(), None);
        assert!(ledger.undo_target().is_none());
        assert_cursor_invariants(&ledger);
    }

    #[test]
    fn test_record_and_step() {
        let mut ledger = HistoryLedger::new();
        ledger.record(created(1));
        ledger.record(created(2));
        assert_eq!(ledger.history_index(), Some(1));
        assert_cursor_invariants(&ledger);

        assert_eq!(ledger.undo_target(), Some(&created(2)));
        ledger.step_back();
        assert_eq!(ledger.history_index(), Some(0));
        assert!(ledger.can_redo());
        assert_cursor_invariants(&ledger);

        assert_eq!(ledger.advance(), Some(created(2)));
        assert!(!ledger.can_redo());
        assert_eq!(ledger.advance(), None);
        assert_cursor_invariants(&ledger);
    }

    #[test]
    fn test_record_truncates_redo_branch() {
        let mut ledger = HistoryLedger::new();
        ledger.record(created(1));
        ledger.record(created(2));
        ledger.step_back();

        ledger.record(created(3));
        assert!(!ledger.can_redo());
        assert_eq!(ledger.actions(), &[created(1), created(3)]);
        assert_cursor_invariants(&ledger);
    }

    #[test]
    fn test_step_back_at_start_is_noop() {
        let mut ledger = HistoryLedger::new();
        ledger.record(created(1));
        ledger.step_back();
        ledger.step_back();
        assert_eq!(ledger.history_index(), None);
        assert_eq!(ledger.len(), 1);
        assert_cursor_invariants(&ledger);
    }

    #[test]
    fn test_max_history() {
        let mut ledger = HistoryLedger::with_config(HistoryConfig { max_history: 3 });
        for i in 0..5 {
            ledger.record(created(i));
        }
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.history_index(), Some(2));
        assert_eq!(ledger.actions()[0], created(2));
        assert_cursor_invariants(&ledger);
    }

    #[test]
    fn test_rebind_id_rewrites_all_snapshots() {
        let before = Annotation::new(1, 1, Geometry::Classification).with_id(7);
        let after = Annotation::new(1, 2, Geometry::Classification).with_id(7);

        let mut ledger = HistoryLedger::new();
        ledger.record(HistoryAction::Update {
            previous: before,
            annotation: after.clone(),
        });
        ledger.record(HistoryAction::Delete { annotation: after });
        ledger.record(created(8));

        ledger.rebind_id(7, 42);
        assert_eq!(ledger.actions()[0].previous().and_then(|a| a.id), Some(42));
        assert_eq!(ledger.actions()[0].annotation().id, Some(42));
        assert_eq!(ledger.actions()[1].annotation().id, Some(42));
        assert_eq!(ledger.actions()[2].annotation().id, Some(8));
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(created(1).description(), "Create keypoint annotation");
        let delete = HistoryAction::Delete {
            annotation: Annotation::new(1, 1, Geometry::Classification).with_id(1),
        };
        assert_eq!(delete.description(), "Delete classification annotation");
        assert_eq!(delete.kind(), ActionKind::Delete);
        assert!(delete.previous().is_none());
    }

    #[test]
    fn test_clear() {
        let mut ledger = HistoryLedger::new();
        ledger.record(created(1));
        ledger.clear();
        assert!(ledger.is_empty());
        assert_cursor_invariants(&ledger);
    }
}
