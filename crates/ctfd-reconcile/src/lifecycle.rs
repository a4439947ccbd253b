//! Root resource lifecycle.
//!
//! ```text
//!   Absent ──BeginCreate──► Creating ──Created──► Present
//!     ▲                        │                   │  ▲
//!     │                  CreateFailed              │  │
//!     │◄───────────────────────┘                   │  │
//!     │                             BeginUpdate ───┤  ├── Updated
//!     │                             BeginRead  ────┤  ├── ReadDone
//!     │                             BeginDelete ───┘  │
//!     │                                               │
//!     │◄── Deleted / Vanished ── Deleting / Reading ──┘ (DeleteFailed)
//! ```
//!
//! Illegal transitions return [`TransitionError`]. The controller treats
//! them as invariant violations and stops the pass.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No remote challenge is known.
    Absent,
    /// Root create issued; subresources being created.
    Creating,
    Present,
    Updating,
    Reading,
    Deleting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    BeginCreate,
    /// The root exists remotely (subresources may still have failed).
    Created,
    /// The root create call itself failed.
    CreateFailed,
    BeginUpdate,
    Updated,
    BeginRead,
    ReadDone,
    /// The read found the root gone.
    Vanished,
    BeginDelete,
    Deleted,
    /// The root delete call failed; the resource is still live.
    DeleteFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: LifecycleState,
    pub event: LifecycleEvent,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "illegal lifecycle transition: {:?} + {:?}",
            self.from, self.event
        )
    }
}

impl std::error::Error for TransitionError {}

/// Lifecycle of one challenge instance during one operation.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub fn new(state: LifecycleState) -> Self {
        Self { state }
    }

    /// `Present` when the snapshot carries a remote id, otherwise `Absent`.
    pub fn for_snapshot(has_id: bool) -> Self {
        if has_id {
            Self::new(LifecycleState::Present)
        } else {
            Self::new(LifecycleState::Absent)
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn apply(&mut self, event: LifecycleEvent) -> Result<LifecycleState, TransitionError> {
        use LifecycleEvent::*;
        use LifecycleState::*;

        let next = match (self.state, event) {
            (Absent, BeginCreate) => Creating,
            (Creating, Created) => Present,
            (Creating, CreateFailed) => Absent,

            (Present, BeginUpdate) => Updating,
            (Updating, Updated) => Present,

            (Present, BeginRead) => Reading,
            (Reading, ReadDone) => Present,
            (Reading, Vanished) => Absent,

            (Present, BeginDelete) => Deleting,
            (Deleting, Deleted) => Absent,
            (Deleting, DeleteFailed) => Present,

            (from, event) => return Err(TransitionError { from, event }),
        };
        self.state = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleEvent::*;
    use LifecycleState::*;

    #[test]
    fn full_lifecycle_is_legal() {
        let mut lc = Lifecycle::for_snapshot(false);
        for (event, want) in [
            (BeginCreate, Creating),
            (Created, Present),
            (BeginUpdate, Updating),
            (Updated, Present),
            (BeginRead, Reading),
            (ReadDone, Present),
            (BeginDelete, Deleting),
            (Deleted, Absent),
        ] {
            assert_eq!(lc.apply(event).unwrap(), want);
        }
    }

    #[test]
    fn update_of_absent_resource_is_illegal() {
        let mut lc = Lifecycle::for_snapshot(false);
        let err = lc.apply(BeginUpdate).unwrap_err();
        assert_eq!(err.from, Absent);
        assert_eq!(lc.state(), Absent);
    }

    #[test]
    fn create_of_present_resource_is_illegal() {
        let mut lc = Lifecycle::for_snapshot(true);
        assert!(lc.apply(BeginCreate).is_err());
    }

    #[test]
    fn failed_delete_returns_to_present() {
        let mut lc = Lifecycle::for_snapshot(true);
        lc.apply(BeginDelete).unwrap();
        assert_eq!(lc.apply(DeleteFailed).unwrap(), Present);
    }

    #[test]
    fn vanished_read_ends_absent() {
        let mut lc = Lifecycle::for_snapshot(true);
        lc.apply(BeginRead).unwrap();
        assert_eq!(lc.apply(Vanished).unwrap(), Absent);
    }
}
