use std::fmt;

use crate::lifecycle::TransitionError;

/// A condition upstream validation should have made impossible.
///
/// Never downgraded to a diagnostic: the whole pass stops and the caller
/// receives this instead of an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The remote reported `anonymize: false`, which has no behavior mapping.
    AnonymizeFalse,
    Lifecycle(TransitionError),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::AnonymizeFalse => {
                write!(f, "INVARIANT: requirements anonymize=false has no behavior")
            }
            InvariantViolation::Lifecycle(e) => write!(f, "INVARIANT: {e}"),
        }
    }
}

impl std::error::Error for InvariantViolation {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvariantViolation::Lifecycle(e) => Some(e),
            InvariantViolation::AnonymizeFalse => None,
        }
    }
}

impl From<TransitionError> for InvariantViolation {
    fn from(e: TransitionError) -> Self {
        InvariantViolation::Lifecycle(e)
    }
}
