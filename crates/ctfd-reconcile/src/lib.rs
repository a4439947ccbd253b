//! ctfd-reconcile
//!
//! Reconciliation engine for one CTFd challenge and its subresources.
//!
//! Given the last-applied snapshot and a desired snapshot, the
//! [`Controller`] issues the remote calls that converge CTFd on the desired
//! state and returns the resulting snapshot plus [`Diagnostics`]:
//!
//! - [`Controller::create_all`]
//! - [`Controller::read_all`]
//! - [`Controller::update_all`]
//! - [`Controller::delete_all`]
//!
//! Passes are strictly sequential. Partial application is an accepted
//! outcome: the returned snapshot always describes what is believed live,
//! and every loss is accompanied by a diagnostic. Only an
//! [`InvariantViolation`] aborts a pass.

pub mod codec;
mod controller;
mod diagnostics;
mod error;
mod lifecycle;
mod source;
pub mod strategy;

pub use controller::{Controller, Outcome};
pub use diagnostics::{summary, Diagnostic, Diagnostics, Severity};
pub use error::InvariantViolation;
pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleState, TransitionError};
pub use source::{FileSource, FileSourceError, FsFileSource};
