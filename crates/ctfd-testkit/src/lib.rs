//! ctfd-testkit
//!
//! Deterministic test doubles for the reconciliation core.
//!
//! - [`FakeCtfd`]: in-memory CTFd with a call log, fault injection and
//!   call hooks. No network, no randomness.
//! - [`MemoryFileSource`]: file contents keyed by path.
//! - [`fixtures`]: ready-made desired snapshots and controller wiring.

mod fake;
pub mod fixtures;
mod memory_source;

pub use fake::{Call, FakeCtfd, FakeFile};
pub use memory_source::MemoryFileSource;
